//! Minimal in-memory [`crate::TextSource`] for tests that don't need a real
//! `core_text::Buffer`.

use std::io;
use std::sync::{Arc, Mutex};

use crate::tokenized_line::LineEnding;
use crate::TextSource;

/// An in-memory sink `tracing_subscriber` can write formatted log lines to.
#[derive(Clone, Default)]
pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).expect("log output is valid utf-8")
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` under a `tracing_subscriber` that captures formatted log lines
/// instead of printing them, returning whatever text was emitted.
pub(crate) fn capture_tracing(f: impl FnOnce()) -> String {
    let sink = CapturedLogs::default();
    let writer = sink.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    sink.contents()
}

#[derive(Debug, Clone)]
pub(crate) struct VecBuffer {
    lines: Vec<String>,
}

impl VecBuffer {
    pub(crate) fn new(lines: Vec<String>) -> Self {
        assert!(!lines.is_empty(), "a buffer always has at least one line");
        Self { lines }
    }

    pub(crate) fn set_line(&mut self, row: usize, text: String) {
        self.lines[row] = text;
    }

    pub(crate) fn insert_line(&mut self, row: usize, text: String) {
        self.lines.insert(row, text);
    }

    pub(crate) fn remove_line(&mut self, row: usize) {
        self.lines.remove(row);
    }
}

impl TextSource for VecBuffer {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_for_row(&self, row: usize) -> Option<String> {
        self.lines.get(row).cloned()
    }

    fn line_ending_for_row(&self, row: usize) -> LineEnding {
        if row + 1 < self.lines.len() {
            LineEnding::Lf
        } else {
            LineEnding::None
        }
    }

    fn line_byte_len(&self, row: usize) -> usize {
        self.lines.get(row).map(|s| s.len()).unwrap_or(0)
    }

    fn is_row_blank(&self, row: usize) -> bool {
        self.lines
            .get(row)
            .map(|s| s.trim().is_empty())
            .unwrap_or(true)
    }

    fn next_non_blank_row(&self, row: usize) -> Option<usize> {
        let mut r = row + 1;
        while r < self.lines.len() {
            if !TextSource::is_row_blank(self, r) {
                return Some(r);
            }
            r += 1;
        }
        None
    }

    fn id(&self) -> u64 {
        0
    }

    fn path(&self) -> Option<&str> {
        None
    }

    fn full_text(&self) -> String {
        self.lines.join("\n")
    }
}
