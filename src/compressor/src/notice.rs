//! User-facing notices, separate from diagnostic logging

use std::io::{IsTerminal, Write};
use std::sync::Mutex;

use common::stderr::{CountingStderr, lines_written};

/// Receives one line per user-visible event
pub trait NoticeSink: Send + Sync {
    fn notice(&self, message: &str);

    /// Remove notices already shown, for transient output
    fn clear(&self) {}
}

/// Writes notices to stderr; `clear` erases them when stderr is a terminal.
///
/// Everything printed through [`CountingStderr`] after the first notice
/// belongs to the transient region, log lines and worker output included,
/// and is erased with it.
#[derive(Default)]
pub struct StderrNotices {
    region_start: Mutex<Option<usize>>,
}

impl StderrNotices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines printed since the first notice not yet cleared
    pub fn region_lines(&self) -> usize {
        match self.region_start.lock().map(|start| *start) {
            Ok(Some(start)) => lines_written().saturating_sub(start),
            _ => 0,
        }
    }
}

impl NoticeSink for StderrNotices {
    fn notice(&self, message: &str) {
        if let Ok(mut start) = self.region_start.lock() {
            start.get_or_insert_with(lines_written);
        }
        let _ = writeln!(CountingStderr, "{message}");
    }

    fn clear(&self) {
        let lines = self.region_lines();
        if let Ok(mut start) = self.region_start.lock() {
            *start = None;
        }

        let stderr = std::io::stderr();
        if lines > 0 && stderr.is_terminal() {
            let mut handle = stderr.lock();
            // back to the region's first line, erase to the end of the screen
            let _ = write!(handle, "\x1b[{lines}F\x1b[0J");
            let _ = handle.flush();
        }
    }
}

/// Keeps notices in memory
#[derive(Default)]
pub struct CollectedNotices {
    lines: Mutex<Vec<String>>,
    cleared: Mutex<bool>,
}

impl CollectedNotices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn was_cleared(&self) -> bool {
        self.cleared.lock().map(|c| *c).unwrap_or(false)
    }
}

impl NoticeSink for CollectedNotices {
    fn notice(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_string());
        }
    }

    fn clear(&self) {
        if let Ok(mut cleared) = self.cleared.lock() {
            *cleared = true;
        }
    }
}
