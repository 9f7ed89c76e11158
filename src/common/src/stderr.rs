//! Line-counted stderr
//!
//! Logging, user notices and forwarded worker output all reach the terminal
//! through [`CountingStderr`], so the number of lines printed since any point
//! is known and transient output can be erased exactly.

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

static LINES_WRITTEN: AtomicUsize = AtomicUsize::new(0);

/// Handle on the process's stderr that counts the lines written through it
#[derive(Debug, Default, Clone, Copy)]
pub struct CountingStderr;

impl Write for CountingStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = io::stderr().write(buf)?;
        let lines = buf[..written].iter().filter(|b| **b == b'\n').count();
        LINES_WRITTEN.fetch_add(lines, Ordering::SeqCst);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// Lines written through [`CountingStderr`] since the process started
pub fn lines_written() -> usize {
    LINES_WRITTEN.load(Ordering::SeqCst)
}
