//! Serialized access to the terminal
//!
//! Table blocks and the progress spinner share one writer. Every write holds
//! the lock for the whole block so a spinner frame can never land inside a
//! table.

use std::io::{self, Write};
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

/// Erase the current line and return the cursor to column 0
pub const CLEAR_LINE: &str = "\x1b[2K\r";

/// Shared, lock-protected output sink
pub struct Console<W> {
    writer: Arc<Mutex<W>>,
    interactive: bool,
}

impl<W> Clone for Console<W> {
    fn clone(&self) -> Self {
        Self {
            writer: Arc::clone(&self.writer),
            interactive: self.interactive,
        }
    }
}

impl<W: Write + Send> Console<W> {
    /// `interactive` consoles erase the status line before each block
    pub fn new(writer: W, interactive: bool) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
            interactive,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Write a complete block of text and flush it
    pub async fn emit(&self, text: &str) -> io::Result<()> {
        let mut writer = self.writer.lock().await;
        if self.interactive {
            writer.write_all(CLEAR_LINE.as_bytes())?;
        }
        writer.write_all(text.as_bytes())?;
        writer.flush()
    }

    /// Overwrite the status line; a no-op on non-interactive consoles
    pub async fn status(&self, text: &str) -> io::Result<()> {
        if !self.interactive {
            return Ok(());
        }
        let mut writer = self.writer.lock().await;
        write!(writer, "\r{}", text)?;
        writer.flush()
    }

    /// Erase whatever the status line currently shows
    pub async fn clear_status(&self) -> io::Result<()> {
        if !self.interactive {
            return Ok(());
        }
        let mut writer = self.writer.lock().await;
        writer.write_all(CLEAR_LINE.as_bytes())?;
        writer.flush()
    }

    /// Exclusive access to the underlying writer
    pub async fn lock(&self) -> MutexGuard<'_, W> {
        self.writer.lock().await
    }
}
