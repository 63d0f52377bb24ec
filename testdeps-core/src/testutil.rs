//! Helpers shared by unit tests.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use crate::registry::ActionLogger;

/// In-memory sink whose contents stay readable after it has been handed off.
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub(crate) fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub(crate) fn boxed(&self) -> Box<dyn Write + Send> {
        Box::new(self.clone())
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Sink that rejects every write.
pub(crate) struct FailingSink;

impl Write for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::other("sink is broken"))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Action logger that keeps every recorded action in memory.
#[derive(Default)]
pub(crate) struct RecordingLogger(Mutex<Vec<String>>);

impl RecordingLogger {
    pub(crate) fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn push(&self, op: &str, name: &str) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format!("{op} {name}"));
    }
}

impl ActionLogger for RecordingLogger {
    fn getenv(&self, key: &str) {
        self.push("getenv", key);
    }

    fn open(&self, name: &str) {
        self.push("open", name);
    }

    fn stat(&self, name: &str) {
        self.push("stat", name);
    }

    fn chdir(&self, name: &str) {
        self.push("chdir", name);
    }
}
