//! Environment access points that report each operation to the process-wide
//! [`Registry`](crate::Registry) before performing it, so that a started test log sees
//! the inputs a test depended on.

use std::fs::{File, Metadata};
use std::path::Path;

use crate::registry;

/// Reads the environment variable `key`, recording the read.
pub fn var(key: &str) -> Option<String> {
    registry::global().getenv(key);
    std::env::var(key).ok()
}

/// Opens the file at `path` for reading, recording the open.
pub fn open(path: impl AsRef<Path>) -> std::io::Result<File> {
    let path = path.as_ref();
    registry::global().open(&path.to_string_lossy());
    File::open(path)
}

/// Queries metadata for the file at `path`, recording the inspection.
pub fn metadata(path: impl AsRef<Path>) -> std::io::Result<Metadata> {
    let path = path.as_ref();
    registry::global().stat(&path.to_string_lossy());
    std::fs::metadata(path)
}

/// Changes the working directory to `path`, recording the change.
pub fn set_current_dir(path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    registry::global().chdir(&path.to_string_lossy());
    std::env::set_current_dir(path)
}
