//! Process-wide state shared between the bridge and instrumented access points: the
//! registered action logger, the import path of the test binary, and the
//! panic-on-exit-zero flag.
//!
//! A single [`Registry`] is created for the process and is reachable through [`global`].
//! It lives until the process exits. Tests that need isolation construct their own
//! instance and hand it to the bridge.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error;
use crate::trace_categories;

/// Receives the environment-touching operations performed by instrumented code.
pub trait ActionLogger: Send + Sync {
    /// Records that the environment variable `key` was read.
    fn getenv(&self, key: &str);
    /// Records that the file `name` was opened.
    fn open(&self, name: &str);
    /// Records that the file `name` was inspected.
    fn stat(&self, name: &str);
    /// Records that the working directory was changed to `name`.
    fn chdir(&self, name: &str);
}

/// Holder for process-wide bridge state with register-once semantics.
pub struct Registry {
    logger: OnceLock<&'static dyn ActionLogger>,
    import_path: OnceLock<String>,
    panic_on_exit0: AtomicBool,
}

static GLOBAL: Registry = Registry::new();

/// Returns the registry shared by the whole process.
pub fn global() -> &'static Registry {
    &GLOBAL
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Returns a new registry with no logger, no import path, and exit interception off.
    pub const fn new() -> Self {
        Self {
            logger: OnceLock::new(),
            import_path: OnceLock::new(),
            panic_on_exit0: AtomicBool::new(false),
        }
    }

    /// Registers the action logger for this registry.
    ///
    /// Registering the same logger instance again has no effect; registering a different
    /// one once a logger is in place is refused.
    ///
    /// # Arguments
    ///
    /// * `logger` - The logger that will receive recorded actions.
    pub fn set_logger(&self, logger: &'static dyn ActionLogger) -> Result<(), error::Error> {
        let registered = *self.logger.get_or_init(|| logger);

        if std::ptr::addr_eq(registered, logger) {
            Ok(())
        } else {
            Err(error::Error::LoggerAlreadyRegistered)
        }
    }

    /// Returns the registered action logger, if there is one.
    pub fn logger(&self) -> Option<&'static dyn ActionLogger> {
        self.logger.get().copied()
    }

    /// Forwards an environment read to the registered logger, if any.
    pub fn getenv(&self, key: &str) {
        if let Some(logger) = self.logger() {
            logger.getenv(key);
        }
    }

    /// Forwards a file open to the registered logger, if any.
    pub fn open(&self, name: &str) {
        if let Some(logger) = self.logger() {
            logger.open(name);
        }
    }

    /// Forwards a file inspection to the registered logger, if any.
    pub fn stat(&self, name: &str) {
        if let Some(logger) = self.logger() {
            logger.stat(name);
        }
    }

    /// Forwards a working directory change to the registered logger, if any.
    pub fn chdir(&self, name: &str) {
        if let Some(logger) = self.logger() {
            logger.chdir(name);
        }
    }

    /// Records the import path of the test binary. Expected to be called once by the
    /// binary's entry point before any capability is used.
    ///
    /// # Arguments
    ///
    /// * `path` - The import path.
    pub fn set_import_path(&self, path: impl Into<String>) -> Result<(), error::Error> {
        let path = path.into();
        let current = self.import_path.get_or_init(|| path.clone());

        if *current == path {
            Ok(())
        } else {
            Err(error::Error::ImportPathAlreadySet(current.clone()))
        }
    }

    /// Returns the import path of the test binary, or an empty string if none was set.
    pub fn import_path(&self) -> &str {
        self.import_path.get().map_or("", String::as_str)
    }

    /// Sets whether a request to exit the process with status 0 should panic instead.
    pub fn set_panic_on_exit0(&self, value: bool) {
        self.panic_on_exit0.store(value, Ordering::SeqCst);
    }

    /// Returns whether a request to exit the process with status 0 will panic.
    pub fn panic_on_exit0(&self) -> bool {
        self.panic_on_exit0.load(Ordering::SeqCst)
    }

    /// Exits the process with the given status, honoring the panic-on-exit-zero flag.
    ///
    /// # Arguments
    ///
    /// * `code` - The exit status.
    ///
    /// # Panics
    ///
    /// Panics instead of exiting when `code` is 0 and the panic-on-exit-zero flag is set.
    pub fn exit(&self, code: i32) -> ! {
        assert!(
            code != 0 || !self.panic_on_exit0(),
            "unexpected call to exit(0) during test"
        );

        tracing::debug!(target: trace_categories::TESTLOG, code, "exiting process");
        std::process::exit(code)
    }
}
