//! Errors surfaced by the command-line front end.

use std::path::PathBuf;

use crate::config::ConfigLoadError;

/// Monolithic error type for the command-line front end.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The bridge reported an error.
    #[error(transparent)]
    Core(#[from] testdeps_core::Error),

    /// An explicitly requested configuration file could not be loaded.
    #[error("{path}: {source}")]
    Config {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying load error.
        #[source]
        source: ConfigLoadError,
    },

    /// A file named on the command line could not be accessed.
    #[error("{path}: {source}")]
    File {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing output failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
