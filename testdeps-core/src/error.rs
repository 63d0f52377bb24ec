use std::path::PathBuf;

use crate::corpus::TypeList;

/// Monolithic error type for the bridge.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A filter pattern could not be compiled.
    #[error("invalid pattern: {0}; expression: '{1}'")]
    InvalidPattern(regex::Error, String),

    /// A corpus entry holds a different number of values than its target expects.
    #[error("wrong number of values in corpus entry: {actual}, want {expected}")]
    CorpusCountMismatch {
        /// Number of values supplied.
        actual: usize,
        /// Number of values the target takes.
        expected: usize,
    },

    /// A corpus entry holds a value whose type disagrees with the target's signature.
    #[error("mismatched types in corpus entry: {actual}, want {expected}")]
    CorpusTypeMismatch {
        /// Types of the supplied values, in order.
        actual: TypeList,
        /// Types the target takes, in order.
        expected: TypeList,
    },

    /// A different action logger has already been registered with the registry.
    #[error("an action logger is already registered")]
    LoggerAlreadyRegistered,

    /// The import path was already set to a different value.
    #[error("import path already set to '{0}'")]
    ImportPathAlreadySet(String),

    /// Flushing the test log to its sink failed.
    #[error("failed to flush test log: {0}")]
    LogFlush(#[source] std::io::Error),

    /// A test log did not begin with the expected header line.
    #[error("missing test log header")]
    MissingLogHeader,

    /// A test log line could not be parsed.
    #[error("malformed test log line {line_number}: '{line}'")]
    MalformedLogLine {
        /// 1-based line number within the log.
        line_number: usize,
        /// The offending line.
        line: String,
    },

    /// The profiling backend reported an error.
    #[error("profiling error: {0}")]
    Profiling(String),

    /// A CPU profile is already being collected.
    #[error("cpu profiling already in use")]
    ProfilerAlreadyRunning,

    /// A profile was requested while no CPU profile is being collected.
    #[error("cpu profiling not started")]
    ProfilerNotRunning,

    /// The named profile is not known.
    #[error("unknown profile: {0}")]
    UnknownProfile(String),

    /// Profiling is not available on this platform.
    #[error("profiling is not supported on this platform")]
    ProfilingUnsupported,

    /// A fuzz target reported a failure for a corpus entry.
    #[error("fuzz target failed on {0}: {1}")]
    FuzzTargetFailed(PathBuf, String),

    /// An I/O error occurred.
    #[error("i/o error: {0}")]
    IoError(#[from] std::io::Error),
}
