//! Trace targets used by the bridge.

/// Trace category for corpus validation.
pub const CORPUS: &str = "corpus";
/// Trace category for the fuzzing surface.
pub const FUZZ: &str = "fuzz";
/// Trace category for filter pattern matching.
pub const MATCH: &str = "match";
/// Trace category for CPU profiling.
pub const PROFILE: &str = "profile";
/// Trace category for the action logger.
pub const TESTLOG: &str = "testlog";
