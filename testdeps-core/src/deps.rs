//! The capability set a test harness calls into, and the bridge that implements it.

use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::corpus::{self, CorpusEntry, CorpusType, CorpusValue};
use crate::error;
use crate::fuzz::{CoordinateFuzzingOptions, FuzzEngine, FuzzFn, InertFuzzEngine};
use crate::matcher::MatchCache;
use crate::profile::{self, Profiler};
use crate::registry::{self, Registry};
use crate::testlog::{self, TestLog};

pub use bridge_builder::State as BridgeBuilderState;

/// Services a test harness needs at run time, reachable without depending on the crates
/// that implement them.
pub trait TestDeps: Send + Sync {
    /// Computes whether `name` matches the filter `pattern`.
    fn match_string(&self, pattern: &str, name: &str) -> Result<bool, error::Error>;

    /// Begins collecting a CPU profile, to be written to `sink` when collection stops.
    fn start_cpu_profile(&self, sink: Box<dyn Write + Send>) -> Result<(), error::Error>;

    /// Stops collecting the CPU profile.
    fn stop_cpu_profile(&self);

    /// Writes the named profile to `sink` at the given verbosity.
    fn write_profile_to(
        &self,
        name: &str,
        sink: &mut dyn Write,
        debug: i32,
    ) -> Result<(), error::Error>;

    /// Returns the import path of the test binary.
    fn import_path(&self) -> &str;

    /// Starts recording environment-touching actions to `sink`.
    fn start_test_log(&self, sink: Box<dyn Write + Send>) -> Result<(), error::Error>;

    /// Flushes and detaches the test log sink.
    fn stop_test_log(&self) -> Result<(), error::Error>;

    /// Sets whether exiting the process with status 0 should panic.
    fn set_panic_on_exit0(&self, value: bool);

    /// Checks that a corpus entry's values have the fuzz target's argument types.
    fn check_corpus(&self, values: &[CorpusValue], types: &[CorpusType])
    -> Result<(), error::Error>;

    /// Runs the coordinator side of a fuzzing session.
    fn coordinate_fuzzing(&self, options: CoordinateFuzzingOptions) -> Result<(), error::Error>;

    /// Loads the corpus stored in `dir`.
    fn read_corpus(
        &self,
        dir: &Path,
        types: &[CorpusType],
    ) -> Result<Vec<CorpusEntry>, error::Error>;

    /// Runs the worker side of a fuzzing session.
    fn run_fuzz_worker(&self, fuzz_fn: &mut FuzzFn<'_>) -> Result<(), error::Error>;

    /// Clears coverage counters.
    fn reset_coverage(&self);

    /// Snapshots coverage counters.
    fn snapshot_coverage(&self);
}

/// Implementation of [`TestDeps`] that delegates to injected collaborators.
///
/// By default the bridge uses the process-wide [`Registry`] and [`TestLog`], the
/// platform's profiler, and an inert fuzzing engine.
#[derive(bon::Builder)]
pub struct Bridge {
    /// Profiling backend.
    #[builder(default = profile::default_profiler(profile::DEFAULT_FREQUENCY))]
    profiler: Box<dyn Profiler>,
    /// Fuzzing engine.
    #[builder(default = Box::new(InertFuzzEngine))]
    fuzz_engine: Box<dyn FuzzEngine>,
    /// Registry holding process-wide state.
    #[builder(default = registry::global())]
    registry: &'static Registry,
    /// Action logger started and stopped by the harness.
    #[builder(default = testlog::global())]
    test_log: &'static TestLog,
    /// Filter pattern cache. Guarded because tests may run concurrently.
    #[builder(skip)]
    matcher: Mutex<MatchCache>,
}

impl Default for Bridge {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TestDeps for Bridge {
    fn match_string(&self, pattern: &str, name: &str) -> Result<bool, error::Error> {
        self.matcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .matches(pattern, name)
    }

    fn start_cpu_profile(&self, sink: Box<dyn Write + Send>) -> Result<(), error::Error> {
        self.profiler.start_cpu_profile(sink)
    }

    fn stop_cpu_profile(&self) {
        self.profiler.stop_cpu_profile();
    }

    fn write_profile_to(
        &self,
        name: &str,
        sink: &mut dyn Write,
        debug: i32,
    ) -> Result<(), error::Error> {
        self.profiler.write_profile_to(name, sink, debug)
    }

    fn import_path(&self) -> &str {
        self.registry.import_path()
    }

    fn start_test_log(&self, sink: Box<dyn Write + Send>) -> Result<(), error::Error> {
        self.test_log.start(sink, self.registry)
    }

    fn stop_test_log(&self) -> Result<(), error::Error> {
        self.test_log.stop()
    }

    fn set_panic_on_exit0(&self, value: bool) {
        self.registry.set_panic_on_exit0(value);
    }

    fn check_corpus(
        &self,
        values: &[CorpusValue],
        types: &[CorpusType],
    ) -> Result<(), error::Error> {
        corpus::check_corpus(values, types)
    }

    fn coordinate_fuzzing(&self, options: CoordinateFuzzingOptions) -> Result<(), error::Error> {
        self.fuzz_engine.coordinate_fuzzing(options)
    }

    fn read_corpus(
        &self,
        dir: &Path,
        types: &[CorpusType],
    ) -> Result<Vec<CorpusEntry>, error::Error> {
        self.fuzz_engine.read_corpus(dir, types)
    }

    fn run_fuzz_worker(&self, fuzz_fn: &mut FuzzFn<'_>) -> Result<(), error::Error> {
        self.fuzz_engine.run_fuzz_worker(fuzz_fn)
    }

    fn reset_coverage(&self) {
        self.fuzz_engine.reset_coverage();
    }

    fn snapshot_coverage(&self) {
        self.fuzz_engine.snapshot_coverage();
    }
}
