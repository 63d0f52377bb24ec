//! Fuzzing surface of the bridge.
//!
//! A harness drives fuzzing through [`FuzzEngine`]. This crate ships only
//! [`InertFuzzEngine`], which answers every call with an empty or successful result; a
//! real engine is injected into the bridge at construction time.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::corpus::{CorpusEntry, CorpusType};
use crate::error;
use crate::trace_categories;

/// Parameters for a coordinated fuzzing run.
#[derive(Clone, Debug, Default)]
pub struct CoordinateFuzzingOptions {
    /// How long to fuzz for; zero means no time limit.
    pub timeout: Duration,
    /// Number of inputs to try; zero means no limit.
    pub limit: u64,
    /// How long to spend minimizing a failing input.
    pub minimize_timeout: Duration,
    /// Number of attempts to spend minimizing a failing input.
    pub minimize_limit: u64,
    /// Number of workers to run in parallel.
    pub parallel: usize,
    /// Seed inputs registered by the fuzz target.
    pub seed: Vec<CorpusEntry>,
    /// Argument types of the fuzz target.
    pub types: Vec<CorpusType>,
    /// Directory of the target's checked-in corpus.
    pub corpus_dir: PathBuf,
    /// Directory where newly discovered inputs are cached.
    pub cache_dir: PathBuf,
}

/// Callback through which a fuzz worker runs the fuzz target on one entry.
pub type FuzzFn<'a> = dyn FnMut(&CorpusEntry) -> Result<(), error::Error> + 'a;

/// A fuzzing engine.
pub trait FuzzEngine: Send + Sync {
    /// Runs the coordinator side of a fuzzing session.
    fn coordinate_fuzzing(&self, options: CoordinateFuzzingOptions) -> Result<(), error::Error>;

    /// Loads the corpus entries stored in `dir` whose values match `types`.
    fn read_corpus(
        &self,
        dir: &Path,
        types: &[CorpusType],
    ) -> Result<Vec<CorpusEntry>, error::Error>;

    /// Runs the worker side of a fuzzing session, calling `fuzz_fn` for each input.
    fn run_fuzz_worker(&self, fuzz_fn: &mut FuzzFn<'_>) -> Result<(), error::Error>;

    /// Clears coverage counters.
    fn reset_coverage(&self);

    /// Copies coverage counters into the snapshot the coordinator reads.
    fn snapshot_coverage(&self);
}

/// Engine that performs no fuzzing.
#[derive(Clone, Copy, Debug, Default)]
pub struct InertFuzzEngine;

impl FuzzEngine for InertFuzzEngine {
    fn coordinate_fuzzing(&self, options: CoordinateFuzzingOptions) -> Result<(), error::Error> {
        tracing::debug!(
            target: trace_categories::FUZZ,
            seeds = options.seed.len(),
            "no fuzzing engine attached; skipping coordination"
        );
        Ok(())
    }

    fn read_corpus(
        &self,
        dir: &Path,
        _types: &[CorpusType],
    ) -> Result<Vec<CorpusEntry>, error::Error> {
        tracing::debug!(target: trace_categories::FUZZ, dir = %dir.display(), "no fuzzing engine attached; corpus is empty");
        Ok(vec![])
    }

    fn run_fuzz_worker(&self, _fuzz_fn: &mut FuzzFn<'_>) -> Result<(), error::Error> {
        tracing::debug!(target: trace_categories::FUZZ, "no fuzzing engine attached; worker exits");
        Ok(())
    }

    fn reset_coverage(&self) {
        tracing::debug!(target: trace_categories::FUZZ, "no fuzzing engine attached; nothing to reset");
    }

    fn snapshot_coverage(&self) {
        tracing::debug!(target: trace_categories::FUZZ, "no fuzzing engine attached; nothing to snapshot");
    }
}
