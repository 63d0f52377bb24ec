//! Core of the testdeps bridge: the capability set a test harness calls into to reach
//! environment services (name filtering, action logging, CPU profiling and fuzz-corpus
//! plumbing) without depending on their concrete implementations.

pub mod corpus;
mod deps;
mod error;
pub mod fuzz;
pub mod instrumented;
mod matcher;
pub mod profile;
pub mod registry;
pub mod testlog;
pub mod trace_categories;

#[cfg(test)]
mod testutil;

pub use corpus::{CorpusEntry, CorpusType, CorpusValue, check_corpus};
pub use deps::{Bridge, BridgeBuilder, BridgeBuilderState, TestDeps};
pub use error::Error;
pub use fuzz::{CoordinateFuzzingOptions, FuzzEngine, InertFuzzEngine};
pub use matcher::MatchCache;
pub use profile::Profiler;
pub use registry::{ActionLogger, Registry};
pub use testlog::{Action, TestLog};
