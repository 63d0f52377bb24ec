//! Diagnostic tracing setup for the command-line front end.

use std::collections::HashSet;

use testdeps_core::trace_categories;
use tracing_subscriber::{
    Layer, filter::Targets, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Type of event to trace.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, clap::ValueEnum)]
pub enum TraceEvent {
    /// Traces validation of fuzz corpus entries.
    #[clap(name = "corpus")]
    Corpus,
    /// Traces calls into the fuzzing engine.
    #[clap(name = "fuzz")]
    Fuzz,
    /// Traces filter pattern compilation and matching.
    #[clap(name = "match")]
    Match,
    /// Traces CPU profiling.
    #[clap(name = "profile")]
    Profile,
    /// Traces the test log and the registry.
    #[clap(name = "testlog")]
    TestLog,
}

impl TraceEvent {
    const fn target(self) -> &'static str {
        match self {
            Self::Corpus => trace_categories::CORPUS,
            Self::Fuzz => trace_categories::FUZZ,
            Self::Match => trace_categories::MATCH,
            Self::Profile => trace_categories::PROFILE,
            Self::TestLog => trace_categories::TESTLOG,
        }
    }
}

/// Set of enabled tracing events.
#[derive(Debug, Default)]
pub struct TraceEventConfig {
    enabled_trace_events: HashSet<TraceEvent>,
}

impl TraceEventConfig {
    /// Installs a stderr subscriber that logs at INFO, plus DEBUG for each enabled event.
    ///
    /// # Arguments
    ///
    /// * `enabled_log_events` - Classes of events to log at DEBUG level.
    pub fn init(enabled_log_events: &[TraceEvent]) -> Self {
        let config = Self {
            enabled_trace_events: enabled_log_events.iter().copied().collect(),
        };

        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .without_time()
            .with_target(false)
            .with_filter(config.compose_filter());

        if tracing_subscriber::registry()
            .with(layer)
            .try_init()
            .is_err()
        {
            // Something went wrong; proceed on anyway but complain audibly.
            eprintln!("warning: failed to initialize tracing.");
        }

        config
    }

    fn compose_filter(&self) -> Targets {
        Targets::new()
            .with_default(tracing_subscriber::filter::LevelFilter::INFO)
            .with_targets(
                self.enabled_trace_events
                    .iter()
                    .map(|event| (event.target(), tracing::Level::DEBUG)),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn enabled_events_raise_their_target_to_debug() {
        let config = TraceEventConfig {
            enabled_trace_events: [TraceEvent::Match].into_iter().collect(),
        };

        let filter = config.compose_filter();
        assert!(filter.would_enable(trace_categories::MATCH, &tracing::Level::DEBUG));
        assert!(!filter.would_enable(trace_categories::TESTLOG, &tracing::Level::DEBUG));
        assert!(filter.would_enable(trace_categories::TESTLOG, &tracing::Level::INFO));
        assert_eq!(filter.default_level(), Some(LevelFilter::INFO));
    }
}
