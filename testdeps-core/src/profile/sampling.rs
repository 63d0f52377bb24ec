//! CPU profiling backed by the `pprof` signal-based sampler.

use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error;
use crate::profile::{CPU_PROFILE_NAME, Profiler};
use crate::trace_categories;

/// Frames from these libraries are dropped from samples.
const BLOCKLIST: &[&str] = &["libc", "libgcc", "pthread", "vdso"];

const EMPTY_FLAMEGRAPH: &str = concat!(
    r#"<?xml version="1.0" standalone="no"?>"#,
    "\n",
    r#"<svg version="1.1" width="1200" height="60" xmlns="http://www.w3.org/2000/svg">"#,
    r#"<text x="600" y="34" text-anchor="middle" font-family="monospace">"#,
    "No samples collected</text></svg>\n",
);

struct Running {
    guard: pprof::ProfilerGuard<'static>,
    sink: Box<dyn Write + Send>,
}

/// Profiler that samples the process's call stacks and renders them as flamegraphs.
pub struct SamplingProfiler {
    frequency: i32,
    running: Mutex<Option<Running>>,
}

impl SamplingProfiler {
    /// Returns a profiler that samples `frequency` times per second.
    pub const fn new(frequency: i32) -> Self {
        Self {
            frequency,
            running: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Running>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Profiler for SamplingProfiler {
    #[allow(
        clippy::significant_drop_tightening,
        reason = "the slot stays locked so concurrent starts can't both build a sampler"
    )]
    fn start_cpu_profile(&self, sink: Box<dyn Write + Send>) -> Result<(), error::Error> {
        let mut running = self.lock();
        if running.is_some() {
            return Err(error::Error::ProfilerAlreadyRunning);
        }

        let guard = pprof::ProfilerGuardBuilder::default()
            .frequency(self.frequency)
            .blocklist(BLOCKLIST)
            .build()
            .map_err(profiling_error)?;

        tracing::debug!(target: trace_categories::PROFILE, frequency = self.frequency, "started cpu profile");
        *running = Some(Running { guard, sink });

        Ok(())
    }

    fn stop_cpu_profile(&self) {
        let Some(Running { guard, mut sink }) = self.lock().take() else {
            return;
        };

        let result = guard
            .report()
            .build()
            .map_err(profiling_error)
            .and_then(|report| write_flamegraph(&report, &mut sink))
            .and_then(|()| sink.flush().map_err(error::Error::from));

        match result {
            Ok(()) => tracing::debug!(target: trace_categories::PROFILE, "wrote cpu profile"),
            Err(err) => {
                tracing::warn!(target: trace_categories::PROFILE, "failed to write cpu profile: {err}");
            }
        }
    }

    fn write_profile_to(
        &self,
        name: &str,
        sink: &mut dyn Write,
        debug: i32,
    ) -> Result<(), error::Error> {
        if name != CPU_PROFILE_NAME {
            return Err(error::Error::UnknownProfile(name.to_owned()));
        }

        let report = {
            let running = self.lock();
            let Some(Running { guard, .. }) = running.as_ref() else {
                return Err(error::Error::ProfilerNotRunning);
            };
            guard.report().build().map_err(profiling_error)?
        };

        if debug == 0 {
            write_flamegraph(&report, sink)?;
        } else {
            write!(sink, "{report:?}")?;
        }

        Ok(())
    }
}

#[allow(
    clippy::needless_pass_by_value,
    reason = "used as a `map_err` callback, which passes the error by value"
)]
fn profiling_error(err: pprof::Error) -> error::Error {
    error::Error::Profiling(err.to_string())
}

/// Renders `report` as a flamegraph. A report without samples yields a placeholder
/// image, since the renderer produces no output for it.
fn write_flamegraph(report: &pprof::Report, sink: &mut dyn Write) -> Result<(), error::Error> {
    if report.data.is_empty() {
        tracing::warn!(target: trace_categories::PROFILE, "no samples collected; cpu profile is empty");
        sink.write_all(EMPTY_FLAMEGRAPH.as_bytes())?;
        return Ok(());
    }

    report.flamegraph(sink).map_err(profiling_error)
}

#[cfg(test)]
#[expect(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use crate::testutil::SharedBuffer;
    use anyhow::Result;
    use std::time::{Duration, Instant};

    fn burn_cpu(duration: Duration) -> u64 {
        let started = Instant::now();
        let mut acc = 0u64;
        while started.elapsed() < duration {
            for i in 0..10_000u64 {
                acc = std::hint::black_box(acc.wrapping_mul(31).wrapping_add(i));
            }
        }
        acc
    }

    #[test]
    fn unknown_profile_is_rejected() {
        let profiler = SamplingProfiler::new(100);
        let mut out = vec![];

        let result = profiler.write_profile_to("heap", &mut out, 0);
        assert!(matches!(result, Err(error::Error::UnknownProfile(ref name)) if name == "heap"));
        assert!(out.is_empty());
    }

    #[test]
    fn cpu_snapshot_requires_running_profile() {
        let profiler = SamplingProfiler::new(100);
        let mut out = vec![];

        let result = profiler.write_profile_to(CPU_PROFILE_NAME, &mut out, 1);
        assert!(matches!(result, Err(error::Error::ProfilerNotRunning)));
    }

    #[test]
    fn stop_without_start_is_noop() {
        let profiler = SamplingProfiler::new(100);
        profiler.stop_cpu_profile();
    }

    // The sampler is process-wide, so every scenario that runs it lives in one test.
    #[test]
    fn sampling_lifecycle() -> Result<()> {
        let profiler = SamplingProfiler::new(1000);

        // Stopped before any sample was taken: still a well-formed image.
        let short_run = SharedBuffer::default();
        profiler.start_cpu_profile(short_run.boxed())?;
        profiler.stop_cpu_profile();
        assert!(short_run.contents().contains("<svg"));

        let full_run = SharedBuffer::default();
        profiler.start_cpu_profile(full_run.boxed())?;
        assert!(matches!(
            profiler.start_cpu_profile(Box::new(std::io::sink())),
            Err(error::Error::ProfilerAlreadyRunning)
        ));

        std::hint::black_box(burn_cpu(Duration::from_millis(500)));

        let mut flamegraph = vec![];
        profiler.write_profile_to(CPU_PROFILE_NAME, &mut flamegraph, 0)?;
        let flamegraph = String::from_utf8(flamegraph)?;
        assert!(flamegraph.contains("<svg"));
        assert!(!flamegraph.contains("No samples collected"));

        let mut text = vec![];
        profiler.write_profile_to(CPU_PROFILE_NAME, &mut text, 1)?;
        let text = String::from_utf8_lossy(&text);
        assert!(!text.is_empty());
        assert!(!text.contains("<svg"));

        profiler.stop_cpu_profile();
        assert!(full_run.contents().contains("<svg"));
        assert!(!full_run.contents().contains("No samples collected"));

        // Stopped profilers can be started again.
        profiler.start_cpu_profile(Box::new(std::io::sink()))?;
        profiler.stop_cpu_profile();
        Ok(())
    }
}
