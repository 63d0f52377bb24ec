//! Profiling stand-in for platforms without a sampling backend.

use std::io::Write;

use crate::error;
use crate::profile::Profiler;

/// Profiler that reports profiling as unsupported.
pub struct UnsupportedProfiler;

impl Profiler for UnsupportedProfiler {
    fn start_cpu_profile(&self, _sink: Box<dyn Write + Send>) -> Result<(), error::Error> {
        Err(error::Error::ProfilingUnsupported)
    }

    fn stop_cpu_profile(&self) {}

    fn write_profile_to(
        &self,
        _name: &str,
        _sink: &mut dyn Write,
        _debug: i32,
    ) -> Result<(), error::Error> {
        Err(error::Error::ProfilingUnsupported)
    }
}
