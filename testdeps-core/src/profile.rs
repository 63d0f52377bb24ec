//! CPU profiling capability consumed by the bridge.

use std::io::Write;

use crate::error;

#[cfg(unix)]
mod sampling;
#[cfg(not(unix))]
mod stubs;

#[cfg(unix)]
pub use sampling::SamplingProfiler;
#[cfg(not(unix))]
pub use stubs::UnsupportedProfiler;

/// Sampling frequency, in Hz, used when none is configured.
pub const DEFAULT_FREQUENCY: i32 = 100;

/// Name of the profile that snapshots the CPU profile currently being collected.
pub const CPU_PROFILE_NAME: &str = "cpu";

/// A profiling backend.
pub trait Profiler: Send + Sync {
    /// Begins collecting a CPU profile; it is written to `sink` when collection stops.
    ///
    /// # Arguments
    ///
    /// * `sink` - Destination for the finished profile.
    fn start_cpu_profile(&self, sink: Box<dyn Write + Send>) -> Result<(), error::Error>;

    /// Stops collecting the CPU profile and writes it out. Does nothing if no profile is
    /// being collected.
    fn stop_cpu_profile(&self);

    /// Writes the named profile to `sink`.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the profile to write.
    /// * `sink` - Destination for the profile.
    /// * `debug` - Output verbosity; 0 selects the backend's native format, larger values
    ///   select human-readable output.
    fn write_profile_to(
        &self,
        name: &str,
        sink: &mut dyn Write,
        debug: i32,
    ) -> Result<(), error::Error>;
}

/// Returns the profiling backend for the current platform.
///
/// # Arguments
///
/// * `frequency` - Sampling frequency in Hz, where the backend samples.
#[allow(unused_variables, reason = "frequency is unused on some platforms")]
pub fn default_profiler(frequency: i32) -> Box<dyn Profiler> {
    #[cfg(unix)]
    {
        Box::new(SamplingProfiler::new(frequency))
    }
    #[cfg(not(unix))]
    {
        Box::new(UnsupportedProfiler)
    }
}
