//! Process CPU time and CPU-load deltas
//!
//! CPU load is a continuous series over the whole sweep: each run compares its
//! reading with the one taken at the end of the previous run, wherever that
//! run was in the configuration space.

use std::time::{Duration, Instant};

/// Cumulative CPU time (user + system) of this process
///
/// Returns `None` where the platform offers no reading.
#[cfg(unix)]
pub fn process_cpu_time() -> Option<Duration> {
    // SAFETY: rusage is a plain-old-data struct; zeroing all bytes is a valid initial state.
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    // SAFETY: getrusage writes process-level usage into a struct we own.
    let ret = unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) };
    if ret != 0 {
        return None;
    }
    let user = Duration::new(usage.ru_utime.tv_sec as u64, usage.ru_utime.tv_usec as u32 * 1000);
    let system = Duration::new(usage.ru_stime.tv_sec as u64, usage.ru_stime.tv_usec as u32 * 1000);
    Some(user + system)
}

#[cfg(not(unix))]
pub fn process_cpu_time() -> Option<Duration> {
    None
}

/// A paired reading of process CPU time and the monotonic clock
#[derive(Debug, Clone, Copy)]
pub struct CpuSample {
    pub cpu_time: Option<Duration>,
    pub wall: Instant,
}

impl CpuSample {
    pub fn now() -> Self {
        Self {
            cpu_time: process_cpu_time(),
            wall: Instant::now(),
        }
    }

    /// CPU load in percent between `previous` and this sample
    ///
    /// `(cpu delta / wall delta) × 100`; may exceed 100 when several cores
    /// were busy. `None` when either CPU reading is missing or no wall time
    /// elapsed.
    pub fn load_since(&self, previous: &CpuSample) -> Option<f64> {
        let cpu = self.cpu_time?.checked_sub(previous.cpu_time?)?;
        let wall = self.wall.checked_duration_since(previous.wall)?;
        if wall.is_zero() {
            return None;
        }
        Some(cpu.as_secs_f64() / wall.as_secs_f64() * 100.0)
    }
}
