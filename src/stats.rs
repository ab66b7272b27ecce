use std::time::{Duration, Instant};

/// Summary statistics for a pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct RunStats {
    /// Wall clock time spent in the run.
    pub elapsed: Duration,
    /// Delta in maximum RSS memory usage, in MB.
    pub mem_delta_mb: f64,
    /// Records read from the input.
    pub records_in: usize,
    /// Rows or records written to the output.
    pub records_out: usize,
}

/// Captures time and peak memory at the start of a run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RunTimer {
    started: Instant,
    start_mem: f64,
}

impl RunTimer {
    pub(crate) fn start() -> Self {
        Self {
            started: Instant::now(),
            start_mem: max_mem_usage_mb(),
        }
    }

    pub(crate) fn finish(self, records_in: usize, records_out: usize) -> RunStats {
        RunStats {
            elapsed: self.started.elapsed(),
            mem_delta_mb: (max_mem_usage_mb() - self.start_mem).max(0.0),
            records_in,
            records_out,
        }
    }
}

/// Peak resident set size of the current process, in megabytes.
///
/// `ru_maxrss` is reported in kilobytes on Linux and in bytes on macOS.
/// Returns 0.0 if `getrusage` fails.
pub fn max_mem_usage_mb() -> f64 {
    // SAFETY: `rusage` is plain data; a zeroed value is valid and getrusage
    // only writes into it.
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) };
    if rc != 0 {
        return 0.0;
    }

    let maxrss = usage.ru_maxrss as f64;
    if cfg!(target_os = "macos") {
        maxrss / 1024.0 / 1024.0
    } else {
        maxrss / 1024.0
    }
}
