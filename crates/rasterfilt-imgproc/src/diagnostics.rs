use std::time::{Duration, Instant};

use crate::{parallel::Strategy, partition::Region};

/// Measures the elapsed wall time of a phase.
#[derive(Clone, Copy, Debug)]
pub struct Stopwatch {
    start: Instant,
    stop: Option<Instant>,
}

impl Stopwatch {
    /// Start a new stopwatch.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            stop: None,
        }
    }

    /// Stop the stopwatch and return the elapsed time.
    ///
    /// Stopping twice keeps the first reading.
    pub fn stop(&mut self) -> Duration {
        let stop = *self.stop.get_or_insert_with(Instant::now);
        stop - self.start
    }

    /// Elapsed time, up to now if the stopwatch is still running.
    pub fn elapsed(&self) -> Duration {
        self.stop.unwrap_or_else(Instant::now) - self.start
    }

    /// Whether the stopwatch has not been stopped yet.
    pub fn is_running(&self) -> bool {
        self.stop.is_none()
    }
}

/// Convert a duration to fractional milliseconds.
pub fn as_millis_f64(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1e6
}

/// The compute time spent by one worker on its region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorkerTiming {
    /// Index of the worker.
    pub worker: usize,
    /// The region the worker filtered.
    pub region: Region,
    /// Time spent in the compute phase.
    pub elapsed: Duration,
}

/// What happened during one filter invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterReport {
    pub(crate) strategy: Strategy,
    pub(crate) regions: Vec<Region>,
    pub(crate) workers: Vec<WorkerTiming>,
    pub(crate) elapsed: Duration,
}

impl FilterReport {
    /// The strategy that ran the filter.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// The regions chosen by the partitioner, in worker order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Per worker compute time, in worker order.
    pub fn worker_timings(&self) -> &[WorkerTiming] {
        &self.workers
    }

    /// Total time from dispatch to reassembly.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
