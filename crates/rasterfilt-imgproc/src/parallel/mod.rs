//! Parallel execution of the convolution.
//!
//! Every strategy follows the same three steps: the raster is partitioned
//! into regions, each worker filters its own region reading the whole input,
//! and the output is complete once every worker has joined.

use std::{any::Any, panic::AssertUnwindSafe, str::FromStr};

use rasterfilt_image::{Raster, RasterError};
use rayon::prelude::*;

use crate::{
    diagnostics::{as_millis_f64, FilterReport, Stopwatch, WorkerTiming},
    error::FilterError,
    filter::{convolution::convolve_region, kernels::Kernel},
    partition::{quadrants, row_bands, verify_tiling, Region},
};

mod ranks;
mod regions;

pub use regions::{split_regions_mut, RegionMut};

/// Controls how the filter work is mapped onto executing units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Run every pixel on the current thread.
    Sequential,

    /// Split the raster into four quadrants, one OS thread each.
    ///
    /// The worker count is fixed at four.
    ThreadQuadrant,

    /// Split the raster into row bands processed as tasks on a dedicated
    /// Rayon pool with one thread per worker.
    #[default]
    TaskRowBand,

    /// Split the raster into row bands processed by isolated ranks.
    ///
    /// Ranks share no memory with the coordinator: each one receives an
    /// encoded copy of the whole input and sends back its band.
    ProcessRowBand,
}

impl Strategy {
    /// Every strategy.
    pub const ALL: [Strategy; 4] = [
        Strategy::Sequential,
        Strategy::ThreadQuadrant,
        Strategy::TaskRowBand,
        Strategy::ProcessRowBand,
    ];

    /// The name used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::ThreadQuadrant => "thread-quadrant",
            Strategy::TaskRowBand => "task-rowband",
            Strategy::ProcessRowBand => "process-rowband",
        }
    }

    /// Partition a `width x height` raster for this strategy.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidWorkerCount`] when a row band strategy is
    /// asked for zero workers.
    pub fn partition(
        &self,
        width: usize,
        height: usize,
        worker_count: usize,
    ) -> Result<Vec<Region>, FilterError> {
        match self {
            Strategy::Sequential => Ok(vec![Region::full(width, height)]),
            Strategy::ThreadQuadrant => Ok(quadrants(width, height).to_vec()),
            Strategy::TaskRowBand | Strategy::ProcessRowBand => {
                row_bands(width, height, worker_count)
            }
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" | "serial" => Ok(Strategy::Sequential),
            "thread-quadrant" | "quadrant" => Ok(Strategy::ThreadQuadrant),
            "task-rowband" | "thread-rowband" => Ok(Strategy::TaskRowBand),
            "process-rowband" | "rank-rowband" => Ok(Strategy::ProcessRowBand),
            _ => Err(FilterError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Options of one filter invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOptions {
    /// How the work is executed.
    pub strategy: Strategy,
    /// Number of workers for the row band strategies.
    pub worker_count: usize,
}

impl FilterOptions {
    /// Create options for the given strategy and worker count.
    pub fn new(strategy: Strategy, worker_count: usize) -> Self {
        Self {
            strategy,
            worker_count,
        }
    }
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            worker_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

/// Filter a raster with the given kernel and options.
///
/// # Arguments
///
/// * `src` - The input raster, shared read-only by every worker.
/// * `kernel` - The convolution kernel.
/// * `options` - The strategy and worker count.
///
/// # Returns
///
/// The filtered raster, with the same shape as the input, and a report of
/// the regions and per worker timings.
///
/// # Errors
///
/// Any failure during the compute phase aborts the whole call; no partially
/// filtered raster is returned.
pub fn execute(
    src: &Raster,
    kernel: &Kernel,
    options: &FilterOptions,
) -> Result<(Raster, FilterReport), FilterError> {
    let (width, height) = (src.width(), src.height());
    let expected = width * height * src.num_channels();
    if src.as_slice().len() != expected {
        return Err(RasterError::ShapeMismatch(src.as_slice().len(), expected).into());
    }

    let strategy = options.strategy;
    let regions = strategy.partition(width, height, options.worker_count)?;
    verify_tiling(&regions, width, height)?;

    log::info!(
        "filtering {} raster ({} channel(s)) with {} over {} region(s)",
        src.size(),
        src.num_channels(),
        strategy,
        regions.len()
    );

    let mut watch = Stopwatch::start();
    let (data, mut workers) = match strategy {
        Strategy::Sequential => run_sequential(src, kernel, &regions)?,
        Strategy::ThreadQuadrant => run_threads(src, &regions, |worker, part| {
            compute_region(worker, src, kernel, part)
        })?,
        Strategy::TaskRowBand => {
            run_tasks(src, &regions, options.worker_count, |worker, part| {
                compute_region(worker, src, kernel, part)
            })?
        }
        Strategy::ProcessRowBand => ranks::run_ranks(src, kernel, &regions)?,
    };
    let elapsed = watch.stop();
    workers.sort_by_key(|w| w.worker);

    log::info!("{} finished in {:.3} ms", strategy, as_millis_f64(elapsed));

    let output = Raster::new(src.size(), src.channels(), src.max_sample(), data)?;
    let report = FilterReport {
        strategy,
        regions,
        workers,
        elapsed,
    };

    Ok((output, report))
}

/// Allocate a zeroed sample buffer, reporting allocation failure as an error.
pub(crate) fn alloc_samples(len: usize) -> Result<Vec<i32>, FilterError> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| FilterError::AllocationFailure(len * std::mem::size_of::<i32>()))?;
    data.resize(len, 0);
    Ok(data)
}

/// Best effort description of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

fn compute_region(
    worker: usize,
    src: &Raster,
    kernel: &Kernel,
    part: RegionMut<'_>,
) -> WorkerTiming {
    let RegionMut { region, mut rows } = part;
    log::debug!("worker {worker} processing {region}");

    let mut watch = Stopwatch::start();
    convolve_region(src, kernel, &region, &mut rows);
    let elapsed = watch.stop();

    log::debug!("worker {worker} done in {:.3} ms", as_millis_f64(elapsed));
    WorkerTiming {
        worker,
        region,
        elapsed,
    }
}

fn run_sequential(
    src: &Raster,
    kernel: &Kernel,
    regions: &[Region],
) -> Result<(Vec<i32>, Vec<WorkerTiming>), FilterError> {
    let mut data = alloc_samples(src.as_slice().len())?;
    let workers = split_regions_mut(&mut data, src.width(), src.num_channels(), regions)?
        .into_iter()
        .enumerate()
        .map(|(worker, part)| compute_region(worker, src, kernel, part))
        .collect();
    Ok((data, workers))
}

fn run_threads<F>(
    src: &Raster,
    regions: &[Region],
    compute: F,
) -> Result<(Vec<i32>, Vec<WorkerTiming>), FilterError>
where
    F: Fn(usize, RegionMut<'_>) -> WorkerTiming + Sync,
{
    let mut data = alloc_samples(src.as_slice().len())?;
    let parts = split_regions_mut(&mut data, src.width(), src.num_channels(), regions)?;
    let compute = &compute;

    let joined = std::thread::scope(|s| {
        let handles = parts
            .into_iter()
            .enumerate()
            .map(|(worker, part)| {
                std::thread::Builder::new()
                    .name(format!("quadrant-{worker}"))
                    .spawn_scoped(s, move || compute(worker, part))
                    .map_err(|e| FilterError::WorkerFailure {
                        worker,
                        reason: e.to_string(),
                    })
            })
            .collect::<Vec<_>>();

        // join every thread before looking at the results
        handles
            .into_iter()
            .enumerate()
            .map(|(worker, handle)| {
                handle?.join().map_err(|payload| FilterError::WorkerFailure {
                    worker,
                    reason: panic_message(payload.as_ref()),
                })
            })
            .collect::<Vec<_>>()
    });

    let workers = joined.into_iter().collect::<Result<Vec<_>, _>>()?;
    Ok((data, workers))
}

fn run_tasks<F>(
    src: &Raster,
    regions: &[Region],
    worker_count: usize,
    compute: F,
) -> Result<(Vec<i32>, Vec<WorkerTiming>), FilterError>
where
    F: Fn(usize, RegionMut<'_>) -> WorkerTiming + Sync + Send,
{
    if worker_count == 0 {
        return Err(FilterError::InvalidWorkerCount(worker_count));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count)
        .thread_name(|i| format!("rowband-{i}"))
        .build()
        .map_err(|e| FilterError::ThreadPoolBuild(e.to_string()))?;

    let mut data = alloc_samples(src.as_slice().len())?;
    let parts = split_regions_mut(&mut data, src.width(), src.num_channels(), regions)?;

    let joined: Vec<Result<WorkerTiming, FilterError>> = pool.install(|| {
        parts
            .into_par_iter()
            .enumerate()
            .map(|(worker, part)| {
                std::panic::catch_unwind(AssertUnwindSafe(|| compute(worker, part))).map_err(
                    |payload| FilterError::WorkerFailure {
                        worker,
                        reason: panic_message(payload.as_ref()),
                    },
                )
            })
            .collect()
    });

    let workers = joined.into_iter().collect::<Result<Vec<_>, _>>()?;
    Ok((data, workers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::kernels::select;
    use rasterfilt_image::Channels;

    fn ramp(width: usize, height: usize) -> Result<Raster, RasterError> {
        let data = (0..width * height).map(|i| (i * 7 % 256) as i32).collect();
        Raster::new([width, height].into(), Channels::Gray, 255, data)
    }

    #[test]
    fn test_strategy_from_str() -> Result<(), FilterError> {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.name().parse::<Strategy>()?, strategy);
        }
        assert_eq!("thread-rowband".parse::<Strategy>()?, Strategy::TaskRowBand);
        assert_eq!("SERIAL".parse::<Strategy>()?, Strategy::Sequential);
        assert!(matches!(
            "gpu".parse::<Strategy>(),
            Err(FilterError::UnknownStrategy(_))
        ));
        Ok(())
    }

    #[test]
    fn test_execute_reports_regions() -> Result<(), FilterError> {
        let src = ramp(6, 5)?;
        let kernel = select("blur");

        let (_, report) = execute(&src, &kernel, &FilterOptions::new(Strategy::TaskRowBand, 3))?;
        assert_eq!(report.strategy(), Strategy::TaskRowBand);
        assert_eq!(report.regions().len(), 3);
        assert_eq!(report.worker_timings().len(), 3);
        for (i, timing) in report.worker_timings().iter().enumerate() {
            assert_eq!(timing.worker, i);
            assert_eq!(timing.region, report.regions()[i]);
        }

        let (_, report) = execute(&src, &kernel, &FilterOptions::new(Strategy::ThreadQuadrant, 1))?;
        assert_eq!(report.regions(), &quadrants(6, 5));
        Ok(())
    }

    #[test]
    fn test_execute_zero_workers() -> Result<(), FilterError> {
        let src = ramp(3, 3)?;
        for strategy in [Strategy::TaskRowBand, Strategy::ProcessRowBand] {
            let res = execute(&src, &select("blur"), &FilterOptions::new(strategy, 0));
            assert_eq!(res.err(), Some(FilterError::InvalidWorkerCount(0)));
        }
        // the fixed strategies ignore the worker count
        execute(&src, &select("blur"), &FilterOptions::new(Strategy::Sequential, 0))?;
        execute(&src, &select("blur"), &FilterOptions::new(Strategy::ThreadQuadrant, 0))?;
        Ok(())
    }

    #[test]
    fn test_thread_panic_is_worker_failure() -> Result<(), FilterError> {
        let src = ramp(4, 4)?;
        let regions = quadrants(4, 4);
        let res = run_threads(&src, &regions, |worker, part| {
            if worker == 2 {
                panic!("boom");
            }
            WorkerTiming {
                worker,
                region: part.region,
                elapsed: Default::default(),
            }
        });
        assert_eq!(
            res.err(),
            Some(FilterError::WorkerFailure {
                worker: 2,
                reason: "boom".to_string()
            })
        );
        Ok(())
    }

    #[test]
    fn test_task_panic_is_worker_failure() -> Result<(), FilterError> {
        let src = ramp(4, 4)?;
        let regions = row_bands(4, 4, 2)?;
        let res = run_tasks(&src, &regions, 2, |worker, part| {
            if worker == 1 {
                panic!("out of memory");
            }
            WorkerTiming {
                worker,
                region: part.region,
                elapsed: Default::default(),
            }
        });
        assert!(matches!(
            res,
            Err(FilterError::WorkerFailure { worker: 1, .. })
        ));
        Ok(())
    }
}
