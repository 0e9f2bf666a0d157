use rasterfilt_image::RasterError;

/// Errors that can occur while filtering a raster.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FilterError {
    /// The raster shape is inconsistent with its sample buffer.
    #[error(transparent)]
    Raster(#[from] RasterError),

    /// The requested worker count is invalid.
    #[error("worker count must be > 0, got {0}")]
    InvalidWorkerCount(usize),

    /// The regions handed to the workers do not tile the raster.
    #[error("regions do not tile the raster: {0}")]
    InvalidTiling(String),

    /// A buffer of the given number of bytes could not be allocated.
    #[error("failed to allocate a buffer of {0} bytes")]
    AllocationFailure(usize),

    /// A worker terminated abnormally.
    #[error("worker {worker} failed: {reason}")]
    WorkerFailure {
        /// Index of the failed worker.
        worker: usize,
        /// What went wrong.
        reason: String,
    },

    /// A message between the coordinator and a rank could not be encoded or decoded.
    #[error("message transfer failed: {0}")]
    Transfer(String),

    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    ThreadPoolBuild(String),

    /// The strategy name is not recognized.
    #[error("unknown strategy {0:?}")]
    UnknownStrategy(String),
}
