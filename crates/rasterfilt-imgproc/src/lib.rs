#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// timing and region diagnostics.
pub mod diagnostics;

/// error types for the filtering pipeline.
pub mod error;

/// image filtering module.
pub mod filter;

/// module containing parallelization utilities.
pub mod parallel;

/// work partitioning of the raster coordinate space.
pub mod partition;

pub use crate::error::FilterError;
