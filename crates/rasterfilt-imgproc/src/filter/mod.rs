//! Filter operations
//!
//! This module provides the 3x3 kernel table, the convolution evaluator and
//! the filter entry points.

/// Per-sample 3x3 convolution
pub mod convolution;

/// Filter kernels
pub mod kernels;

/// Filter operations
mod ops;
pub use ops::*;
