#![deny(missing_docs)]
//! Integer raster types for gray and color images

/// raster representation for filtering purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::RasterError;
pub use crate::image::{Channels, Raster, RasterSize};
