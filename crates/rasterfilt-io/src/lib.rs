#![deny(missing_docs)]
//! Plain-text PGM/PPM reading and writing for rasterfilt

/// Error types for the io module.
pub mod error;

/// High-level functions to read and write raster files.
pub mod functions;

/// Encoding and decoding of the plain PNM formats.
pub mod pnm;

pub use crate::error::IoError;
pub use crate::functions::{read_image_pnm, write_image_pnm};
pub use crate::pnm::{decode_pnm, detect_format, encode_pnm, PnmFormat};
