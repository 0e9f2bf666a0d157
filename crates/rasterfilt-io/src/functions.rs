use std::path::Path;

use rasterfilt_image::Raster;

use crate::{
    error::IoError,
    pnm::{decode_pnm, encode_pnm},
};

/// Reads a plain PGM or PPM image from the given file path.
///
/// # Arguments
///
/// * `file_path` - The path to the image file.
///
/// # Returns
///
/// The decoded raster.
pub fn read_image_pnm(file_path: impl AsRef<Path>) -> Result<Raster, IoError> {
    let file_path = file_path.as_ref();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let data = std::fs::read(file_path)?;
    let raster = decode_pnm(&data)?;

    log::debug!(
        "read {} ({}, {} channel(s))",
        file_path.display(),
        raster.size(),
        raster.num_channels()
    );

    Ok(raster)
}

/// Writes the given raster as a plain PGM or PPM image.
///
/// The format follows the channel layout: gray rasters are written as `P2`,
/// color rasters as `P3`.
///
/// # Arguments
///
/// * `file_path` - The path to the output file.
/// * `raster` - The raster to write.
pub fn write_image_pnm(file_path: impl AsRef<Path>, raster: &Raster) -> Result<(), IoError> {
    let file_path = file_path.as_ref();
    std::fs::write(file_path, encode_pnm(raster))?;
    log::debug!("wrote {}", file_path.display());
    Ok(())
}
