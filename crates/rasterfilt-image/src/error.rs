/// An error type for the raster module.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RasterError {
    /// Error when the sample buffer does not match the declared shape.
    #[error("Data length ({0}) does not match the raster size ({1})")]
    ShapeMismatch(usize, usize),

    /// Error when the raster has no pixels.
    #[error("Invalid raster size {0}x{1}")]
    InvalidSize(usize, usize),

    /// Error when the channel count is neither 1 nor 3.
    #[error("Unsupported number of channels: {0}")]
    UnsupportedChannels(usize),

    /// Error when the maximum sample value is not positive.
    #[error("Maximum sample value must be > 0, got {0}")]
    InvalidMaxSample(i32),

    /// Error when a stored sample lies outside `[0, max_sample]`.
    #[error("Sample {value} at index {index} is outside [0, {max_sample}]")]
    SampleOutOfRange {
        /// Position of the sample in the flat buffer.
        index: usize,
        /// The offending value.
        value: i32,
        /// The raster maximum.
        max_sample: i32,
    },

    /// Error when the pixel coordinates are out of bounds.
    #[error("Pixel coordinates ({0}, {1}) are out of bounds ({2}, {3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index ({0}) is out of bounds ({1})")]
    ChannelIndexOutOfBounds(usize, usize),
}
