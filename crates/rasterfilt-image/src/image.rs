use crate::error::RasterError;

/// Raster size in pixels
///
/// A struct to represent the size of a raster in pixels.
///
/// # Examples
///
/// ```
/// use rasterfilt_image::RasterSize;
///
/// let size = RasterSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(size.width, 10);
/// assert_eq!(size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RasterSize {
    /// Width of the raster in pixels
    pub width: usize,
    /// Height of the raster in pixels
    pub height: usize,
}

impl RasterSize {
    /// Number of pixels covered by the size.
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

impl std::fmt::Display for RasterSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<[usize; 2]> for RasterSize {
    fn from(size: [usize; 2]) -> Self {
        RasterSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// Channel layout of a raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channels {
    /// One sample per pixel.
    Gray,
    /// Three interleaved samples per pixel in R, G, B order.
    Rgb,
}

impl Channels {
    /// Number of samples stored per pixel.
    pub const fn count(self) -> usize {
        match self {
            Channels::Gray => 1,
            Channels::Rgb => 3,
        }
    }
}

impl TryFrom<usize> for Channels {
    type Error = RasterError;

    fn try_from(count: usize) -> Result<Self, Self::Error> {
        match count {
            1 => Ok(Channels::Gray),
            3 => Ok(Channels::Rgb),
            n => Err(RasterError::UnsupportedChannels(n)),
        }
    }
}

/// Represents a raster with integer sample data.
///
/// Samples are stored row-major with the channel components of a pixel
/// interleaved. Every sample lies in `[0, max_sample]` and the buffer length
/// is always `width * height * channels`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    size: RasterSize,
    channels: Channels,
    max_sample: i32,
    data: Vec<i32>,
}

impl Raster {
    /// Create a new raster from sample data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the raster in pixels.
    /// * `channels` - The channel layout.
    /// * `max_sample` - The maximum value a sample may take.
    /// * `data` - The interleaved sample data.
    ///
    /// # Errors
    ///
    /// Returns an error if the size is empty, the maximum is not positive, the
    /// data length does not match the shape or a sample is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use rasterfilt_image::{Channels, Raster, RasterSize};
    ///
    /// let raster = Raster::new(
    ///     RasterSize { width: 2, height: 1 },
    ///     Channels::Rgb,
    ///     255,
    ///     vec![0, 1, 2, 3, 4, 5],
    /// ).unwrap();
    ///
    /// assert_eq!(raster.num_channels(), 3);
    /// assert_eq!(raster.pixel(1, 0).unwrap(), &[3, 4, 5]);
    /// ```
    pub fn new(
        size: RasterSize,
        channels: Channels,
        max_sample: i32,
        data: Vec<i32>,
    ) -> Result<Self, RasterError> {
        if size.width == 0 || size.height == 0 {
            return Err(RasterError::InvalidSize(size.width, size.height));
        }

        if max_sample <= 0 {
            return Err(RasterError::InvalidMaxSample(max_sample));
        }

        let expected = size.area() * channels.count();
        if data.len() != expected {
            return Err(RasterError::ShapeMismatch(data.len(), expected));
        }

        if let Some((index, &value)) = data
            .iter()
            .enumerate()
            .find(|&(_, &v)| v < 0 || v > max_sample)
        {
            return Err(RasterError::SampleOutOfRange {
                index,
                value,
                max_sample,
            });
        }

        Ok(Self {
            size,
            channels,
            max_sample,
            data,
        })
    }

    /// Create a new raster with every sample set to `val`.
    ///
    /// The value is clamped into `[0, max_sample]`.
    pub fn from_size_val(
        size: RasterSize,
        channels: Channels,
        max_sample: i32,
        val: i32,
    ) -> Result<Self, RasterError> {
        let val = val.clamp(0, max_sample.max(0));
        let data = vec![val; size.area() * channels.count()];
        Raster::new(size, channels, max_sample, data)
    }

    /// Get the size of the raster in pixels.
    pub fn size(&self) -> RasterSize {
        self.size
    }

    /// Get the number of columns of the raster.
    pub fn cols(&self) -> usize {
        self.width()
    }

    /// Get the number of rows of the raster.
    pub fn rows(&self) -> usize {
        self.height()
    }

    /// Get the width of the raster in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the raster in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the channel layout of the raster.
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Get the number of channels in the raster.
    pub fn num_channels(&self) -> usize {
        self.channels.count()
    }

    /// Get the maximum sample value.
    pub fn max_sample(&self) -> i32 {
        self.max_sample
    }

    /// Number of samples in one row of the raster.
    pub fn row_stride(&self) -> usize {
        self.size.width * self.channels.count()
    }

    /// Get the sample data of the raster.
    pub fn as_slice(&self) -> &[i32] {
        &self.data
    }

    /// Consume the raster and return its sample data.
    pub fn into_vec(self) -> Vec<i32> {
        self.data
    }

    /// Get a sample without validating the coordinates.
    ///
    /// PRECONDITION: `x < width`, `y < height` and `ch < num_channels`.
    #[inline]
    pub fn sample(&self, x: usize, y: usize, ch: usize) -> i32 {
        self.data[(y * self.size.width + x) * self.channels.count() + ch]
    }

    /// Get a sample of the raster.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinates or the channel are out of bounds.
    pub fn get(&self, x: usize, y: usize, ch: usize) -> Result<i32, RasterError> {
        self.check_bounds(x, y)?;
        if ch >= self.num_channels() {
            return Err(RasterError::ChannelIndexOutOfBounds(
                ch,
                self.num_channels(),
            ));
        }
        Ok(self.sample(x, y, ch))
    }

    /// Get all channel components of a pixel.
    pub fn pixel(&self, x: usize, y: usize) -> Result<&[i32], RasterError> {
        self.check_bounds(x, y)?;
        let c = self.num_channels();
        let offset = (y * self.size.width + x) * c;
        Ok(&self.data[offset..offset + c])
    }

    /// Write all channel components of a pixel.
    ///
    /// Values are clamped into `[0, max_sample]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinates are out of bounds or `values` does
    /// not hold exactly one value per channel.
    pub fn set_pixel(&mut self, x: usize, y: usize, values: &[i32]) -> Result<(), RasterError> {
        self.check_bounds(x, y)?;
        let c = self.num_channels();
        if values.len() != c {
            return Err(RasterError::ShapeMismatch(values.len(), c));
        }
        let offset = (y * self.size.width + x) * c;
        let max_sample = self.max_sample;
        self.data[offset..offset + c]
            .iter_mut()
            .zip(values)
            .for_each(|(dst, &v)| *dst = v.clamp(0, max_sample));
        Ok(())
    }

    /// Extract one channel as a gray raster.
    pub fn channel(&self, channel: usize) -> Result<Raster, RasterError> {
        let c = self.num_channels();
        if channel >= c {
            return Err(RasterError::ChannelIndexOutOfBounds(channel, c));
        }

        let data = self
            .data
            .chunks_exact(c)
            .map(|px| px[channel])
            .collect::<Vec<_>>();

        Raster::new(self.size, Channels::Gray, self.max_sample, data)
    }

    /// Overwrite one channel with the samples of a gray raster of the same size.
    pub fn set_channel(&mut self, channel: usize, src: &Raster) -> Result<(), RasterError> {
        let c = self.num_channels();
        if channel >= c {
            return Err(RasterError::ChannelIndexOutOfBounds(channel, c));
        }
        if src.size != self.size || src.num_channels() != 1 {
            return Err(RasterError::ShapeMismatch(
                src.as_slice().len(),
                self.size.area(),
            ));
        }

        let max_sample = self.max_sample;
        self.data
            .chunks_exact_mut(c)
            .zip(src.as_slice())
            .for_each(|(px, &v)| px[channel] = v.clamp(0, max_sample));
        Ok(())
    }

    fn check_bounds(&self, x: usize, y: usize) -> Result<(), RasterError> {
        if x >= self.width() || y >= self.height() {
            return Err(RasterError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }
        Ok(())
    }
}
