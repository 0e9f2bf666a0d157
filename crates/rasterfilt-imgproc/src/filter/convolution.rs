use rasterfilt_image::Raster;

use super::kernels::{Kernel, NormalizationMode};
use crate::partition::Region;

/// The raw accumulation of a 3x3 convolution at one sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Accumulation {
    /// Weighted sum of the in-bounds taps.
    pub sum: f32,
    /// Sum of the positive weights of the in-bounds taps.
    pub positive_weight_sum: f32,
    /// Number of taps that fell inside the raster.
    pub taps: usize,
}

impl Accumulation {
    /// The divisor applied to the sum under the given normalization mode.
    pub fn divisor(&self, mode: NormalizationMode) -> f32 {
        match mode {
            NormalizationMode::SumPositiveWeights if self.positive_weight_sum > 0.0 => {
                self.positive_weight_sum
            }
            _ => 1.0,
        }
    }
}

/// Accumulate the kernel taps around `(x, y)` for one channel.
///
/// Taps that fall outside the raster are skipped entirely: they add neither
/// to the sum nor to the positive weight total.
pub fn accumulate(src: &Raster, x: usize, y: usize, ch: usize, kernel: &Kernel) -> Accumulation {
    let (width, height) = (src.width() as isize, src.height() as isize);
    let mut acc = Accumulation {
        sum: 0.0,
        positive_weight_sum: 0.0,
        taps: 0,
    };

    for ky in -1..=1isize {
        for kx in -1..=1isize {
            let nx = x as isize + kx;
            let ny = y as isize + ky;
            if nx < 0 || nx >= width || ny < 0 || ny >= height {
                continue;
            }

            let w = kernel.weight(kx, ky);
            acc.sum += src.sample(nx as usize, ny as usize, ch) as f32 * w;
            if w > 0.0 {
                acc.positive_weight_sum += w;
            }
            acc.taps += 1;
        }
    }

    acc
}

/// Compute one output sample of the convolution.
///
/// # Arguments
///
/// * `src` - The source raster.
/// * `x` - The column of the sample.
/// * `y` - The row of the sample.
/// * `ch` - The channel of the sample, `0` for gray rasters.
/// * `kernel` - The convolution kernel.
///
/// # Returns
///
/// The filtered value truncated toward zero and clamped to `[0, max_sample]`.
///
/// # Examples
///
/// ```
/// use rasterfilt_image::{Channels, Raster};
/// use rasterfilt_imgproc::filter::{convolution::evaluate, kernels::select};
///
/// let src = Raster::new(
///     [3, 3].into(),
///     Channels::Gray,
///     255,
///     vec![10, 20, 30, 40, 50, 60, 70, 80, 90],
/// ).unwrap();
///
/// assert_eq!(evaluate(&src, 1, 1, 0, &select("blur")), 50);
/// assert_eq!(evaluate(&src, 0, 0, 0, &select("blur")), 30);
/// ```
pub fn evaluate(src: &Raster, x: usize, y: usize, ch: usize, kernel: &Kernel) -> i32 {
    let acc = accumulate(src, x, y, ch, kernel);
    let value = acc.sum / acc.divisor(kernel.mode());
    // `as` truncates toward zero
    (value as i32).clamp(0, src.max_sample())
}

/// Filter a horizontal run of pixels of row `y` starting at column `col_start`.
///
/// `dst` holds the interleaved output samples of the run.
pub fn convolve_row_segment(
    src: &Raster,
    kernel: &Kernel,
    y: usize,
    col_start: usize,
    dst: &mut [i32],
) {
    let c = src.num_channels();
    dst.chunks_exact_mut(c).enumerate().for_each(|(i, px)| {
        let x = col_start + i;
        for (ch, out) in px.iter_mut().enumerate() {
            *out = evaluate(src, x, y, ch, kernel);
        }
    });
}

/// Filter every pixel of a region.
///
/// `rows` holds one output run per row of the region, each spanning the
/// region columns.
pub fn convolve_region(src: &Raster, kernel: &Kernel, region: &Region, rows: &mut [&mut [i32]]) {
    (region.row_start..region.row_end)
        .zip(rows.iter_mut())
        .for_each(|(y, dst_row)| convolve_row_segment(src, kernel, y, region.col_start, dst_row));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::kernels::{select, Kernel};
    use rasterfilt_image::{Channels, RasterError};

    fn gray_3x3() -> Result<Raster, RasterError> {
        Raster::new(
            [3, 3].into(),
            Channels::Gray,
            255,
            vec![10, 20, 30, 40, 50, 60, 70, 80, 90],
        )
    }

    #[test]
    fn test_blur_center_and_corner() -> Result<(), RasterError> {
        let src = gray_3x3()?;
        let blur = select("blur");
        assert_eq!(evaluate(&src, 1, 1, 0, &blur), 50);
        assert_eq!(evaluate(&src, 0, 0, 0, &blur), 30);
        Ok(())
    }

    #[test]
    fn test_single_pixel_blur_is_identity() -> Result<(), RasterError> {
        for v in [0, 1, 7, 123, 255] {
            let src = Raster::new([1, 1].into(), Channels::Gray, 255, vec![v])?;
            let acc = accumulate(&src, 0, 0, 0, &select("blur"));
            assert_eq!(acc.taps, 1);
            assert_eq!(acc.positive_weight_sum, 1.0 / 9.0);
            assert_eq!(evaluate(&src, 0, 0, 0, &select("blur")), v);
        }
        Ok(())
    }

    #[test]
    fn test_border_taps_are_skipped() -> Result<(), RasterError> {
        let src = gray_3x3()?;
        let blur = select("blur");
        assert_eq!(accumulate(&src, 0, 0, 0, &blur).taps, 4);
        assert_eq!(accumulate(&src, 1, 0, 0, &blur).taps, 6);
        assert_eq!(accumulate(&src, 1, 1, 0, &blur).taps, 9);
        Ok(())
    }

    #[test]
    fn test_divisor_follows_mode() -> Result<(), RasterError> {
        let src = gray_3x3()?;

        let blur = accumulate(&src, 1, 1, 0, &select("blur"));
        assert_eq!(blur.divisor(select("blur").mode()), blur.positive_weight_sum);

        let mixed = Kernel::new([[0.5, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, -0.5]]);
        let acc = accumulate(&src, 1, 1, 0, &mixed);
        assert_eq!(acc.positive_weight_sum, 2.5);
        assert_eq!(acc.divisor(mixed.mode()), 1.0);
        // 0.5 * 10 + 2 * 50 - 0.5 * 90 = 60
        assert_eq!(evaluate(&src, 1, 1, 0, &mixed), 60);
        Ok(())
    }

    #[test]
    fn test_laplace_and_sharpen_raw_sums() -> Result<(), RasterError> {
        let src = gray_3x3()?;
        // flat gradient: 4 * 50 - (20 + 40 + 60 + 80) = 0
        assert_eq!(evaluate(&src, 1, 1, 0, &select("laplace")), 0);
        assert_eq!(evaluate(&src, 1, 1, 0, &select("sharpening")), 50);
        // corner: 4 * 10 - 20 - 40 < 0, clamped
        assert_eq!(evaluate(&src, 0, 0, 0, &select("laplace")), 0);
        // corner: 5 * 90 - 60 - 80 = 310, clamped
        assert_eq!(evaluate(&src, 2, 2, 0, &select("sharpening")), 255);
        Ok(())
    }

    #[test]
    fn test_sharpen_on_saturated_raster() -> Result<(), RasterError> {
        let src = Raster::from_size_val([4, 4].into(), Channels::Gray, 255, 255)?;
        let sharpen = select("sharpening");
        for y in 1..3 {
            for x in 1..3 {
                let acc = accumulate(&src, x, y, 0, &sharpen);
                assert_eq!(acc.sum, 255.0);
                assert_eq!(evaluate(&src, x, y, 0, &sharpen), 255);
            }
        }
        Ok(())
    }

    #[test]
    fn test_color_channels_are_independent() -> Result<(), RasterError> {
        #[rustfmt::skip]
        let src = Raster::new(
            [2, 1].into(),
            Channels::Rgb,
            255,
            vec![
                10, 100, 0,
                30, 200, 255,
            ],
        )?;
        let mut dst = vec![0; 6];
        convolve_row_segment(&src, &select("blur"), 0, 0, &mut dst);
        assert_eq!(dst, vec![20, 150, 127, 20, 150, 127]);
        Ok(())
    }
}
