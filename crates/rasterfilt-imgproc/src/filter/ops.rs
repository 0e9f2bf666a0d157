use rasterfilt_image::Raster;
use rayon::prelude::*;

use super::kernels::{FilterKind, Kernel};
use crate::{
    diagnostics::FilterReport,
    error::FilterError,
    parallel::{execute, FilterOptions, Strategy},
};

/// Apply a named 3x3 filter to a raster.
///
/// # Arguments
///
/// * `src` - The source raster.
/// * `kernel_name` - One of `blur`, `laplace`, `sharpening` or `sharpen`;
///   any other name applies the blur filter.
/// * `worker_count` - Number of workers for the row band strategies.
/// * `strategy` - How the work is executed.
///
/// # Returns
///
/// A new raster of the same shape. Every strategy produces the same samples.
///
/// # Examples
///
/// ```
/// use rasterfilt_image::{Channels, Raster};
/// use rasterfilt_imgproc::{filter::filter, parallel::Strategy};
///
/// let src = Raster::new(
///     [3, 3].into(),
///     Channels::Gray,
///     255,
///     vec![10, 20, 30, 40, 50, 60, 70, 80, 90],
/// ).unwrap();
///
/// let dst = filter(&src, "blur", 2, Strategy::TaskRowBand).unwrap();
/// assert_eq!(dst.get(1, 1, 0).unwrap(), 50);
/// assert_eq!(dst.get(0, 0, 0).unwrap(), 30);
/// ```
pub fn filter(
    src: &Raster,
    kernel_name: &str,
    worker_count: usize,
    strategy: Strategy,
) -> Result<Raster, FilterError> {
    let (dst, _) = filter_with_report(src, kernel_name, worker_count, strategy)?;
    Ok(dst)
}

/// Apply a named 3x3 filter and return the execution report alongside.
pub fn filter_with_report(
    src: &Raster,
    kernel_name: &str,
    worker_count: usize,
    strategy: Strategy,
) -> Result<(Raster, FilterReport), FilterError> {
    let kind = FilterKind::from_name(kernel_name);
    if kind.name() != kernel_name && !(kind == FilterKind::Sharpening && kernel_name == "sharpen")
    {
        log::warn!("unknown filter '{kernel_name}', using {kind}");
    }
    filter_with_kernel(src, &kind.kernel(), &FilterOptions::new(strategy, worker_count))
}

/// Apply an arbitrary 3x3 kernel.
pub fn filter_with_kernel(
    src: &Raster,
    kernel: &Kernel,
    options: &FilterOptions,
) -> Result<(Raster, FilterReport), FilterError> {
    execute(src, kernel, options)
}

/// The result of one filter of a batch.
#[derive(Clone, Debug)]
pub struct BatchOutput {
    /// The filter that produced the raster.
    pub kind: FilterKind,
    /// The filtered raster.
    pub raster: Raster,
    /// How the filter was executed.
    pub report: FilterReport,
}

/// Apply every known filter to the same raster.
///
/// The filters run concurrently and each one uses `options` for its own
/// execution. The outputs come back in [`FilterKind::ALL`] order.
pub fn filter_all(src: &Raster, options: &FilterOptions) -> Result<Vec<BatchOutput>, FilterError> {
    FilterKind::ALL
        .par_iter()
        .map(|&kind| {
            let (raster, report) = filter_with_kernel(src, &kind.kernel(), options)?;
            Ok(BatchOutput {
                kind,
                raster,
                report,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterfilt_image::Channels;

    fn gray_3x3() -> Result<Raster, FilterError> {
        Ok(Raster::new(
            [3, 3].into(),
            Channels::Gray,
            255,
            vec![10, 20, 30, 40, 50, 60, 70, 80, 90],
        )?)
    }

    #[test]
    fn test_filter_unknown_name_is_blur() -> Result<(), FilterError> {
        let src = gray_3x3()?;
        let blur = filter(&src, "blur", 1, Strategy::Sequential)?;
        let unknown = filter(&src, "emboss", 1, Strategy::Sequential)?;
        assert_eq!(blur, unknown);
        Ok(())
    }

    #[test]
    fn test_filter_sharpen_alias() -> Result<(), FilterError> {
        let src = gray_3x3()?;
        assert_eq!(
            filter(&src, "sharpen", 2, Strategy::TaskRowBand)?,
            filter(&src, "sharpening", 2, Strategy::TaskRowBand)?
        );
        Ok(())
    }

    #[test]
    fn test_filter_keeps_shape() -> Result<(), FilterError> {
        let src = Raster::from_size_val([5, 2].into(), Channels::Rgb, 15, 9)?;
        let dst = filter(&src, "laplace", 3, Strategy::ProcessRowBand)?;
        assert_eq!(dst.size(), src.size());
        assert_eq!(dst.channels(), Channels::Rgb);
        assert_eq!(dst.max_sample(), 15);
        Ok(())
    }

    #[test]
    fn test_filter_all_order() -> Result<(), FilterError> {
        let src = gray_3x3()?;
        let outputs = filter_all(&src, &FilterOptions::new(Strategy::ThreadQuadrant, 4))?;
        let kinds = outputs.iter().map(|o| o.kind).collect::<Vec<_>>();
        assert_eq!(kinds, FilterKind::ALL.to_vec());

        for output in &outputs {
            let single = filter(&src, output.kind.name(), 1, Strategy::Sequential)?;
            assert_eq!(output.raster, single);
            assert_eq!(output.report.strategy(), Strategy::ThreadQuadrant);
        }
        Ok(())
    }
}
