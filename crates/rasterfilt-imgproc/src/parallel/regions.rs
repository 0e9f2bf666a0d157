use crate::{error::FilterError, partition::Region};

/// The output cells owned by one region.
///
/// `rows[i]` holds the interleaved samples of row `region.row_start + i`,
/// restricted to the region columns.
#[derive(Debug)]
pub struct RegionMut<'a> {
    /// The region the cells belong to.
    pub region: Region,
    /// One mutable run per region row.
    pub rows: Vec<&'a mut [i32]>,
}

/// Split an output buffer into disjoint mutable views, one per region.
///
/// Each row of the buffer is cut at the region column boundaries, so the
/// views never alias and can be handed to different workers without locks.
///
/// # Arguments
///
/// * `data` - The row-major output samples.
/// * `width` - The width of the raster in pixels.
/// * `channels` - The number of interleaved samples per pixel.
/// * `regions` - The regions to carve out, expected to tile the raster.
///
/// # Errors
///
/// Returns [`FilterError::InvalidTiling`] if two regions overlap on a row or a
/// region reaches past the raster width.
pub fn split_regions_mut<'a>(
    data: &'a mut [i32],
    width: usize,
    channels: usize,
    regions: &[Region],
) -> Result<Vec<RegionMut<'a>>, FilterError> {
    let mut order = (0..regions.len()).collect::<Vec<_>>();
    order.sort_by_key(|&i| (regions[i].col_start, regions[i].col_end));

    let mut parts = regions
        .iter()
        .map(|r| RegionMut {
            region: *r,
            rows: Vec::with_capacity(r.row_end.saturating_sub(r.row_start)),
        })
        .collect::<Vec<_>>();

    for (y, row) in data.chunks_exact_mut(width * channels).enumerate() {
        let mut rest: &'a mut [i32] = row;
        let mut consumed = 0;

        for &i in &order {
            let r = &regions[i];
            if !(r.row_start..r.row_end).contains(&y) {
                continue;
            }
            if r.col_start < consumed || r.col_start > r.col_end || r.col_end > width {
                return Err(FilterError::InvalidTiling(format!(
                    "region {i} ({r}) collides on row {y}"
                )));
            }

            let skip = (r.col_start - consumed) * channels;
            let (_, tail) = std::mem::take(&mut rest).split_at_mut(skip);
            let (segment, tail) = tail.split_at_mut(r.cols() * channels);
            parts[i].rows.push(segment);

            rest = tail;
            consumed = r.col_end;
        }
    }

    Ok(parts)
}
