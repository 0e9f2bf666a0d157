use crate::error::FilterError;

/// A rectangular block of the raster coordinate space.
///
/// Rows and columns are half-open ranges: `row_start..row_end` and
/// `col_start..col_end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    /// First row of the region.
    pub row_start: usize,
    /// One past the last row of the region.
    pub row_end: usize,
    /// First column of the region.
    pub col_start: usize,
    /// One past the last column of the region.
    pub col_end: usize,
}

impl Region {
    /// The region covering a whole raster.
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            row_start: 0,
            row_end: height,
            col_start: 0,
            col_end: width,
        }
    }

    /// Number of rows in the region.
    pub fn rows(&self) -> usize {
        self.row_end - self.row_start
    }

    /// Number of columns in the region.
    pub fn cols(&self) -> usize {
        self.col_end - self.col_start
    }

    /// Number of pixels in the region.
    pub fn area(&self) -> usize {
        self.rows() * self.cols()
    }

    /// Whether the region holds no pixel.
    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }

    /// Whether the pixel `(x, y)` belongs to the region.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        (self.col_start..self.col_end).contains(&x) && (self.row_start..self.row_end).contains(&y)
    }

    fn overlaps(&self, other: &Region) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.row_start < other.row_end
            && other.row_start < self.row_end
            && self.col_start < other.col_end
            && other.col_start < self.col_end
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "rows {}..{}, cols {}..{}",
            self.row_start, self.row_end, self.col_start, self.col_end
        )
    }
}

/// Split the rows of a raster into contiguous bands, one per worker.
///
/// The first `height % worker_count` workers receive one extra row. When
/// there are more workers than rows the trailing bands are empty.
///
/// # Arguments
///
/// * `width` - The width of the raster.
/// * `height` - The height of the raster.
/// * `worker_count` - The number of bands to produce.
///
/// # Errors
///
/// Returns [`FilterError::InvalidWorkerCount`] when `worker_count` is zero.
///
/// # Examples
///
/// ```
/// use rasterfilt_imgproc::partition::row_bands;
///
/// let bands = row_bands(4, 10, 3).unwrap();
/// let rows = bands.iter().map(|b| (b.row_start, b.row_end)).collect::<Vec<_>>();
///
/// assert_eq!(rows, vec![(0, 4), (4, 7), (7, 10)]);
/// ```
pub fn row_bands(
    width: usize,
    height: usize,
    worker_count: usize,
) -> Result<Vec<Region>, FilterError> {
    if worker_count == 0 {
        return Err(FilterError::InvalidWorkerCount(worker_count));
    }

    let base = height / worker_count;
    let extra = height % worker_count;

    let bands = (0..worker_count)
        .map(|i| {
            let row_start = i * base + i.min(extra);
            let row_end = row_start + base + usize::from(i < extra);
            Region {
                row_start,
                row_end,
                col_start: 0,
                col_end: width,
            }
        })
        .collect();

    Ok(bands)
}

/// Split a raster into four quadrants at `width / 2` and `height / 2`.
///
/// The quadrants are returned in top-left, top-right, bottom-left,
/// bottom-right order. The middle row and column of odd sizes belong to the
/// bottom and right quadrants.
pub fn quadrants(width: usize, height: usize) -> [Region; 4] {
    let mid_x = width / 2;
    let mid_y = height / 2;
    let block = |rows: (usize, usize), cols: (usize, usize)| Region {
        row_start: rows.0,
        row_end: rows.1,
        col_start: cols.0,
        col_end: cols.1,
    };

    [
        block((0, mid_y), (0, mid_x)),
        block((0, mid_y), (mid_x, width)),
        block((mid_y, height), (0, mid_x)),
        block((mid_y, height), (mid_x, width)),
    ]
}

/// Check that the regions exactly tile a `width x height` raster.
///
/// The regions must lie inside the raster, be pairwise disjoint and cover
/// every pixel.
pub fn verify_tiling(regions: &[Region], width: usize, height: usize) -> Result<(), FilterError> {
    for (i, r) in regions.iter().enumerate() {
        if r.row_start > r.row_end || r.col_start > r.col_end {
            return Err(FilterError::InvalidTiling(format!(
                "region {i} ({r}) is inverted"
            )));
        }
        if r.row_end > height || r.col_end > width {
            return Err(FilterError::InvalidTiling(format!(
                "region {i} ({r}) exceeds {width}x{height}"
            )));
        }
    }

    for (i, r) in regions.iter().enumerate() {
        if let Some(j) = regions[i + 1..].iter().position(|o| r.overlaps(o)) {
            return Err(FilterError::InvalidTiling(format!(
                "regions {i} and {} overlap",
                i + 1 + j
            )));
        }
    }

    let covered: usize = regions.iter().map(Region::area).sum();
    if covered != width * height {
        return Err(FilterError::InvalidTiling(format!(
            "regions cover {covered} of {} pixels",
            width * height
        )));
    }

    Ok(())
}
