/// Uniform 3x3 smoothing weights.
pub const BLUR_WEIGHTS: [[f32; 3]; 3] = [
    [1.0 / 9.0, 1.0 / 9.0, 1.0 / 9.0],
    [1.0 / 9.0, 1.0 / 9.0, 1.0 / 9.0],
    [1.0 / 9.0, 1.0 / 9.0, 1.0 / 9.0],
];

/// 4-neighbour laplacian weights.
pub const LAPLACE_WEIGHTS: [[f32; 3]; 3] = [
    [0.0, -1.0, 0.0],
    [-1.0, 4.0, -1.0],
    [0.0, -1.0, 0.0],
];

/// Laplacian sharpening weights.
pub const SHARPENING_WEIGHTS: [[f32; 3]; 3] = [
    [0.0, -1.0, 0.0],
    [-1.0, 5.0, -1.0],
    [0.0, -1.0, 0.0],
];

/// How the accumulated sum of a convolution is turned into a sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NormalizationMode {
    /// Divide by the sum of the positive weights of the taps in bounds.
    SumPositiveWeights,
    /// Use the accumulated sum as is.
    RawSum,
}

impl NormalizationMode {
    /// Derive the mode from the sign structure of the weights.
    ///
    /// Kernels without negative weights and with a strictly positive total
    /// are averaged; every other kernel keeps the raw sum.
    pub fn from_weights(weights: &[[f32; 3]; 3]) -> Self {
        let mut has_negative = false;
        let mut positive = 0.0f32;
        for &w in weights.iter().flatten() {
            if w < 0.0 {
                has_negative = true;
            } else if w > 0.0 {
                positive += w;
            }
        }

        if !has_negative && positive > 0.0 {
            NormalizationMode::SumPositiveWeights
        } else {
            NormalizationMode::RawSum
        }
    }
}

/// An immutable 3x3 convolution kernel.
///
/// Weights are indexed as `weights[ky + 1][kx + 1]` for tap offsets in
/// `{-1, 0, 1}`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kernel {
    weights: [[f32; 3]; 3],
    mode: NormalizationMode,
}

impl Kernel {
    /// Create a kernel from its weights, deriving the normalization mode.
    ///
    /// # Examples
    ///
    /// ```
    /// use rasterfilt_imgproc::filter::kernels::{Kernel, NormalizationMode};
    ///
    /// let kernel = Kernel::new([[0.0, 1.0, 0.0], [1.0, 2.0, 1.0], [0.0, 1.0, 0.0]]);
    /// assert_eq!(kernel.mode(), NormalizationMode::SumPositiveWeights);
    ///
    /// let edges = Kernel::new([[0.0, 0.0, 0.0], [-1.0, 0.0, 1.0], [0.0, 0.0, 0.0]]);
    /// assert_eq!(edges.mode(), NormalizationMode::RawSum);
    /// ```
    pub fn new(weights: [[f32; 3]; 3]) -> Self {
        Self {
            mode: NormalizationMode::from_weights(&weights),
            weights,
        }
    }

    /// The kernel weights.
    pub fn weights(&self) -> &[[f32; 3]; 3] {
        &self.weights
    }

    /// The weight of the tap at offset `(kx, ky)`.
    #[inline]
    pub fn weight(&self, kx: isize, ky: isize) -> f32 {
        self.weights[(ky + 1) as usize][(kx + 1) as usize]
    }

    /// The normalization mode derived from the weights.
    pub fn mode(&self) -> NormalizationMode {
        self.mode
    }
}

/// The named filters known to the kernel table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Uniform smoothing.
    Blur,
    /// Edge detection.
    Laplace,
    /// Edge enhancement.
    Sharpening,
}

impl FilterKind {
    /// Every filter, in table order.
    pub const ALL: [FilterKind; 3] = [
        FilterKind::Blur,
        FilterKind::Laplace,
        FilterKind::Sharpening,
    ];

    /// Resolve a filter name.
    ///
    /// Accepts `blur`, `laplace`, `sharpening` and `sharpen`. Any other name
    /// resolves to [`FilterKind::Blur`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "laplace" => FilterKind::Laplace,
            "sharpening" | "sharpen" => FilterKind::Sharpening,
            _ => FilterKind::Blur,
        }
    }

    /// Canonical name of the filter.
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Blur => "blur",
            FilterKind::Laplace => "laplace",
            FilterKind::Sharpening => "sharpening",
        }
    }

    /// The kernel of the filter.
    pub fn kernel(&self) -> Kernel {
        match self {
            FilterKind::Blur => Kernel::new(BLUR_WEIGHTS),
            FilterKind::Laplace => Kernel::new(LAPLACE_WEIGHTS),
            FilterKind::Sharpening => Kernel::new(SHARPENING_WEIGHTS),
        }
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Select the kernel for a filter name, falling back to blur.
pub fn select(name: &str) -> Kernel {
    FilterKind::from_name(name).kernel()
}
