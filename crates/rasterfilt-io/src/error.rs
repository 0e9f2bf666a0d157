use rasterfilt_image::RasterError;

/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Error reading or writing the file.
    #[error("Failed to access the file")]
    FileError(#[from] std::io::Error),

    /// Error when the magic number is neither `P2` nor `P3`.
    #[error("Unsupported format magic {0:?}, expected P2 or P3")]
    UnsupportedFormat(String),

    /// Error when the header ends before all fields were read.
    #[error("Truncated header: missing {0}")]
    TruncatedHeader(&'static str),

    /// Error when a token cannot be parsed as a number.
    #[error("Invalid number {token:?} for {field}")]
    InvalidNumber {
        /// The header field or "sample".
        field: &'static str,
        /// The offending token.
        token: String,
    },

    /// Error when fewer samples than declared are present.
    #[error("Expected {expected} samples, found {found}")]
    TruncatedSamples {
        /// Number of samples declared by the header.
        expected: usize,
        /// Number of samples actually read.
        found: usize,
    },

    /// Error when the decoded data does not form a valid raster.
    #[error(transparent)]
    RasterError(#[from] RasterError),
}
