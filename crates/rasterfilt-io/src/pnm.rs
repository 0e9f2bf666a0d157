use rasterfilt_image::{Channels, Raster, RasterSize};

use crate::error::IoError;

/// The two plain-text formats understood by the codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PnmFormat {
    /// Plain graymap, magic `P2`.
    Pgm,
    /// Plain pixmap, magic `P3`.
    Ppm,
}

impl PnmFormat {
    /// The magic number written at the top of the file.
    pub fn magic(&self) -> &'static str {
        match self {
            PnmFormat::Pgm => "P2",
            PnmFormat::Ppm => "P3",
        }
    }

    /// The raster channel layout stored by the format.
    pub fn channels(&self) -> Channels {
        match self {
            PnmFormat::Pgm => Channels::Gray,
            PnmFormat::Ppm => Channels::Rgb,
        }
    }

    /// The format able to store a raster with the given layout.
    pub fn for_channels(channels: Channels) -> Self {
        match channels {
            Channels::Gray => PnmFormat::Pgm,
            Channels::Rgb => PnmFormat::Ppm,
        }
    }

    fn from_magic(magic: &str) -> Result<Self, IoError> {
        match magic {
            "P2" => Ok(PnmFormat::Pgm),
            "P3" => Ok(PnmFormat::Ppm),
            other => Err(IoError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Splits the input into whitespace separated tokens, skipping `#` comments.
struct Tokens<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn skip_blank(&mut self) {
        while let Some(&b) = self.data.get(self.pos) {
            if b == b'#' {
                while let Some(&c) = self.data.get(self.pos) {
                    self.pos += 1;
                    if c == b'\n' {
                        break;
                    }
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_blank();
        let start = self.pos;
        while let Some(&b) = self.data.get(self.pos) {
            if b.is_ascii_whitespace() || b == b'#' {
                break;
            }
            self.pos += 1;
        }
        if start == self.pos {
            return None;
        }
        // non-utf8 tokens surface as a parse error on the caller side
        Some(std::str::from_utf8(&self.data[start..self.pos]).unwrap_or("\u{fffd}"))
    }
}

fn parse_field<T: std::str::FromStr>(
    tokens: &mut Tokens<'_>,
    field: &'static str,
) -> Result<T, IoError> {
    let token = tokens.next().ok_or(IoError::TruncatedHeader(field))?;
    token.parse().map_err(|_| IoError::InvalidNumber {
        field,
        token: token.to_string(),
    })
}

/// Detect the format of an encoded raster from its magic number.
///
/// # Errors
///
/// Returns an error if the data is empty or the magic is not `P2`/`P3`.
pub fn detect_format(data: &[u8]) -> Result<PnmFormat, IoError> {
    let magic = Tokens::new(data)
        .next()
        .ok_or(IoError::TruncatedHeader("magic"))?;
    PnmFormat::from_magic(magic)
}

/// Decode a plain PGM (`P2`) or PPM (`P3`) document into a raster.
///
/// # Arguments
///
/// * `data` - The encoded bytes.
///
/// # Returns
///
/// The decoded raster. Gray documents yield one channel, color documents three.
///
/// # Examples
///
/// ```
/// use rasterfilt_io::decode_pnm;
///
/// let raster = decode_pnm(b"P2\n# tiny\n2 1\n255\n7 9\n").unwrap();
///
/// assert_eq!(raster.width(), 2);
/// assert_eq!(raster.as_slice(), &[7, 9]);
/// ```
pub fn decode_pnm(data: &[u8]) -> Result<Raster, IoError> {
    let mut tokens = Tokens::new(data);

    let magic = tokens.next().ok_or(IoError::TruncatedHeader("magic"))?;
    let format = PnmFormat::from_magic(magic)?;

    let width: usize = parse_field(&mut tokens, "width")?;
    let height: usize = parse_field(&mut tokens, "height")?;
    let max_sample: i32 = parse_field(&mut tokens, "max value")?;

    let channels = format.channels();
    let expected = width.saturating_mul(height).saturating_mul(channels.count());

    let mut samples = Vec::with_capacity(expected.min(data.len()));
    for token in tokens.by_ref().take(expected) {
        let value = token.parse::<i32>().map_err(|_| IoError::InvalidNumber {
            field: "sample",
            token: token.to_string(),
        })?;
        samples.push(value);
    }

    if samples.len() != expected {
        return Err(IoError::TruncatedSamples {
            expected,
            found: samples.len(),
        });
    }

    log::debug!(
        "decoded {} raster {}x{} max {}",
        format.magic(),
        width,
        height,
        max_sample
    );

    Ok(Raster::new(
        RasterSize { width, height },
        channels,
        max_sample,
        samples,
    )?)
}

/// Encode a raster as a plain PGM or PPM document.
///
/// The header is written as `magic`, `width height` and `max` on separate
/// lines, followed by one sample per line.
pub fn encode_pnm(raster: &Raster) -> Vec<u8> {
    use std::fmt::Write;

    let format = PnmFormat::for_channels(raster.channels());
    // header plus up to six characters per sample
    let mut out = String::with_capacity(32 + raster.as_slice().len() * 6);

    // writing into a String is infallible
    let _ = write!(
        out,
        "{}\n{} {}\n{}\n",
        format.magic(),
        raster.width(),
        raster.height(),
        raster.max_sample()
    );
    for v in raster.as_slice() {
        let _ = writeln!(out, "{v}");
    }

    out.into_bytes()
}
