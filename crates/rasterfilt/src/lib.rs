#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use rasterfilt_image as image;

#[doc(inline)]
pub use rasterfilt_imgproc as imgproc;

#[doc(inline)]
pub use rasterfilt_io as io;
