#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use filtra_image as image;

#[doc(inline)]
pub use filtra_imgproc as imgproc;
