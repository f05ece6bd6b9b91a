#![deny(missing_docs)]
//! Image types and traits for generating and manipulating images

/// image representation for image processing purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

/// Channel level pixel access traits.
pub mod pixel;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize, Rgb8};
pub use crate::pixel::{Channel, PixelAccess, PixelStore};
