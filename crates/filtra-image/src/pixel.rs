use crate::{
    error::ImageError,
    image::{Image, ImageSize},
};

/// A color channel of an 8-bit RGB pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// The red channel.
    Red,
    /// The green channel.
    Green,
    /// The blue channel.
    Blue,
}

impl Channel {
    /// All the color channels in storage order.
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// The interleaved index of the channel within a pixel.
    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        };
        f.write_str(name)
    }
}

/// Compute the monochrome luma of an RGB triple.
///
/// `luma = floor(0.3 * R + 0.59 * G + 0.11 * B)`
///
/// # Examples
///
/// ```
/// use filtra_image::pixel::luma;
///
/// assert_eq!(luma(255, 255, 255), 255);
/// assert_eq!(luma(100, 0, 0), 30);
/// ```
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    (0.3 * r as f64 + 0.59 * g as f64 + 0.11 * b as f64) as u8
}

/// Read access to the pixels of an 8-bit RGB image.
///
/// Implementors must be safe to read from several threads at once.
pub trait PixelAccess: Sync {
    /// The size of the image in pixels.
    fn size(&self) -> ImageSize;

    /// Read a single channel value at `(x, y)`.
    ///
    /// # Errors
    ///
    /// If the coordinates are out of bounds, an error is returned.
    fn get_channel(&self, x: usize, y: usize, channel: Channel) -> Result<u8, ImageError>;

    /// The width of the image in pixels.
    fn width(&self) -> usize {
        self.size().width
    }

    /// The height of the image in pixels.
    fn height(&self) -> usize {
        self.size().height
    }

    /// Read the monochrome luma at `(x, y)`. See [`luma`].
    fn luma(&self, x: usize, y: usize) -> Result<u8, ImageError> {
        Ok(luma(
            self.get_channel(x, y, Channel::Red)?,
            self.get_channel(x, y, Channel::Green)?,
            self.get_channel(x, y, Channel::Blue)?,
        ))
    }
}

/// Write access to the pixels of an 8-bit RGB image.
pub trait PixelStore: PixelAccess + Sized {
    /// Allocate a black image of the given size.
    fn blank(size: ImageSize) -> Result<Self, ImageError>;

    /// Write a single channel value at `(x, y)`.
    ///
    /// # Errors
    ///
    /// If the coordinates are out of bounds, an error is returned and nothing is written.
    fn set_channel(
        &mut self,
        x: usize,
        y: usize,
        channel: Channel,
        value: u8,
    ) -> Result<(), ImageError>;

    /// Write the same value to every channel at `(x, y)`.
    fn set_luma(&mut self, x: usize, y: usize, value: u8) -> Result<(), ImageError> {
        for channel in Channel::ALL {
            self.set_channel(x, y, channel, value)?;
        }
        Ok(())
    }
}

impl PixelAccess for Image<u8, 3> {
    fn size(&self) -> ImageSize {
        Image::size(self)
    }

    fn get_channel(&self, x: usize, y: usize, channel: Channel) -> Result<u8, ImageError> {
        self.get_pixel(x, y, channel.index())
    }
}

impl PixelStore for Image<u8, 3> {
    fn blank(size: ImageSize) -> Result<Self, ImageError> {
        Image::from_size_val(size, 0)
    }

    fn set_channel(
        &mut self,
        x: usize,
        y: usize,
        channel: Channel,
        value: u8,
    ) -> Result<(), ImageError> {
        self.set_pixel(x, y, channel.index(), value)
    }

    // bounds are checked once for the whole pixel
    fn set_luma(&mut self, x: usize, y: usize, value: u8) -> Result<(), ImageError> {
        self.pixel_mut(x, y)?.fill(value);
        Ok(())
    }
}
