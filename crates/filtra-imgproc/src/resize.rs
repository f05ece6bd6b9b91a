use filtra_image::{Channel, ImageError, ImageSize, PixelAccess, PixelStore};

/// Interpolation mode for the resize operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    /// Weighted average of the four neighbouring pixels.
    #[default]
    Bilinear,
    /// The nearest pixel.
    Nearest,
}

/// Map `n` evenly spaced samples over `[0, len - 1]`.
fn linspace(len: usize, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 {
        (len - 1) as f64 / (n - 1) as f64
    } else {
        0.0
    };
    (0..n).map(move |i| i as f64 * step)
}

fn bilinear_interpolation<I: PixelAccess>(
    image: &I,
    u: f64,
    v: f64,
) -> Result<[u8; 3], ImageError> {
    let (rows, cols) = (image.height(), image.width());

    let iu0 = (u.trunc() as usize).min(cols - 1);
    let iv0 = (v.trunc() as usize).min(rows - 1);
    let iu1 = if iu0 + 1 < cols { iu0 + 1 } else { iu0 };
    let iv1 = if iv0 + 1 < rows { iv0 + 1 } else { iv0 };

    let frac_u = u.fract();
    let frac_v = v.fract();

    let w00 = (1.0 - frac_u) * (1.0 - frac_v);
    let w01 = frac_u * (1.0 - frac_v);
    let w10 = (1.0 - frac_u) * frac_v;
    let w11 = frac_u * frac_v;

    let mut pixel = [0u8; 3];
    for channel in Channel::ALL {
        let p00 = image.get_channel(iu0, iv0, channel)? as f64;
        let p01 = image.get_channel(iu1, iv0, channel)? as f64;
        let p10 = image.get_channel(iu0, iv1, channel)? as f64;
        let p11 = image.get_channel(iu1, iv1, channel)? as f64;

        let value = p00 * w00 + p01 * w01 + p10 * w10 + p11 * w11;
        pixel[channel.index()] = value.round().clamp(0.0, 255.0) as u8;
    }

    Ok(pixel)
}

fn nearest_interpolation<I: PixelAccess>(
    image: &I,
    u: f64,
    v: f64,
) -> Result<[u8; 3], ImageError> {
    let iu = (u.round() as usize).min(image.width() - 1);
    let iv = (v.round() as usize).min(image.height() - 1);

    let mut pixel = [0u8; 3];
    for channel in Channel::ALL {
        pixel[channel.index()] = image.get_channel(iu, iv, channel)?;
    }

    Ok(pixel)
}

/// Resize an image to a new size.
///
/// The corner pixels of the source map onto the corner pixels of the output and the
/// output pixels in between are sampled at evenly spaced source coordinates.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `new_size` - The size of the output image.
/// * `interpolation` - The interpolation mode to use.
///
/// # Returns
///
/// A new image with the requested size.
///
/// # Errors
///
/// An image with no pixels cannot be resized to a non-empty size.
///
/// # Example
///
/// ```
/// use filtra_image::{Image, ImageSize};
/// use filtra_imgproc::resize::{resize, InterpolationMode};
///
/// let image = Image::<u8, 3>::new(
///     ImageSize {
///         width: 2,
///         height: 1,
///     },
///     vec![0, 0, 0, 100, 100, 100],
/// )
/// .unwrap();
///
/// let resized = resize(
///     &image,
///     ImageSize {
///         width: 3,
///         height: 1,
///     },
///     InterpolationMode::Bilinear,
/// )
/// .unwrap();
///
/// assert_eq!(resized.as_slice(), &[0, 0, 0, 50, 50, 50, 100, 100, 100]);
/// ```
pub fn resize<I: PixelStore>(
    src: &I,
    new_size: ImageSize,
    interpolation: InterpolationMode,
) -> Result<I, ImageError> {
    let src_size = src.size();

    if new_size.area() == 0 {
        return I::blank(new_size);
    }

    if src_size.area() == 0 {
        return Err(ImageError::InvalidImageSize(
            src_size.width,
            src_size.height,
            new_size.width,
            new_size.height,
        ));
    }

    log::trace!("resizing {src_size} to {new_size} ({interpolation:?})");

    let mut dst = I::blank(new_size)?;

    for (y, v) in linspace(src_size.height, new_size.height).enumerate() {
        for (x, u) in linspace(src_size.width, new_size.width).enumerate() {
            let pixel = match interpolation {
                InterpolationMode::Bilinear => bilinear_interpolation(src, u, v)?,
                InterpolationMode::Nearest => nearest_interpolation(src, u, v)?,
            };
            for channel in Channel::ALL {
                dst.set_channel(x, y, channel, pixel[channel.index()])?;
            }
        }
    }

    Ok(dst)
}

/// Resize an image to a new size with bilinear interpolation. See [`resize`].
pub fn resize_bilinear<I: PixelStore>(src: &I, new_size: ImageSize) -> Result<I, ImageError> {
    resize(src, new_size, InterpolationMode::Bilinear)
}
