use filtra_image::{ImageSize, PixelStore};

use super::convolution::clamp_to_u8;
use super::{apply_kernels, kernels, Kernel2d, MeanFormula};
use crate::config::FilterConfig;
use crate::error::FilterError;
use crate::parallel::WorkPartitioner;

/// Blur an image using a square box blur filter
///
/// # Arguments
///
/// * `src` - The source image.
/// * `side` - The side of the kernel, even sides are rounded down to the nearest odd number.
/// * `monochrome` - Whether to blur the luma instead of the color channels.
/// * `config` - The thread count and border policy.
pub fn box_blur<I: PixelStore>(
    src: &I,
    side: usize,
    monochrome: bool,
    config: &FilterConfig,
) -> Result<I, FilterError> {
    let kernel = kernels::box_blur_kernel(side)?;
    apply_kernels(src, monochrome, MeanFormula::Arithmetic, &[kernel], config)
}

/// Blur an image using a square gaussian blur filter
///
/// # Arguments
///
/// * `src` - The source image.
/// * `side` - The side of the kernel, must be odd.
/// * `sigma` - The standard deviation of the gaussian.
/// * `monochrome` - Whether to blur the luma instead of the color channels.
/// * `config` - The thread count and border policy.
pub fn gaussian_blur<I: PixelStore>(
    src: &I,
    side: usize,
    sigma: f64,
    monochrome: bool,
    config: &FilterConfig,
) -> Result<I, FilterError> {
    let kernel = kernels::gaussian_kernel(side, sigma)?;
    apply_kernels(src, monochrome, MeanFormula::Arithmetic, &[kernel], config)
}

/// Highlight the outlines of an image with the [`kernels::OUTLINE`] kernel.
pub fn outline<I: PixelStore>(
    src: &I,
    monochrome: bool,
    config: &FilterConfig,
) -> Result<I, FilterError> {
    let kernel = Kernel2d::try_from(kernels::OUTLINE)?;
    apply_kernels(src, monochrome, MeanFormula::Arithmetic, &[kernel], config)
}

/// Compute the sobel gradient magnitude of an image.
///
/// The luma of every interior pixel is convolved with [`kernels::SOBEL_X`] and
/// [`kernels::SOBEL_Y`] and `sqrt(gx² + gy²)` is written as a gray pixel. The one
/// pixel border has no complete neighbourhood and is dropped.
///
/// # Arguments
///
/// * `src` - The source image with size (W, H).
/// * `config` - The thread count. The border policy is not used.
///
/// # Returns
///
/// A new image with size (W - 2, H - 2).
///
/// # Errors
///
/// [`FilterError::ImageTooSmall`] when the source is narrower or shorter than 2 pixels.
///
/// # Example
///
/// ```
/// use filtra_image::{Image, ImageSize};
/// use filtra_imgproc::config::FilterConfig;
/// use filtra_imgproc::filter::sobel;
///
/// let image = Image::<u8, 3>::from_size_val(
///     ImageSize {
///         width: 5,
///         height: 4,
///     },
///     200,
/// )
/// .unwrap();
///
/// let edges = sobel(&image, &FilterConfig::default()).unwrap();
///
/// assert_eq!(edges.width(), 3);
/// assert_eq!(edges.height(), 2);
/// assert!(edges.as_slice().iter().all(|&v| v == 0));
/// ```
pub fn sobel<I: PixelStore>(src: &I, config: &FilterConfig) -> Result<I, FilterError> {
    let (width, height) = (src.width(), src.height());
    if width < 2 || height < 2 {
        return Err(FilterError::ImageTooSmall(width, height, 2, 2));
    }

    let mut dst = I::blank(ImageSize {
        width: width - 2,
        height: height - 2,
    })?;

    let partitioner = WorkPartitioner::new(config.num_threads);
    let grid = partitioner.run(width, height, |x, y| -> Result<Option<u8>, FilterError> {
        if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
            return Ok(None);
        }

        let mut gx = 0.0;
        let mut gy = 0.0;
        for ky in 0..3 {
            for kx in 0..3 {
                let luma = src.luma(x + kx - 1, y + ky - 1)? as f64;
                gx += kernels::SOBEL_X[ky][kx] * luma;
                gy += kernels::SOBEL_Y[ky][kx] * luma;
            }
        }

        Ok(Some(clamp_to_u8((gx * gx + gy * gy).sqrt())))
    })?;

    for (x, y, magnitude) in grid.into_cells() {
        if let Some(magnitude) = magnitude {
            dst.set_luma(x - 1, y - 1, magnitude)?;
        }
    }

    Ok(dst)
}
