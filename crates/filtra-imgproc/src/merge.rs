use filtra_image::{Channel, ImageSize, PixelAccess, PixelStore};

use crate::config::FilterConfig;
use crate::error::FilterError;
use crate::parallel::{ThreadCount, WorkPartitioner};
use crate::resize::resize_bilinear;

/// Average the channels of `sources` at `(x, y)`. All sources share the same size.
fn average_pixel<I: PixelAccess>(
    sources: &[&I],
    x: usize,
    y: usize,
) -> Result<[u8; 3], FilterError> {
    let mut pixel = [0u8; 3];
    for channel in Channel::ALL {
        let mut sum = 0usize;
        for src in sources {
            sum += src.get_channel(x, y, channel)? as usize;
        }
        pixel[channel.index()] = (sum / sources.len()) as u8;
    }
    Ok(pixel)
}

/// Average `sources` into a new image of the given size.
fn average<I: PixelStore>(
    sources: &[&I],
    size: ImageSize,
    threads: ThreadCount,
) -> Result<I, FilterError> {
    let mut dst = I::blank(size)?;

    let grid = WorkPartitioner::new(threads).run(size.width, size.height, |x, y| {
        average_pixel(sources, x, y)
    })?;

    for (x, y, pixel) in grid.into_cells() {
        for channel in Channel::ALL {
            dst.set_channel(x, y, channel, pixel[channel.index()])?;
        }
    }

    Ok(dst)
}

/// Merge two images by averaging them channel by channel.
///
/// When the sizes differ `other` is first resized to the size of `current` with
/// bilinear interpolation. Every output sample is `(a + b) / 2` rounded down.
///
/// # Arguments
///
/// * `current` - The image that gives the output size.
/// * `other` - The image merged into `current`.
/// * `config` - The thread count. The border policy is not used.
///
/// # Returns
///
/// A new image with the size of `current`.
///
/// # Errors
///
/// [`FilterError::Resize`] when `other` cannot be resized.
///
/// # Example
///
/// ```
/// use filtra_image::{Image, ImageSize};
/// use filtra_imgproc::config::FilterConfig;
/// use filtra_imgproc::merge::merge;
///
/// let size = ImageSize {
///     width: 3,
///     height: 2,
/// };
/// let dark = Image::<u8, 3>::from_size_val(size, 10).unwrap();
/// let light = Image::<u8, 3>::from_size_val(size, 21).unwrap();
///
/// let merged = merge(&dark, &light, &FilterConfig::default()).unwrap();
///
/// assert!(merged.as_slice().iter().all(|&v| v == 15));
/// ```
pub fn merge<I: PixelStore>(
    current: &I,
    other: &I,
    config: &FilterConfig,
) -> Result<I, FilterError> {
    let size = current.size();

    let resized;
    let other = if other.size() == size {
        other
    } else {
        log::debug!("resizing merged image from {} to {size}", other.size());
        resized = resize_bilinear(other, size).map_err(FilterError::Resize)?;
        &resized
    };

    average(&[current, other], size, config.num_threads)
}

/// Merge a list of images by averaging them channel by channel.
///
/// The output has the largest width and the largest height found in `images`; every
/// image of a different size is resized to it with bilinear interpolation first. Each
/// output sample is the sum of the samples divided by the number of images, rounded down.
///
/// # Arguments
///
/// * `images` - The images to merge.
/// * `threads` - The number of worker threads.
///
/// # Returns
///
/// The merged image, or a `0x0` image when `images` is empty.
///
/// # Errors
///
/// [`FilterError::Resize`] when one of the images cannot be resized, e.g. an
/// image without pixels next to non-empty ones.
pub fn merge_all<I: PixelStore>(images: &[I], threads: ThreadCount) -> Result<I, FilterError> {
    if images.is_empty() {
        return Ok(I::blank(ImageSize::default())?);
    }

    let size = images.iter().fold(ImageSize::default(), |acc, image| ImageSize {
        width: acc.width.max(image.width()),
        height: acc.height.max(image.height()),
    });

    log::debug!("merging {} image(s) into {size}", images.len());

    let resized = images
        .iter()
        .map(|image| {
            if image.size() == size {
                Ok(None)
            } else {
                resize_bilinear(image, size).map(Some).map_err(FilterError::Resize)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let sources = images
        .iter()
        .zip(&resized)
        .map(|(image, resized)| resized.as_ref().unwrap_or(image))
        .collect::<Vec<_>>();

    average(&sources, size, threads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use filtra_image::{Image, ImageError};

    fn pattern(width: usize, height: usize, seed: usize) -> Result<Image<u8, 3>, ImageError> {
        let data = (0..width * height * 3)
            .map(|i| ((i * 37 + seed * 11) % 256) as u8)
            .collect();
        Image::new(ImageSize { width, height }, data)
    }

    #[test]
    fn test_merge_with_itself() -> Result<(), FilterError> {
        let image = pattern(7, 4, 1)?;
        for threads in [1, 2, 5] {
            let config = FilterConfig::default().with_num_threads(ThreadCount::new(threads)?);
            assert_eq!(merge(&image, &image, &config)?, image);
        }
        Ok(())
    }

    #[test]
    fn test_merge_rounds_down() -> Result<(), FilterError> {
        let a = Image::<u8, 3>::new([1, 1].into(), vec![0, 255, 7])?;
        let b = Image::<u8, 3>::new([1, 1].into(), vec![1, 254, 8])?;
        let merged = merge(&a, &b, &FilterConfig::default())?;
        assert_eq!(merged.as_slice(), &[0, 254, 7]);
        Ok(())
    }

    #[test]
    fn test_merge_resizes_other() -> Result<(), FilterError> {
        let current = Image::<u8, 3>::from_size_val([4, 3].into(), 100)?;
        let other = Image::<u8, 3>::from_size_val([2, 2].into(), 50)?;

        let merged = merge(&current, &other, &FilterConfig::default())?;
        assert_eq!(merged.size(), current.size());
        assert!(merged.as_slice().iter().all(|&v| v == 75));

        Ok(())
    }

    #[test]
    fn test_merge_empty_other() -> Result<(), FilterError> {
        let current = Image::<u8, 3>::from_size_val([4, 3].into(), 100)?;
        let other = Image::<u8, 3>::new([0, 0].into(), vec![])?;

        let err = merge(&current, &other, &FilterConfig::default())
            .expect_err("an empty image cannot be upscaled");
        assert_eq!(err, FilterError::Resize(ImageError::InvalidImageSize(0, 0, 4, 3)));
        assert_eq!(err.kind(), ErrorKind::ResourceFault);

        Ok(())
    }

    #[test]
    fn test_merge_all_copies() -> Result<(), FilterError> {
        let image = pattern(5, 6, 3)?;
        for k in 1..=4 {
            let copies = vec![image.clone(); k];
            assert_eq!(merge_all(&copies, ThreadCount::new(3)?)?, image);
        }
        Ok(())
    }

    #[test]
    fn test_merge_all_average() -> Result<(), FilterError> {
        let images = [10u8, 20, 40]
            .into_iter()
            .map(|v| Image::<u8, 3>::from_size_val([3, 3].into(), v))
            .collect::<Result<Vec<_>, _>>()?;

        let merged = merge_all(&images, ThreadCount::default())?;
        // 70 / 3
        assert!(merged.as_slice().iter().all(|&v| v == 23));

        Ok(())
    }

    #[test]
    fn test_merge_all_takes_max_size() -> Result<(), FilterError> {
        let wide = Image::<u8, 3>::from_size_val([6, 2].into(), 30)?;
        let tall = Image::<u8, 3>::from_size_val([3, 5].into(), 90)?;

        let merged = merge_all(&[wide, tall], ThreadCount::default())?;
        assert_eq!(merged.size(), ImageSize::from([6, 5]));
        assert!(merged.as_slice().iter().all(|&v| v == 60));

        Ok(())
    }

    #[test]
    fn test_merge_all_empty() -> Result<(), FilterError> {
        let merged = merge_all::<Image<u8, 3>>(&[], ThreadCount::default())?;
        assert_eq!(merged.size(), ImageSize::default());
        assert!(merged.as_slice().is_empty());
        Ok(())
    }
}
