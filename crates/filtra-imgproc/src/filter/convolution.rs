use std::thread;

use filtra_image::{Channel, ImageError, PixelAccess, PixelStore};

use super::{BorderMode, Kernel2d, MeanFormula};
use crate::config::FilterConfig;
use crate::error::FilterError;
use crate::parallel::{panic_message, CellGrid, ParallelError, WorkPartitioner};

/// The source value a convolution reads at each tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sample {
    /// The monochrome luma of the pixel.
    Luma,
    /// A single color channel of the pixel.
    Channel(Channel),
}

impl Sample {
    #[inline]
    fn read<I>(self, src: &I, x: usize, y: usize) -> Result<u8, ImageError>
    where
        I: PixelAccess + ?Sized,
    {
        match self {
            Sample::Luma => src.luma(x, y),
            Sample::Channel(channel) => src.get_channel(x, y, channel),
        }
    }
}

/// Clamp a filter response to `[0, 255]` and truncate it. NaN maps to 0.
#[inline]
pub(crate) fn clamp_to_u8(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

/// Compute the filtered value of a single output pixel.
///
/// Every kernel is convolved around `(x, y)`, its magnitude folded into the
/// accumulator of `formula`, and the normalized result clamped to a sample.
pub(crate) fn convolve_pixel<I: PixelAccess + ?Sized>(
    src: &I,
    x: usize,
    y: usize,
    sample: Sample,
    formula: MeanFormula,
    kernels: &[Kernel2d],
    border: BorderMode,
) -> Result<u8, ImageError> {
    let (width, height) = (src.width(), src.height());

    let mut total = formula.identity();
    for kernel in kernels {
        let (kdx, kdy) = kernel.center();

        let mut magnitude = 0.0;
        for ky in 0..kernel.rows() {
            let sy = border.sample(y, ky, kdy, height);
            for kx in 0..kernel.cols() {
                let sx = border.sample(x, kx, kdx, width);
                magnitude += kernel.weight(kx, ky) * sample.read(src, sx, sy)? as f64;
            }
        }

        total = formula.fold(total, magnitude);
    }

    Ok(clamp_to_u8(formula.normalize(total, kernels.len())))
}

/// Filter an image with one or more kernels whose responses are combined per pixel.
///
/// In monochrome mode the luma of the source is convolved and the result is written
/// to all three channels of the output. Otherwise every color channel is filtered
/// independently on its own thread, each channel split over
/// [`ThreadCount::per_channel`](crate::parallel::ThreadCount::per_channel) workers.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `monochrome` - Whether to filter the luma instead of the color channels.
/// * `formula` - How the responses of the kernels are combined.
/// * `kernels` - The kernels to apply, at least one.
/// * `config` - The thread count and border policy.
///
/// # Returns
///
/// A new image with the size of `src`.
///
/// # Errors
///
/// [`FilterError::NoKernels`] when `kernels` is empty, or the first failure of any worker.
///
/// # Example
///
/// ```
/// use filtra_image::{Image, ImageSize};
/// use filtra_imgproc::config::FilterConfig;
/// use filtra_imgproc::filter::{apply_kernels, kernels, Kernel2d, MeanFormula};
///
/// let image = Image::<u8, 3>::from_size_val(
///     ImageSize {
///         width: 6,
///         height: 4,
///     },
///     90,
/// )
/// .unwrap();
///
/// let blur = Kernel2d::try_from(kernels::BOX_3X3_BLUR).unwrap();
/// let blurred = apply_kernels(
///     &image,
///     false,
///     MeanFormula::Arithmetic,
///     &[blur],
///     &FilterConfig::default(),
/// )
/// .unwrap();
///
/// assert_eq!(blurred.size(), image.size());
/// assert!(blurred.as_slice().iter().all(|&v| v == 89 || v == 90));
/// ```
pub fn apply_kernels<I: PixelStore>(
    src: &I,
    monochrome: bool,
    formula: MeanFormula,
    kernels: &[Kernel2d],
    config: &FilterConfig,
) -> Result<I, FilterError> {
    if kernels.is_empty() {
        return Err(FilterError::NoKernels);
    }

    let size = src.size();
    let border = config.border;

    log::debug!(
        "applying {} kernel(s) to {size}, formula: {formula}, monochrome: {monochrome}",
        kernels.len()
    );

    let mut dst = I::blank(size)?;

    if monochrome {
        let grid = WorkPartitioner::new(config.num_threads).run(size.width, size.height, |x, y| {
            convolve_pixel(src, x, y, Sample::Luma, formula, kernels, border)
                .map_err(FilterError::from)
        })?;

        for (x, y, value) in grid.into_cells() {
            dst.set_luma(x, y, value)?;
        }

        return Ok(dst);
    }

    let workers = config.num_threads.per_channel();

    let grids = thread::scope(|s| {
        let handles = Channel::ALL
            .into_iter()
            .map(|channel| {
                log::debug!("spawning {channel} channel thread with {workers} worker(s)");
                thread::Builder::new()
                    .name(format!("filtra-{channel}"))
                    .spawn_scoped(s, move || {
                        let grid = WorkPartitioner::new(workers).run(
                            size.width,
                            size.height,
                            |x, y| {
                                let sample = Sample::Channel(channel);
                                convolve_pixel(src, x, y, sample, formula, kernels, border)
                                    .map_err(FilterError::from)
                            },
                        )?;
                        Ok::<_, FilterError>((channel, grid))
                    })
                    .map_err(|e| ParallelError::SpawnError(e.to_string()))
            })
            .collect::<Vec<_>>();

        join_channels(handles)
    })?;

    for (channel, grid) in grids {
        for (x, y, value) in grid.into_cells() {
            dst.set_channel(x, y, channel, value)?;
        }
    }

    Ok(dst)
}

type ChannelGrid = (Channel, CellGrid<u8>);

type ChannelHandle<'scope> =
    Result<thread::ScopedJoinHandle<'scope, Result<ChannelGrid, FilterError>>, ParallelError>;

/// Wait for every channel thread, then report the first failure if any.
fn join_channels(handles: Vec<ChannelHandle<'_>>) -> Result<Vec<ChannelGrid>, FilterError> {
    let results = handles
        .into_iter()
        .map(|handle| match handle?.join() {
            Ok(result) => result,
            Err(payload) => {
                Err(ParallelError::WorkerPanicked(panic_message(payload.as_ref())).into())
            }
        })
        .collect::<Vec<_>>();

    results.into_iter().collect()
}
