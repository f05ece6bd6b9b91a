use filtra_image::{Channel, Image, ImageError, ImageSize, PixelAccess, PixelStore};
use filtra_imgproc::config::FilterConfig;
use filtra_imgproc::error::{ErrorKind, FilterError};
use filtra_imgproc::filter::{
    apply_kernels, box_blur, kernels, sobel, BorderMode, Kernel2d, KernelError, MeanFormula,
};
use filtra_imgproc::parallel::{ParallelError, ThreadCount};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn random_image(width: usize, height: usize, seed: u64) -> Result<Image<u8, 3>, ImageError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..width * height * 3).map(|_| rng.random()).collect();
    Image::new(ImageSize { width, height }, data)
}

fn config(threads: usize) -> Result<FilterConfig, ParallelError> {
    Ok(FilterConfig::default().with_num_threads(ThreadCount::new(threads)?))
}

#[test]
fn uniform_box_blur_keeps_color() -> Result<(), FilterError> {
    init_logger();

    // 1 / side² is exact for side 1, the others may round down by one
    let image = Image::<u8, 3>::new([9, 7].into(), [30u8, 140, 255].repeat(63))?;

    for side in [1, 3, 5, 7] {
        for monochrome in [false, true] {
            let blurred = box_blur(&image, side, monochrome, &config(4)?)?;
            assert_eq!(blurred.size(), image.size());

            let expected = if monochrome {
                let l = image.luma(0, 0)?;
                [l, l, l]
            } else {
                [30, 140, 255]
            };
            for pixel in blurred.as_slice().chunks_exact(3) {
                for (value, expected) in pixel.iter().zip(expected) {
                    assert!(*value == expected || *value + 1 == expected);
                }
            }
        }
    }

    Ok(())
}

#[test]
fn identity_kernel_is_noop_for_every_formula() -> Result<(), FilterError> {
    init_logger();

    let image = random_image(13, 11, 7)?;
    let identity = [Kernel2d::try_from(kernels::IDENTITY)?];

    for threads in [1, 2, 3, 4, 14] {
        for border in [BorderMode::Legacy, BorderMode::Replicate, BorderMode::Reflect101] {
            let config = config(threads)?.with_border(border);
            for formula in [MeanFormula::Arithmetic, MeanFormula::Geometric] {
                let filtered = apply_kernels(&image, false, formula, &identity, &config)?;
                assert_eq!(filtered, image);
            }
        }
    }

    Ok(())
}

#[test]
fn single_kernel_formulas_agree_on_binary_image() -> Result<(), FilterError> {
    // m² == m only holds for 0 and 1
    let mut rng = StdRng::seed_from_u64(3);
    let data = (0..8 * 6 * 3).map(|_| rng.random_range(0..=1u8)).collect();
    let image = Image::<u8, 3>::new([8, 6].into(), data)?;

    let identity = [Kernel2d::try_from(kernels::IDENTITY)?];
    let config = FilterConfig::default();

    let arithmetic = apply_kernels(&image, false, MeanFormula::Arithmetic, &identity, &config)?;
    for formula in [MeanFormula::Geometric, MeanFormula::RootMeanSquare] {
        let filtered = apply_kernels(&image, false, formula, &identity, &config)?;
        assert_eq!(filtered, arithmetic);
    }

    Ok(())
}

#[test]
fn color_result_is_independent_of_thread_count() -> Result<(), FilterError> {
    init_logger();

    let image = random_image(31, 17, 11)?;
    let sobel_kernels = [
        Kernel2d::try_from(kernels::SOBEL_X)?,
        Kernel2d::try_from(kernels::SOBEL_Y)?,
    ];

    for monochrome in [false, true] {
        let reference = apply_kernels(
            &image,
            monochrome,
            MeanFormula::RootMeanSquare,
            &sobel_kernels,
            &config(1)?,
        )?;
        for threads in [2, 5, 32] {
            let filtered = apply_kernels(
                &image,
                monochrome,
                MeanFormula::RootMeanSquare,
                &sobel_kernels,
                &config(threads)?,
            )?;
            assert_eq!(filtered, reference);
        }
    }

    Ok(())
}

#[test]
fn legacy_border_at_top_left_corner() -> Result<(), FilterError> {
    // value of (x, y) is 5 * y + x on every channel
    let data = (0..25u8).flat_map(|v| [v; 3]).collect();
    let image = Image::<u8, 3>::new([5, 5].into(), data)?;

    // the taps of (0, 0) along each axis are 1, 0, 1
    let taps = [1usize, 0, 1];
    for ky in 0..3 {
        for kx in 0..3 {
            let mut weights = vec![0.0; 9];
            weights[ky * 3 + kx] = 1.0;
            let kernel = [Kernel2d::new(3, 3, weights)?];

            let filtered = apply_kernels(
                &image,
                false,
                MeanFormula::Arithmetic,
                &kernel,
                &FilterConfig::default(),
            )?;

            let expected = (5 * taps[ky] + taps[kx]) as u8;
            assert_eq!(filtered.get_channel(0, 0, Channel::Green)?, expected);
        }
    }

    Ok(())
}

#[test]
fn sobel_of_uniform_image_is_black() -> Result<(), FilterError> {
    init_logger();

    for (width, height) in [(3, 3), (10, 4), (17, 23)] {
        let image = Image::<u8, 3>::from_size_val([width, height].into(), 77)?;
        for threads in [1, 3, 8] {
            let edges = sobel(&image, &config(threads)?)?;
            assert_eq!(edges.size(), ImageSize::from([width - 2, height - 2]));
            assert!(edges.as_slice().iter().all(|&v| v == 0));
        }
    }

    Ok(())
}

#[test]
fn invalid_arguments_are_reported() -> Result<(), FilterError> {
    let image = random_image(4, 4, 1)?;

    let even = Kernel2d::new(2, 2, vec![0.25; 4]).map_err(FilterError::from);
    assert_eq!(even, Err(FilterError::Kernel(KernelError::EvenSize(2, 2))));
    assert_eq!(even.map(|_| ()).map_err(|e| e.kind()), Err(ErrorKind::InvalidArgument));

    let zero_threads = ThreadCount::new(0).map_err(FilterError::from);
    assert_eq!(zero_threads.map(|_| ()).map_err(|e| e.kind()), Err(ErrorKind::InvalidArgument));

    let unknown = MeanFormula::try_from(3i32).map_err(|e| e.kind());
    assert_eq!(unknown, Err(ErrorKind::InvalidArgument));
    assert!("median".parse::<MeanFormula>().is_err());

    let empty = apply_kernels(
        &image,
        false,
        MeanFormula::Arithmetic,
        &[],
        &FilterConfig::default(),
    );
    assert_eq!(empty.map(|_| ()).map_err(|e| e.kind()), Err(ErrorKind::InvalidArgument));

    Ok(())
}

#[test]
fn out_of_bounds_access_leaves_image_untouched() -> Result<(), FilterError> {
    let mut image = random_image(3, 2, 5)?;
    let before = image.clone();

    let err = FilterError::from(
        image
            .set_channel(3, 0, Channel::Red, 0)
            .expect_err("x is out of bounds"),
    );
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(image.set_luma(0, 2, 9).is_err());
    assert!(image.get_channel(0, 2, Channel::Blue).is_err());

    assert_eq!(image, before);

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Fault {
    Panic,
    Error,
}

/// An image that fails when one channel of one column is read.
struct FaultyImage {
    inner: Image<u8, 3>,
    fault: Option<(Fault, Channel, usize)>,
}

impl FaultyImage {
    fn new(fault: Fault, channel: Channel, column: usize) -> Result<Self, ImageError> {
        Ok(Self {
            inner: random_image(9, 6, 21)?,
            fault: Some((fault, channel, column)),
        })
    }
}

impl PixelAccess for FaultyImage {
    fn size(&self) -> ImageSize {
        self.inner.size()
    }

    fn get_channel(&self, x: usize, y: usize, channel: Channel) -> Result<u8, ImageError> {
        match self.fault {
            Some((Fault::Panic, c, column)) if c == channel && x == column => {
                panic!("injected fault")
            }
            Some((Fault::Error, c, column)) if c == channel && x == column => Err(
                ImageError::PixelIndexOutOfBounds(x, y, self.width(), self.height()),
            ),
            _ => self.inner.get_channel(x, y, channel),
        }
    }
}

impl PixelStore for FaultyImage {
    fn blank(size: ImageSize) -> Result<Self, ImageError> {
        Ok(Self {
            inner: <Image<u8, 3> as PixelStore>::blank(size)?,
            fault: None,
        })
    }

    fn set_channel(
        &mut self,
        x: usize,
        y: usize,
        channel: Channel,
        value: u8,
    ) -> Result<(), ImageError> {
        self.inner.set_channel(x, y, channel, value)
    }
}

fn blur_faulty(
    image: &FaultyImage,
    monochrome: bool,
    threads: usize,
) -> Result<FaultyImage, FilterError> {
    let blur = [Kernel2d::try_from(kernels::BOX_3X3_BLUR)?];
    apply_kernels(image, monochrome, MeanFormula::Arithmetic, &blur, &config(threads)?)
}

#[test]
fn panicking_worker_fails_the_operation() -> Result<(), FilterError> {
    init_logger();

    let image = FaultyImage::new(Fault::Panic, Channel::Blue, 5)?;

    for threads in [1, 3, 7] {
        for monochrome in [false, true] {
            let err = blur_faulty(&image, monochrome, threads)
                .err()
                .expect("a panicking read fails the convolution");
            assert_eq!(err.kind(), ErrorKind::ConcurrencyFault);
            assert_eq!(
                err,
                FilterError::Parallel(ParallelError::WorkerPanicked("injected fault".into()))
            );
        }

        let err = sobel(&image, &config(threads)?)
            .err()
            .expect("a panicking read fails the edge detection");
        assert_eq!(err.kind(), ErrorKind::ConcurrencyFault);
    }

    Ok(())
}

#[test]
fn failing_read_fails_the_operation() -> Result<(), FilterError> {
    init_logger();

    let image = FaultyImage::new(Fault::Error, Channel::Green, 5)?;

    for threads in [1, 3, 7] {
        for monochrome in [false, true] {
            let err = blur_faulty(&image, monochrome, threads)
                .err()
                .expect("a failing read fails the convolution");
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
            assert!(matches!(
                err,
                FilterError::Image(ImageError::PixelIndexOutOfBounds(5, _, 9, 6))
            ));
        }

        let err = sobel(&image, &config(threads)?)
            .err()
            .expect("a failing read fails the edge detection");
        assert!(matches!(err, FilterError::Image(_)));
    }

    // the same image without a fault filters fine
    let healthy = FaultyImage {
        fault: None,
        ..image
    };
    assert_eq!(blur_faulty(&healthy, false, 3)?.size(), healthy.size());

    Ok(())
}
