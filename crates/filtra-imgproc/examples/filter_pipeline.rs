use filtra_image::{Image, ImageSize, PixelAccess};
use filtra_imgproc::config::FilterConfig;
use filtra_imgproc::filter::{apply_kernels, box_blur, kernels, sobel, Kernel2d, MeanFormula};
use filtra_imgproc::merge::merge_all;

fn checkerboard(size: ImageSize, cell: usize) -> Result<Image<u8, 3>, Box<dyn std::error::Error>> {
    let data = (0..size.height)
        .flat_map(|y| {
            (0..size.width).flat_map(move |x| {
                if (x / cell + y / cell) % 2 == 0 {
                    [230, 200, 40]
                } else {
                    [20, 60, 180]
                }
            })
        })
        .collect();
    Ok(Image::new(size, data)?)
}

fn mean_luma(image: &Image<u8, 3>) -> Result<f64, Box<dyn std::error::Error>> {
    let mut sum = 0.0;
    for y in 0..image.height() {
        for x in 0..image.width() {
            sum += image.luma(x, y)? as f64;
        }
    }
    Ok(sum / image.size().area().max(1) as f64)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = FilterConfig::from_env();
    log::info!("running with {} thread(s)", config.num_threads);

    let image = checkerboard(
        ImageSize {
            width: 320,
            height: 240,
        },
        16,
    )?;

    let blurred = box_blur(&image, 5, false, &config)?;
    log::info!("box blur mean luma: {:.2}", mean_luma(&blurred)?);

    let gradients = [
        Kernel2d::try_from(kernels::SOBEL_X)?,
        Kernel2d::try_from(kernels::SOBEL_Y)?,
    ];
    let magnitude = apply_kernels(&image, true, MeanFormula::RootMeanSquare, &gradients, &config)?;
    log::info!("gradient kernels mean luma: {:.2}", mean_luma(&magnitude)?);

    let edges = sobel(&image, &config)?;
    log::info!("sobel {} mean luma: {:.2}", edges.size(), mean_luma(&edges)?);

    let merged = merge_all(&[image, blurred, edges], config.num_threads)?;
    log::info!("merged {} mean luma: {:.2}", merged.size(), mean_luma(&merged)?);

    Ok(())
}
