use thiserror::Error;

/// Errors raised when building a convolution kernel.
#[derive(Error, Debug, PartialEq)]
pub enum KernelError {
    /// Both kernel dimensions must be odd so that a center cell exists.
    #[error("kernel dimensions must be odd, got {0}x{1}")]
    EvenSize(usize, usize),

    /// The kernel has no cells.
    #[error("kernel must not be empty")]
    Empty,

    /// The weights do not fill the kernel.
    #[error("kernel data length ({0}) does not match the kernel size ({1})")]
    InvalidDataLength(usize, usize),

    /// The rows of the kernel have different lengths.
    #[error("kernel rows must have the same length")]
    RaggedRows,

    /// A generated kernel was requested with a non-positive size.
    #[error("kernel side must be greater than 0, got {0}")]
    InvalidSide(usize),

    /// A gaussian kernel was requested with a non-positive sigma.
    #[error("sigma must be greater than 0, got {0}")]
    InvalidSigma(f64),
}

/// Simple 3 by 3 box blur weights.
pub const BOX_3X3_BLUR: [[f64; 3]; 3] = [[1.0 / 9.0; 3]; 3];

/// Simple 5 by 5 box blur weights.
pub const BOX_5X5_BLUR: [[f64; 5]; 5] = [[1.0 / 25.0; 5]; 5];

/// Outline (laplacian-like) weights.
pub const OUTLINE: [[f64; 3]; 3] = [[-1.0, -1.0, -1.0], [-1.0, 8.0, -1.0], [-1.0, -1.0, -1.0]];

/// Horizontal gradient weights of the sobel operator.
pub const SOBEL_X: [[f64; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];

/// Vertical gradient weights of the sobel operator.
pub const SOBEL_Y: [[f64; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// The 1x1 identity weights.
pub const IDENTITY: [[f64; 1]; 1] = [[1.0]];

/// An immutable 2D convolution kernel with odd dimensions.
///
/// Weights are stored row-major, `rows x cols`.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel2d {
    rows: usize,
    cols: usize,
    weights: Vec<f64>,
}

impl Kernel2d {
    /// Create a kernel from row-major weights.
    ///
    /// # Arguments
    ///
    /// * `rows` - The number of rows, must be odd.
    /// * `cols` - The number of columns, must be odd.
    /// * `weights` - The `rows * cols` weights in row-major order.
    ///
    /// # Examples
    ///
    /// ```
    /// use filtra_imgproc::filter::kernels::Kernel2d;
    ///
    /// let kernel = Kernel2d::new(1, 3, vec![0.25, 0.5, 0.25]).unwrap();
    /// assert_eq!(kernel.center(), (1, 0));
    ///
    /// assert!(Kernel2d::new(2, 2, vec![0.25; 4]).is_err());
    /// ```
    pub fn new(rows: usize, cols: usize, weights: Vec<f64>) -> Result<Self, KernelError> {
        if rows == 0 || cols == 0 {
            return Err(KernelError::Empty);
        }
        if rows % 2 == 0 || cols % 2 == 0 {
            return Err(KernelError::EvenSize(rows, cols));
        }
        if weights.len() != rows * cols {
            return Err(KernelError::InvalidDataLength(weights.len(), rows * cols));
        }
        Ok(Self {
            rows,
            cols,
            weights,
        })
    }

    /// Create a kernel from a list of rows.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, KernelError> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        if rows.iter().any(|r| r.as_ref().len() != cols) {
            return Err(KernelError::RaggedRows);
        }
        let weights = rows.iter().flat_map(|r| r.as_ref().iter().copied()).collect();
        Self::new(rows.len(), cols, weights)
    }

    /// The number of rows of the kernel.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The number of columns of the kernel.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The offsets of the center cell, `(cols / 2, rows / 2)`.
    pub fn center(&self) -> (usize, usize) {
        (self.cols / 2, self.rows / 2)
    }

    /// The weight at column `kx` and row `ky`.
    ///
    /// PRECONDITION: `kx < cols` and `ky < rows`.
    #[inline]
    pub fn weight(&self, kx: usize, ky: usize) -> f64 {
        self.weights[ky * self.cols + kx]
    }

    /// The row-major weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl<const R: usize, const C: usize> TryFrom<[[f64; C]; R]> for Kernel2d {
    type Error = KernelError;

    fn try_from(rows: [[f64; C]; R]) -> Result<Self, Self::Error> {
        Self::from_rows(&rows)
    }
}

/// Create a square box blur kernel.
///
/// An even side is rounded down to the nearest odd number.
///
/// # Arguments
///
/// * `side` - The side of the kernel.
///
/// # Returns
///
/// A `side x side` kernel where every weight is `1 / side²`.
pub fn box_blur_kernel(side: usize) -> Result<Kernel2d, KernelError> {
    if side < 1 {
        return Err(KernelError::InvalidSide(side));
    }
    let side = if side % 2 == 0 { side - 1 } else { side };
    let weight = 1.0 / (side * side) as f64;
    Kernel2d::new(side, side, vec![weight; side * side])
}

/// Create a gaussian kernel of `1D` weights normalized to sum to one.
fn gaussian_kernel_1d(kernel_size: usize, sigma: f64) -> Vec<f64> {
    let mean = (kernel_size - 1) as f64 / 2.0;
    let sigma_sq = sigma * sigma;

    let mut kernel = (0..kernel_size)
        .map(|i| {
            let x = i as f64 - mean;
            (-(x * x) / (2.0 * sigma_sq)).exp()
        })
        .collect::<Vec<_>>();

    // normalize the kernel
    let norm = kernel.iter().sum::<f64>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// Create a square gaussian blur kernel.
///
/// # Arguments
///
/// * `side` - The side of the kernel, must be odd.
/// * `sigma` - The standard deviation of the gaussian.
///
/// # Returns
///
/// A `side x side` kernel whose weights sum to one.
pub fn gaussian_kernel(side: usize, sigma: f64) -> Result<Kernel2d, KernelError> {
    if side < 1 {
        return Err(KernelError::InvalidSide(side));
    }
    if side % 2 == 0 {
        return Err(KernelError::EvenSize(side, side));
    }
    if sigma.is_nan() || sigma <= 0.0 {
        return Err(KernelError::InvalidSigma(sigma));
    }

    let kernel_1d = gaussian_kernel_1d(side, sigma);
    let weights = kernel_1d
        .iter()
        .flat_map(|ky| kernel_1d.iter().map(move |kx| ky * kx))
        .collect();

    Kernel2d::new(side, side, weights)
}
