use filtra_image::ImageError;
use thiserror::Error;

use crate::filter::KernelError;
use crate::parallel::ParallelError;

/// Broad classification of a [`FilterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A caller supplied value violates the contract of the operation.
    InvalidArgument,
    /// A worker thread failed to complete.
    ConcurrencyFault,
    /// An input image could not be brought to the required shape.
    ResourceFault,
}

/// An error type for the filtering and merging operations.
#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    /// Error raised by the image accessors.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error raised while building or validating kernels.
    #[error(transparent)]
    Kernel(#[from] KernelError),

    /// Error raised by the parallel executor.
    #[error(transparent)]
    Parallel(#[from] ParallelError),

    /// No kernels were given to apply.
    #[error("at least one kernel is required")]
    NoKernels,

    /// The aggregation formula tag is not known.
    #[error("unknown mean formula: {0}")]
    UnknownMeanFormula(String),

    /// The image is too small for the requested operation.
    #[error("image of size {0}x{1} is smaller than the required {2}x{3}")]
    ImageTooSmall(usize, usize, usize, usize),

    /// An image could not be resized to the target size.
    #[error("failed to resize image: {0}")]
    Resize(ImageError),
}

impl FilterError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FilterError::Parallel(ParallelError::InvalidThreadCount(_)) => {
                ErrorKind::InvalidArgument
            }
            FilterError::Parallel(_) => ErrorKind::ConcurrencyFault,
            FilterError::Resize(_) => ErrorKind::ResourceFault,
            FilterError::Image(_)
            | FilterError::Kernel(_)
            | FilterError::NoKernels
            | FilterError::UnknownMeanFormula(_)
            | FilterError::ImageTooSmall(..) => ErrorKind::InvalidArgument,
        }
    }
}
