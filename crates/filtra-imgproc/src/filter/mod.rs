//! Filter operations
//!
//! This module provides the kernel convolution engine and the filters built on it.

/// Filter kernels
pub mod kernels;
pub use kernels::{Kernel2d, KernelError};

/// Border sampling policies
mod border;
pub use border::BorderMode;

/// Aggregation of several kernel responses
mod mean;
pub use mean::MeanFormula;

/// Kernel convolution engine
mod convolution;
pub use convolution::apply_kernels;

/// Filter operations
mod ops;
pub use ops::*;
