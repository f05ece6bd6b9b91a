#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// configuration shared by the filtering operations.
pub mod config;

/// error types for the filtering operations.
pub mod error;

/// image filtering module.
pub mod filter;

/// averaging of several images.
pub mod merge;

/// module containing parallization utilities.
pub mod parallel;

/// utility functions for resizing images.
pub mod resize;

pub use crate::config::FilterConfig;
pub use crate::error::{ErrorKind, FilterError};
pub use crate::parallel::ThreadCount;
