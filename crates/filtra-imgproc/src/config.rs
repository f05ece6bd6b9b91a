use crate::filter::BorderMode;
use crate::parallel::ThreadCount;

/// Environment variable holding the default number of worker threads.
pub const NUM_THREADS_ENV: &str = "FILTRA_NUM_THREADS";

/// Options shared by the filtering and merging operations.
///
/// The values are read once when an operation starts.
///
/// # Examples
///
/// ```
/// use filtra_imgproc::config::FilterConfig;
/// use filtra_imgproc::filter::BorderMode;
/// use filtra_imgproc::parallel::ThreadCount;
///
/// let config = FilterConfig::default()
///     .with_num_threads(ThreadCount::new(4).unwrap())
///     .with_border(BorderMode::Replicate);
///
/// assert_eq!(config.num_threads.get(), 4);
/// assert_eq!(config.border, BorderMode::Replicate);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterConfig {
    /// Number of worker threads used per operation.
    pub num_threads: ThreadCount,
    /// Sampling policy for kernel taps outside the image.
    pub border: BorderMode,
}

impl FilterConfig {
    /// Set the number of worker threads.
    pub fn with_num_threads(mut self, num_threads: ThreadCount) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// Set the border sampling policy.
    pub fn with_border(mut self, border: BorderMode) -> Self {
        self.border = border;
        self
    }

    /// Build a configuration whose thread count is read from `FILTRA_NUM_THREADS`.
    ///
    /// A missing variable keeps the default; a malformed or zero value is ignored with a warning.
    pub fn from_env() -> Self {
        let num_threads = std::env::var(NUM_THREADS_ENV)
            .ok()
            .and_then(|value| parse_num_threads(&value))
            .unwrap_or_default();

        Self {
            num_threads,
            ..Default::default()
        }
    }
}

fn parse_num_threads(value: &str) -> Option<ThreadCount> {
    match value.trim().parse::<usize>() {
        Ok(n) => match ThreadCount::new(n) {
            Ok(threads) => Some(threads),
            Err(e) => {
                log::warn!("ignoring {NUM_THREADS_ENV}={value}: {e}");
                None
            }
        },
        Err(e) => {
            log::warn!("ignoring {NUM_THREADS_ENV}={value}: {e}");
            None
        }
    }
}
