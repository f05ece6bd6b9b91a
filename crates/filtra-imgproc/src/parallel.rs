use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// A dedicated worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    SpawnError(String),

    /// A worker panicked before completing its cells.
    #[error("worker thread panicked: {0}")]
    WorkerPanicked(String),
}

/// Number of worker threads used by a parallel operation.
///
/// The count is validated on construction and can never be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadCount(usize);

impl ThreadCount {
    /// The thread count used when none is configured.
    pub const DEFAULT: ThreadCount = ThreadCount(2);

    /// Create a new thread count.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::InvalidThreadCount`] when `n` is zero.
    pub fn new(n: usize) -> Result<Self, ParallelError> {
        if n == 0 {
            return Err(ParallelError::InvalidThreadCount(n));
        }
        Ok(Self(n))
    }

    /// Get the number of threads.
    pub fn get(self) -> usize {
        self.0
    }

    /// The number of workers each color channel gets when the three channels run concurrently.
    pub fn per_channel(self) -> ThreadCount {
        ThreadCount(self.0 / 3 + 1)
    }
}

impl Default for ThreadCount {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for ThreadCount {
    type Error = ParallelError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl std::fmt::Display for ThreadCount {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compute the column range assigned to each of `workers` workers.
///
/// Worker `t` owns the columns `[width * t / workers, width * (t + 1) / workers)`.
/// The ranges are contiguous, disjoint and cover `[0, width)`. When there are more
/// workers than columns some of the ranges are empty.
///
/// # Examples
///
/// ```
/// use filtra_imgproc::parallel::column_spans;
///
/// assert_eq!(column_spans(10, 3), vec![0..3, 3..6, 6..10]);
/// assert_eq!(column_spans(2, 3), vec![0..0, 0..1, 1..2]);
/// ```
pub fn column_spans(width: usize, workers: usize) -> Vec<Range<usize>> {
    (0..workers)
        .map(|t| (width * t / workers)..(width * (t + 1) / workers))
        .collect()
}

/// The values produced by a [`WorkPartitioner`] run, one per grid cell.
///
/// Values are stored per worker span, column by column.
#[derive(Debug, Clone, PartialEq)]
pub struct CellGrid<T> {
    width: usize,
    height: usize,
    spans: Vec<(Range<usize>, Vec<T>)>,
}

impl<T> CellGrid<T> {
    /// The grid width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The grid height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The total number of cells in the grid.
    pub fn len(&self) -> usize {
        self.spans.iter().map(|(_, values)| values.len()).sum()
    }

    /// Whether the grid holds no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The column ranges of the workers that produced the grid.
    pub fn spans(&self) -> impl Iterator<Item = &Range<usize>> {
        self.spans.iter().map(|(span, _)| span)
    }

    /// Get the value computed for the cell `(x, y)`.
    ///
    /// The owning span is found with a binary search over the span ends.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        // spans are contiguous and sorted, empty spans are skipped
        let index = self.spans.partition_point(|(span, _)| span.end <= x);
        let (span, values) = self.spans.get(index)?;
        values.get((x - span.start) * self.height + y)
    }

    /// Iterate over all the cells as `(x, y, value)`.
    pub fn into_cells(self) -> impl Iterator<Item = (usize, usize, T)> {
        let height = self.height;
        self.spans.into_iter().flat_map(move |(span, values)| {
            let start = span.start;
            values
                .into_iter()
                .enumerate()
                .map(move |(i, v)| (start + i / height, i % height, v))
        })
    }
}

/// Runs a per-cell operation over a `width x height` grid split into column spans.
///
/// Every call builds a fresh pool of exactly `workers` threads; worker `t` evaluates
/// the cells of the span `t` returned by [`column_spans`] and keeps the results in a
/// worker-local buffer. The call returns only after every worker finished.
///
/// # Examples
///
/// ```
/// use filtra_imgproc::parallel::{ParallelError, ThreadCount, WorkPartitioner};
///
/// let partitioner = WorkPartitioner::new(ThreadCount::new(2).unwrap());
/// let grid = partitioner
///     .run(4, 3, |x, y| Ok::<_, ParallelError>(x * 10 + y))
///     .unwrap();
///
/// assert_eq!(grid.len(), 12);
/// assert_eq!(grid.get(3, 2), Some(&32));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct WorkPartitioner {
    workers: ThreadCount,
}

impl WorkPartitioner {
    /// Create a partitioner with the given number of workers.
    pub fn new(workers: ThreadCount) -> Self {
        Self { workers }
    }

    /// The number of workers the grid is split into.
    pub fn workers(&self) -> usize {
        self.workers.get()
    }

    /// Evaluate `f(x, y)` for every cell of the grid.
    ///
    /// # Arguments
    ///
    /// * `width` - The number of columns of the grid.
    /// * `height` - The number of rows of the grid.
    /// * `f` - The per-cell operation.
    ///
    /// # Returns
    ///
    /// The grid with the value of every cell.
    ///
    /// # Errors
    ///
    /// The first error returned by `f` fails the whole run. A panicking worker is
    /// reported as [`ParallelError::WorkerPanicked`]. No partial grid is returned.
    pub fn run<T, E, F>(&self, width: usize, height: usize, f: F) -> Result<CellGrid<T>, E>
    where
        T: Send,
        E: From<ParallelError> + Send,
        F: Fn(usize, usize) -> Result<T, E> + Sync,
    {
        if width == 0 || height == 0 {
            return Ok(CellGrid {
                width,
                height,
                spans: Vec::new(),
            });
        }

        let workers = self.workers.get();
        let spans = column_spans(width, workers);

        log::debug!("partitioning {width}x{height} grid over {workers} workers");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| ParallelError::BuildError(e.to_string()))?;

        let run_span = |span: Range<usize>| -> Result<(Range<usize>, Vec<T>), E> {
            log::trace!("worker visiting columns {span:?}");
            let mut values = Vec::with_capacity(span.len() * height);
            for x in span.clone() {
                for y in 0..height {
                    values.push(f(x, y)?);
                }
            }
            Ok((span, values))
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pool.install(|| {
                spans
                    .into_par_iter()
                    .with_max_len(1)
                    .map(run_span)
                    .collect::<Result<Vec<_>, E>>()
            })
        }));

        match result {
            Ok(spans) => Ok(CellGrid {
                width,
                height,
                spans: spans?,
            }),
            Err(payload) => {
                Err(ParallelError::WorkerPanicked(panic_message(payload.as_ref())).into())
            }
        }
    }
}

/// Extract a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
