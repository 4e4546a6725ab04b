use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::shared::error::BlurError;

/// Fixed-size worker pool that splits an output buffer into contiguous
/// bands of rows, one band per worker.
///
/// Each band is written by exactly one worker and the call returns only
/// after every band is done, so callers see a plain blocking function.
pub struct RowParallelizer {
    pool: ThreadPool,
    workers: usize,
}

impl RowParallelizer {
    /// `workers = None` sizes the pool to the available hardware parallelism.
    pub fn new(workers: Option<usize>) -> Result<Self, BlurError> {
        let workers = workers.unwrap_or_else(num_cpus).max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("bokeh-row-{i}"))
            .build()?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Calls `f(y, row)` for every row of `out`, where rows are `row_len`
    /// elements long. Blocks until all rows are written.
    pub fn for_each_row<T, F>(&self, out: &mut [T], row_len: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        if row_len == 0 || out.is_empty() {
            return;
        }
        let rows = out.len() / row_len;
        let rows_per_band = rows.div_ceil(self.workers).max(1);

        self.pool.install(|| {
            out.par_chunks_mut(row_len * rows_per_band)
                .enumerate()
                .for_each(|(band, chunk)| {
                    let first_row = band * rows_per_band;
                    for (i, row) in chunk.chunks_mut(row_len).enumerate() {
                        f(first_row + i, row);
                    }
                });
        });
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
