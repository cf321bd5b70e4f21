use std::time::Duration;

pub const DEFAULT_BUFFER_SIZE: usize = 10_000;
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_WORKERS: usize = 1;

/// Sizing of the ingest queue and its writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Queue capacity; records beyond it are dropped.
    pub buffer_size: usize,
    /// Records per bulk insert.
    pub batch_size: usize,
    /// Longest a non-empty batch waits before it is flushed.
    pub flush_interval: Duration,
    /// Independent writer tasks sharing the queue.
    pub workers: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl PipelineOptions {
    /// Replace zero values with the defaults.
    #[must_use]
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        Self {
            buffer_size: non_zero_or(self.buffer_size, defaults.buffer_size),
            batch_size: non_zero_or(self.batch_size, defaults.batch_size),
            flush_interval: if self.flush_interval.is_zero() {
                defaults.flush_interval
            } else {
                self.flush_interval
            },
            workers: non_zero_or(self.workers, defaults.workers),
        }
    }
}

const fn non_zero_or(value: usize, fallback: usize) -> usize {
    if value == 0 { fallback } else { value }
}
