use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error};

use crate::error::PipelineError;
use crate::model::RequestRecord;
use crate::store::RecordSink;

pub(super) type SharedReceiver = Arc<Mutex<mpsc::Receiver<RequestRecord>>>;

/// Counters shared by the producer side and every worker.
#[derive(Debug, Default)]
pub(super) struct Counters {
    pub(super) enqueued: AtomicU64,
    pub(super) dropped_full: AtomicU64,
    pub(super) dropped_closed: AtomicU64,
    pub(super) flushes: AtomicU64,
    pub(super) flushed_records: AtomicU64,
    pub(super) failed_records: AtomicU64,
}

impl Counters {
    pub(super) fn bump(counter: &AtomicU64, by: usize) {
        counter.fetch_add(u64::try_from(by).unwrap_or(u64::MAX), Ordering::Relaxed);
    }
}

pub(super) struct Worker {
    pub(super) id: usize,
    pub(super) rx: SharedReceiver,
    pub(super) sink: Arc<dyn RecordSink>,
    pub(super) batch_size: usize,
    pub(super) flush_interval: Duration,
    pub(super) shutdown_rx: watch::Receiver<bool>,
    pub(super) counters: Arc<Counters>,
}

impl Worker {
    /// Consume the shared queue until shutdown, then drain it and flush.
    pub(super) async fn run(mut self) {
        debug!("Ingest worker {} started", self.id);
        let mut batch = Vec::with_capacity(self.batch_size);
        let first_tick = Instant::now()
            .checked_add(self.flush_interval)
            .unwrap_or_else(Instant::now);
        let mut ticker = interval_at(first_tick, self.flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        break;
                    }
                }
                received = next_record(&self.rx) => {
                    let Some(record) = received else {
                        break;
                    };
                    batch.push(record);
                    if batch.len() >= self.batch_size {
                        self.flush(&mut batch).await;
                    }
                }
                _ = ticker.tick() => {
                    if !batch.is_empty() {
                        self.flush(&mut batch).await;
                    }
                }
            }
        }

        self.drain(&mut batch).await;
        if !batch.is_empty() {
            self.flush(&mut batch).await;
        }
        debug!("Ingest worker {} stopped", self.id);
    }

    /// Close the queue for new sends and take whatever is still buffered.
    async fn drain(&self, batch: &mut Vec<RequestRecord>) {
        let mut rx = self.rx.lock().await;
        rx.close();
        while let Some(record) = rx.recv().await {
            batch.push(record);
            if batch.len() >= self.batch_size {
                self.flush(batch).await;
            }
        }
    }

    /// One bulk write; a failed batch is logged and discarded.
    async fn flush(&self, batch: &mut Vec<RequestRecord>) {
        let records = std::mem::replace(batch, Vec::with_capacity(self.batch_size));
        let count = records.len();
        match self.sink.bulk_insert(records).await {
            Ok(()) => {
                Counters::bump(&self.counters.flushes, 1);
                Counters::bump(&self.counters.flushed_records, count);
                debug!("Worker {} flushed {} record(s)", self.id, count);
            }
            Err(source) => {
                Counters::bump(&self.counters.failed_records, count);
                let err = PipelineError::FlushFailed {
                    records: count,
                    source,
                };
                error!("Worker {}: {}", self.id, err);
            }
        }
    }
}

async fn next_record(rx: &SharedReceiver) -> Option<RequestRecord> {
    rx.lock().await.recv().await
}
