//! Non-blocking, batched ingestion of captured request records.
//!
//! Producers call [`IngestPipeline::enqueue`], which never waits: when the
//! bounded queue is full the record is dropped and a warning is logged.
//! `workers` independent tasks share the queue, each keeping a private
//! batch that is written to the sink when it reaches `batch_size` or when
//! its `flush_interval` timer fires. Failed writes are logged and the batch
//! is discarded.
mod options;
mod worker;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::capture::{CapturedExchange, RecordHook};
use crate::error::PipelineError;
use crate::model::RequestRecord;
use crate::store::RecordSink;

pub use options::{
    DEFAULT_BATCH_SIZE, DEFAULT_BUFFER_SIZE, DEFAULT_FLUSH_INTERVAL, DEFAULT_WORKERS,
    PipelineOptions,
};
use worker::{Counters, Worker};

/// Point-in-time view of the pipeline counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStats {
    pub enqueued: u64,
    pub dropped_full: u64,
    pub dropped_closed: u64,
    pub flushes: u64,
    pub flushed_records: u64,
    pub failed_records: u64,
}

#[derive(Debug)]
pub struct IngestPipeline {
    tx: mpsc::Sender<RequestRecord>,
    capacity: usize,
    closed: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
    done_tx: watch::Sender<bool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    counters: Arc<Counters>,
}

impl IngestPipeline {
    /// Spawn the writer tasks. Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(sink: Arc<dyn RecordSink>, options: PipelineOptions) -> Self {
        let options = options.normalized();
        let (tx, rx) = mpsc::channel(options.buffer_size);
        let rx = Arc::new(Mutex::new(rx));
        let (shutdown_tx, _) = watch::channel(false);
        let (done_tx, _) = watch::channel(false);
        let counters = Arc::new(Counters::default());

        let handles = (0..options.workers)
            .map(|id| {
                let worker = Worker {
                    id,
                    rx: Arc::clone(&rx),
                    sink: Arc::clone(&sink),
                    batch_size: options.batch_size,
                    flush_interval: options.flush_interval,
                    shutdown_rx: shutdown_tx.subscribe(),
                    counters: Arc::clone(&counters),
                };
                tokio::spawn(worker.run())
            })
            .collect();

        info!(
            "Ingest pipeline started: buffer={} batch={} interval={:?} workers={}",
            options.buffer_size, options.batch_size, options.flush_interval, options.workers
        );

        Self {
            tx,
            capacity: options.buffer_size,
            closed: AtomicBool::new(false),
            shutdown_tx,
            done_tx,
            workers: Mutex::new(handles),
            counters,
        }
    }

    /// Queue a record without waiting. Drops it when the queue is full or
    /// the pipeline is closed.
    pub fn enqueue(&self, record: RequestRecord) {
        if let Err(err) = self.try_enqueue(record) {
            if matches!(err, PipelineError::QueueFull) {
                warn!("Ingest buffer full, dropping request record");
            } else {
                debug!("{}", err);
            }
        }
    }

    /// Same as [`IngestPipeline::enqueue`] but reports why a record was dropped.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::QueueFull`] at capacity and
    /// [`PipelineError::Closed`] after shutdown started. The record is
    /// dropped in both cases.
    pub fn try_enqueue(&self, record: RequestRecord) -> Result<(), PipelineError> {
        if self.closed.load(Ordering::Acquire) {
            Counters::bump(&self.counters.dropped_closed, 1);
            return Err(PipelineError::Closed);
        }
        match self.tx.try_send(record) {
            Ok(()) => {
                Counters::bump(&self.counters.enqueued, 1);
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                Counters::bump(&self.counters.dropped_full, 1);
                Err(PipelineError::QueueFull)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Counters::bump(&self.counters.dropped_closed, 1);
                Err(PipelineError::Closed)
            }
        }
    }

    /// Close the queue, let every worker drain and flush, then return.
    ///
    /// Only the first call drains; later calls wait for it to finish.
    pub async fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            self.done().await;
            return;
        }

        info!("Ingest pipeline shutting down");
        self.shutdown_tx.send_replace(true);
        let handles = std::mem::take(&mut *self.workers.lock().await);
        for handle in handles {
            if let Err(err) = handle.await {
                error!("Ingest worker failed: {}", err);
            }
        }
        self.done_tx.send_replace(true);

        let stats = self.stats();
        info!(
            "Ingest pipeline stopped: flushed={} failed={} dropped_full={}",
            stats.flushed_records, stats.failed_records, stats.dropped_full
        );
    }

    /// Resolves once a shutdown has completed.
    pub async fn done(&self) {
        let mut done_rx = self.done_tx.subscribe();
        drop(done_rx.wait_for(|done| *done).await);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Records currently waiting in the queue.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.capacity.saturating_sub(self.tx.capacity())
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        let load = |counter: &std::sync::atomic::AtomicU64| counter.load(Ordering::Relaxed);
        PipelineStats {
            enqueued: load(&self.counters.enqueued),
            dropped_full: load(&self.counters.dropped_full),
            dropped_closed: load(&self.counters.dropped_closed),
            flushes: load(&self.counters.flushes),
            flushed_records: load(&self.counters.flushed_records),
            failed_records: load(&self.counters.failed_records),
        }
    }
}

impl RecordHook for IngestPipeline {
    fn on_record(&self, captured: CapturedExchange) {
        match captured.into_record(Utc::now()) {
            Ok(record) => self.enqueue(record),
            Err(err) => warn!("Dropping captured exchange: {}", err),
        }
    }
}
