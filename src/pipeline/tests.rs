use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};

use super::{IngestPipeline, PipelineOptions};
use crate::capture::{CapturedExchange, RecordHook};
use crate::error::{AppError, AppResult, PipelineError, StoreError, StoreResult};
use crate::model::RequestRecord;
use crate::model::test_support::request_record;
use crate::store::{MemoryStore, RecordSink};
use crate::test_support::{base_time, run_async_test};

const WAIT_LIMIT: Duration = Duration::from_secs(5);

/// Remembers the size of every batch it receives.
#[derive(Debug, Default)]
struct RecordingSink {
    batches: Mutex<Vec<usize>>,
}

impl RecordingSink {
    fn batches(&self) -> AppResult<Vec<usize>> {
        self.batches
            .lock()
            .map(|batches| batches.clone())
            .map_err(|err| AppError::pipeline(format!("batches lock poisoned: {}", err)))
    }

    fn total(&self) -> AppResult<usize> {
        Ok(self.batches()?.iter().sum())
    }
}

#[async_trait]
impl RecordSink for RecordingSink {
    async fn bulk_insert(&self, records: Vec<RequestRecord>) -> StoreResult<()> {
        self.batches
            .lock()
            .map_err(|err| StoreError::Poisoned {
                detail: err.to_string(),
            })?
            .push(records.len());
        Ok(())
    }
}

/// Holds every write until permits are released.
#[derive(Debug)]
struct GatedSink {
    entered: Notify,
    gate: Semaphore,
    inner: RecordingSink,
}

impl GatedSink {
    fn closed() -> Self {
        Self {
            entered: Notify::new(),
            gate: Semaphore::new(0),
            inner: RecordingSink::default(),
        }
    }
}

#[async_trait]
impl RecordSink for GatedSink {
    async fn bulk_insert(&self, records: Vec<RequestRecord>) -> StoreResult<()> {
        self.entered.notify_one();
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| StoreError::from("gate closed"))?;
        self.inner.bulk_insert(records).await
    }
}

#[derive(Debug)]
struct FailingSink;

#[async_trait]
impl RecordSink for FailingSink {
    async fn bulk_insert(&self, _records: Vec<RequestRecord>) -> StoreResult<()> {
        Err(StoreError::Rejected {
            reason: "database unavailable".to_owned(),
        })
    }
}

fn options(buffer_size: usize, batch_size: usize, flush_interval: Duration) -> PipelineOptions {
    PipelineOptions {
        buffer_size,
        batch_size,
        flush_interval,
        workers: 1,
    }
}

fn records(count: usize) -> AppResult<Vec<RequestRecord>> {
    let base = base_time()?;
    Ok((0..count)
        .map(|_| request_record("GET", "/api/users", 12, 200, base))
        .collect())
}

async fn wait_until<F>(label: &'static str, mut condition: F) -> AppResult<()>
where
    F: FnMut() -> AppResult<bool>,
{
    let deadline = tokio::time::Instant::now()
        .checked_add(WAIT_LIMIT)
        .ok_or_else(|| AppError::pipeline("deadline overflow"))?;
    while !condition()? {
        if tokio::time::Instant::now() >= deadline {
            return Err(AppError::pipeline(label));
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    Ok(())
}

#[test]
fn enqueue_drops_when_buffer_is_full() -> AppResult<()> {
    run_async_test(async {
        let sink = Arc::new(GatedSink::closed());
        let pipeline = IngestPipeline::start(
            Arc::clone(&sink) as Arc<dyn RecordSink>,
            options(2, 1, Duration::from_secs(3600)),
        );
        let mut pending = records(4)?.into_iter();
        let mut next = || {
            pending
                .next()
                .ok_or_else(|| AppError::pipeline("ran out of fixtures"))
        };

        pipeline.try_enqueue(next()?)?;
        tokio::time::timeout(WAIT_LIMIT, sink.entered.notified())
            .await
            .map_err(|_| AppError::pipeline("worker never reached the sink"))?;

        pipeline.try_enqueue(next()?)?;
        pipeline.try_enqueue(next()?)?;
        if pipeline.queued() != 2 {
            return Err(AppError::pipeline(format!(
                "Expected 2 queued records, got {}",
                pipeline.queued()
            )));
        }
        let overflow = pipeline.try_enqueue(next()?);
        if !matches!(overflow, Err(PipelineError::QueueFull)) {
            return Err(AppError::pipeline("Expected QueueFull on a full buffer"));
        }

        sink.gate.add_permits(Semaphore::MAX_PERMITS / 2);
        pipeline.shutdown().await;

        let stats = pipeline.stats();
        if stats.dropped_full != 1 || stats.enqueued != 3 || sink.inner.total()? != 3 {
            return Err(AppError::pipeline(format!("Unexpected stats: {:?}", stats)));
        }
        Ok(())
    })
}

#[test]
fn full_batches_flush_without_waiting_for_timer() -> AppResult<()> {
    run_async_test(async {
        let sink = Arc::new(RecordingSink::default());
        let pipeline = IngestPipeline::start(
            Arc::clone(&sink) as Arc<dyn RecordSink>,
            options(1000, 100, Duration::from_secs(3600)),
        );
        for record in records(250)? {
            pipeline.enqueue(record);
        }

        wait_until("two full batches", || Ok(sink.total()? >= 200)).await?;
        if sink.batches()? != vec![100, 100] {
            return Err(AppError::pipeline(format!(
                "Expected two full batches, got {:?}",
                sink.batches()?
            )));
        }

        pipeline.shutdown().await;
        if sink.batches()? != vec![100, 100, 50] {
            return Err(AppError::pipeline(format!(
                "Expected remainder flushed on shutdown, got {:?}",
                sink.batches()?
            )));
        }
        Ok(())
    })
}

const FLUSH_INTERVAL: Duration = Duration::from_millis(50);
const TIMER_SLACK: Duration = Duration::from_millis(150);

#[test]
fn partial_batch_flushes_on_interval() -> AppResult<()> {
    run_async_test(async {
        let sink = Arc::new(RecordingSink::default());
        let pipeline = IngestPipeline::start(
            Arc::clone(&sink) as Arc<dyn RecordSink>,
            options(100, 100, FLUSH_INTERVAL),
        );
        let started = tokio::time::Instant::now();
        for record in records(3)? {
            pipeline.enqueue(record);
        }

        wait_until("interval flush", || Ok(sink.total()? == 3)).await?;
        let elapsed = started.elapsed();
        if elapsed > FLUSH_INTERVAL.saturating_add(TIMER_SLACK) {
            return Err(AppError::pipeline(format!(
                "Flush took {:?}, interval is {:?}",
                elapsed, FLUSH_INTERVAL
            )));
        }
        if pipeline.is_closed() {
            return Err(AppError::pipeline("Pipeline should still be open"));
        }
        pipeline.shutdown().await;
        if sink.total()? != 3 {
            return Err(AppError::pipeline("Shutdown must not duplicate records"));
        }
        Ok(())
    })
}

#[test]
fn concurrent_shutdown_drains_once() -> AppResult<()> {
    run_async_test(async {
        let sink = Arc::new(RecordingSink::default());
        let pipeline = Arc::new(IngestPipeline::start(
            Arc::clone(&sink) as Arc<dyn RecordSink>,
            options(100, 50, Duration::from_secs(3600)),
        ));
        for record in records(7)? {
            pipeline.enqueue(record);
        }

        let first = Arc::clone(&pipeline);
        let second = Arc::clone(&pipeline);
        let (left, right) = tokio::join!(
            tokio::spawn(async move { first.shutdown().await }),
            tokio::spawn(async move { second.shutdown().await }),
        );
        left?;
        right?;
        pipeline.shutdown().await;
        pipeline.done().await;

        if sink.batches()? != vec![7] {
            return Err(AppError::pipeline(format!(
                "Expected a single drain flush, got {:?}",
                sink.batches()?
            )));
        }

        let late = records(1)?
            .pop()
            .ok_or_else(|| AppError::pipeline("missing fixture"))?;
        if !matches!(pipeline.try_enqueue(late), Err(PipelineError::Closed)) {
            return Err(AppError::pipeline("Expected Closed after shutdown"));
        }
        if pipeline.stats().dropped_closed != 1 {
            return Err(AppError::pipeline("Expected one record dropped as closed"));
        }
        Ok(())
    })
}

#[test]
fn failed_flush_discards_batch_and_keeps_running() -> AppResult<()> {
    run_async_test(async {
        let pipeline = IngestPipeline::start(
            Arc::new(FailingSink),
            options(100, 2, Duration::from_secs(3600)),
        );
        for record in records(5)? {
            pipeline.enqueue(record);
        }
        pipeline.shutdown().await;

        let stats = pipeline.stats();
        if stats.failed_records != 5 || stats.flushed_records != 0 || stats.flushes != 0 {
            return Err(AppError::pipeline(format!("Unexpected stats: {:?}", stats)));
        }
        Ok(())
    })
}

#[test]
fn workers_share_the_queue() -> AppResult<()> {
    run_async_test(async {
        let sink = Arc::new(RecordingSink::default());
        let pipeline = IngestPipeline::start(
            Arc::clone(&sink) as Arc<dyn RecordSink>,
            PipelineOptions {
                buffer_size: 2000,
                batch_size: 10,
                flush_interval: Duration::from_millis(20),
                workers: 4,
            },
        );
        for record in records(1000)? {
            pipeline.try_enqueue(record)?;
        }
        pipeline.shutdown().await;

        let batches = sink.batches()?;
        if batches.iter().sum::<usize>() != 1000 {
            return Err(AppError::pipeline(format!(
                "Expected 1000 records flushed, got {}",
                batches.iter().sum::<usize>()
            )));
        }
        if batches.iter().any(|size| *size > 10) {
            return Err(AppError::pipeline("Batch exceeded batch_size"));
        }
        Ok(())
    })
}

#[test]
fn hook_converts_and_persists_exchanges() -> AppResult<()> {
    run_async_test(async {
        let store = Arc::new(MemoryStore::new());
        let pipeline = IngestPipeline::start(
            Arc::clone(&store) as Arc<dyn RecordSink>,
            options(10, 10, Duration::from_secs(3600)),
        );
        let captured: CapturedExchange = serde_json::from_value(serde_json::json!({
            "url": "http://localhost/api/users/42?x=1",
            "method": "get",
            "request": { "ip": "10.0.0.1" },
            "response": { "statusCode": 200 },
            "responseHeaders": "{}",
            "success": true,
            "duration": 7
        }))?;
        let broken = CapturedExchange {
            response: "{not json".to_owned(),
            ..captured.clone()
        };
        pipeline.on_record(captured);
        pipeline.on_record(broken);
        pipeline.shutdown().await;

        if store.request_len()? != 1 {
            return Err(AppError::pipeline("Expected only the valid exchange stored"));
        }
        Ok(())
    })
}

#[test]
fn zero_options_fall_back_to_defaults() -> AppResult<()> {
    let normalized = PipelineOptions {
        buffer_size: 0,
        batch_size: 0,
        flush_interval: Duration::ZERO,
        workers: 0,
    }
    .normalized();
    if normalized != PipelineOptions::default() {
        return Err(AppError::pipeline(format!(
            "Unexpected normalized options: {:?}",
            normalized
        )));
    }
    Ok(())
}
