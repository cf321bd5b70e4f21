use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::capture::{CapturedExchange, RecordHook};
use crate::error::AppResult;
use crate::monitor::Monitor;
use crate::pipeline::{IngestPipeline, PipelineStats};
use crate::store::{RecordSink, RecordStore};

/// Pause between checks while the ingest queue is full.
const BACKOFF: Duration = Duration::from_millis(2);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    /// Non-empty input lines.
    pub lines: u64,
    /// Lines that decoded into a captured exchange.
    pub parsed: u64,
    /// Lines that were not valid exchange JSON.
    pub invalid: u64,
    pub pipeline: PipelineStats,
}

/// Read a JSON-lines file, or stdin for `-`.
pub(super) async fn ingest_path<S>(monitor: &Monitor<S>, path: &Path) -> AppResult<IngestSummary>
where
    S: RecordSink + RecordStore + 'static,
{
    if path == Path::new("-") {
        return ingest_lines(monitor, BufReader::new(tokio::io::stdin())).await;
    }
    let file = tokio::fs::File::open(path).await?;
    ingest_lines(monitor, BufReader::new(file)).await
}

/// Feed every line through the monitor's capture hook, then drain the
/// pipeline so the summary reflects what was persisted.
///
/// Unlike a live capture probe, a bulk import waits for queue space
/// instead of dropping records.
///
/// # Errors
///
/// Returns an error when reading the input fails.
pub async fn ingest_lines<S, R>(monitor: &Monitor<S>, reader: R) -> AppResult<IngestSummary>
where
    S: RecordSink + RecordStore + 'static,
    R: AsyncBufRead + Unpin,
{
    let mut summary = IngestSummary::default();
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        summary.lines = summary.lines.saturating_add(1);
        match serde_json::from_str::<CapturedExchange>(line) {
            Ok(captured) => {
                summary.parsed = summary.parsed.saturating_add(1);
                wait_for_room(monitor.pipeline()).await;
                monitor.on_record(captured);
            }
            Err(err) => {
                summary.invalid = summary.invalid.saturating_add(1);
                warn!("Skipping line {}: {}", summary.lines, err);
            }
        }
    }

    monitor.shutdown().await;
    summary.pipeline = monitor.pipeline().stats();
    info!(
        "Ingested {} line(s): {} flushed, {} invalid",
        summary.lines, summary.pipeline.flushed_records, summary.invalid
    );
    Ok(summary)
}

async fn wait_for_room(pipeline: &IngestPipeline) {
    while !pipeline.is_closed() && pipeline.queued() >= pipeline.capacity() {
        tokio::time::sleep(BACKOFF).await;
    }
}
