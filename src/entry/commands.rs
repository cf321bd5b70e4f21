use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use serde::Serialize;

use crate::args::Command;
use crate::config::MonitorConfig;
use crate::error::{AppError, AppResult, ValidationError};
use crate::filter::DEFAULT_WINDOW_HOURS;
use crate::model::JsonBlob;
use crate::monitor::Monitor;
use crate::store::{RecordSink, RecordStore};

use super::ingest::ingest_path;

/// Run one command against a freshly started monitor, then drain it.
pub(super) async fn execute<S>(
    store: Arc<S>,
    config: MonitorConfig,
    command: Command,
) -> AppResult<()>
where
    S: RecordSink + RecordStore + 'static,
{
    let monitor = Monitor::start(store, config);
    let outcome = dispatch(&monitor, command).await;
    monitor.shutdown().await;
    outcome
}

async fn dispatch<S>(monitor: &Monitor<S>, command: Command) -> AppResult<()>
where
    S: RecordSink + RecordStore + 'static,
{
    match command {
        Command::Ingest(args) => {
            let summary = ingest_path(monitor, &args.file).await?;
            print_json(&summary)
        }
        Command::Requests(args) => print_json(&monitor.list_requests(&args.to_filter()).await?),
        Command::Jobs(args) => print_json(&monitor.list_jobs(&args.to_filter()).await?),
        Command::Request(args) => print_json(&monitor.find_request(&args.id.to_string()).await?),
        Command::Job(args) => print_json(&monitor.find_job(&args.id.to_string()).await?),
        Command::Analyze(args) => {
            let now = Utc::now();
            let to = args.to.unwrap_or(now);
            let from = match args.from {
                Some(from) => from,
                None => to
                    .checked_sub_signed(TimeDelta::hours(DEFAULT_WINDOW_HOURS))
                    .ok_or_else(|| {
                        AppError::validation(ValidationError::InvalidTimestamp {
                            value: to.to_rfc3339(),
                        })
                    })?,
            };
            print_json(&monitor.analyze(from, to).await?)
        }
        Command::LogJob(args) => {
            let metadata = match args.metadata.as_deref() {
                Some(raw) => JsonBlob::parse("metadata", raw)?,
                None => JsonBlob::null(),
            };
            let job = monitor.log_job(&args.name, !args.failed, &metadata).await?;
            print_json(&job)
        }
        Command::Clear => print_json(&monitor.clear_all().await?),
    }
}

fn print_json<T>(value: &T) -> AppResult<()>
where
    T: Serialize + ?Sized,
{
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
