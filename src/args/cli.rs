use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

use crate::filter::{BaseFilter, JobFilter, RequestFilter};

use super::parsers::{parse_record_id, parse_timestamp};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Request capture and traffic analytics - batched non-blocking ingestion into SQLite with latency histograms, per-endpoint stats and time-series buckets."
)]
pub struct ApiwatchArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Path to config file (TOML or JSON)
    #[arg(long, global = true, env = "APIWATCH_CONFIG")]
    pub config: Option<String>,

    /// SQLite database file (records are kept in memory when unset)
    #[arg(long, global = true, env = "APIWATCH_DB")]
    pub db: Option<PathBuf>,

    /// Enable debug logging (overridden by APIWATCH_LOG / RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Push captured exchanges (one JSON object per line) through the pipeline
    Ingest(IngestArgs),
    /// List captured requests
    Requests(RequestsArgs),
    /// List logged jobs
    Jobs(JobsArgs),
    /// Show one request by id
    Request(LookupArgs),
    /// Show one job by id
    Job(LookupArgs),
    /// Latency histogram, endpoint stats and traffic over a date range
    Analyze(AnalyzeArgs),
    /// Record a job execution
    LogJob(LogJobArgs),
    /// Delete every request and job record
    Clear,
}

#[derive(Debug, Args, Clone)]
pub struct IngestArgs {
    /// JSON-lines file of captured exchanges ("-" reads stdin)
    pub file: PathBuf,
}

#[derive(Debug, Args, Clone, Default)]
pub struct ListArgs {
    /// Page number, starting at 1
    #[arg(long)]
    pub page: Option<String>,

    /// Rows per page (at most 50)
    #[arg(long = "per-page")]
    pub per_page: Option<String>,

    /// Sort column (createdAt, updatedAt, duration, url, path, method, name, success)
    #[arg(long = "sort-key")]
    pub sort_key: Option<String>,

    /// Range start, RFC 3339 (defaults to 24 hours ago)
    #[arg(long)]
    pub from: Option<String>,

    /// Range end, RFC 3339 (defaults to now)
    #[arg(long)]
    pub to: Option<String>,
}

impl ListArgs {
    #[must_use]
    pub fn to_filter(&self) -> BaseFilter {
        BaseFilter {
            page: self.page.clone(),
            per_page: self.per_page.clone(),
            sort_key: self.sort_key.clone(),
            sort_dir: None,
            from_date: self.from.clone(),
            to_date: self.to.clone(),
        }
    }
}

#[derive(Debug, Args, Clone, Default)]
pub struct RequestsArgs {
    #[command(flatten)]
    pub list: ListArgs,

    /// URL substring
    #[arg(long)]
    pub url: Option<String>,

    /// Comma-separated methods, e.g. GET,POST
    #[arg(long)]
    pub method: Option<String>,

    /// Only successful (true) or failed (false) requests
    #[arg(long)]
    pub success: Option<bool>,

    /// Only responses with status 500 (overrides --status-code)
    #[arg(long)]
    pub exception: bool,

    /// Minimum duration in ms (inclusive)
    #[arg(long = "duration-gt")]
    pub duration_gt: Option<u64>,

    /// Maximum duration in ms (inclusive)
    #[arg(long = "duration-lt")]
    pub duration_lt: Option<u64>,

    /// Exact response status code
    #[arg(long = "status-code")]
    pub status_code: Option<u16>,
}

impl RequestsArgs {
    #[must_use]
    pub fn to_filter(&self) -> RequestFilter {
        RequestFilter {
            base: self.list.to_filter(),
            url: self.url.clone(),
            method: self.method.clone(),
            success: self.success,
            exception: self.exception.then_some(true),
            duration_gt: self.duration_gt,
            duration_lt: self.duration_lt,
            status_code: self.status_code,
        }
    }
}

#[derive(Debug, Args, Clone, Default)]
pub struct JobsArgs {
    #[command(flatten)]
    pub list: ListArgs,

    /// Job name substring
    #[arg(long)]
    pub name: Option<String>,

    /// Only successful (true) or failed (false) jobs
    #[arg(long)]
    pub success: Option<bool>,
}

impl JobsArgs {
    #[must_use]
    pub fn to_filter(&self) -> JobFilter {
        JobFilter {
            base: self.list.to_filter(),
            name: self.name.clone(),
            success: self.success,
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct LookupArgs {
    /// Record id (UUID)
    #[arg(value_parser = parse_record_id)]
    pub id: Uuid,
}

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// Range start, RFC 3339 (defaults to 24 hours ago)
    #[arg(long, value_parser = parse_timestamp)]
    pub from: Option<DateTime<Utc>>,

    /// Range end, RFC 3339 (defaults to now)
    #[arg(long, value_parser = parse_timestamp)]
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Args, Clone)]
pub struct LogJobArgs {
    /// Job name
    pub name: String,

    /// Mark the execution as failed
    #[arg(long)]
    pub failed: bool,

    /// Metadata as JSON text
    #[arg(long)]
    pub metadata: Option<String>,
}
