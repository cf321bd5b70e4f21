//! Wires a store to the ingest pipeline and exposes the monitoring
//! operations: job logging, listing, lookup, analytics and cleanup.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analytics::{self, AnalyzeReport};
use crate::capture::{CaptureConfig, CapturedExchange, RecordHook, path_of_url};
use crate::config::MonitorConfig;
use crate::error::{AppResult, StoreError};
use crate::filter::{BaseFilter, JobFilter, RequestFilter, resolve_range};
use crate::model::{JobRecord, JsonBlob, RecordKind, RequestRecord};
use crate::pipeline::IngestPipeline;
use crate::store::{RecordSink, RecordStore, TimeRange};

/// One page of a listing plus the number of matches across all pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListResponse<T> {
    pub total: u64,
    pub data: Vec<T>,
}

/// Rows removed by [`Monitor::clear_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClearSummary {
    pub requests: u64,
    pub jobs: u64,
}

#[derive(Debug)]
pub struct Monitor<S> {
    store: Arc<S>,
    pipeline: IngestPipeline,
    config: MonitorConfig,
}

impl<S> Monitor<S>
where
    S: RecordSink + RecordStore + 'static,
{
    /// Start the ingest pipeline over `store`. Must be called from within
    /// a tokio runtime.
    #[must_use]
    pub fn start(store: Arc<S>, config: MonitorConfig) -> Self {
        let sink: Arc<dyn RecordSink> = Arc::clone(&store) as Arc<dyn RecordSink>;
        let pipeline = IngestPipeline::start(sink, config.pipeline);
        if !config.request_save_enabled {
            info!("Request saving disabled; captured exchanges will be discarded");
        }
        Self {
            store,
            pipeline,
            config,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Capture entry point for a framework adapter.
    ///
    /// Exchanges pass through `request_save_enabled` and the capture skip
    /// paths before they reach the pipeline.
    #[must_use]
    pub const fn hook(&self) -> &dyn RecordHook {
        self
    }

    /// The underlying pipeline, for queue depth and counters.
    ///
    /// Feeding it directly bypasses the capture settings; use [`Self::hook`].
    #[must_use]
    pub const fn pipeline(&self) -> &IngestPipeline {
        &self.pipeline
    }

    #[must_use]
    pub const fn capture_config(&self) -> &CaptureConfig {
        &self.config.capture
    }

    #[must_use]
    pub const fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Record a job execution with arbitrary serializable metadata.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ValidationError::InvalidMetadata`] when
    /// `metadata` cannot be serialized, without touching the store, or a
    /// store error when the insert fails.
    pub async fn log_job<T>(
        &self,
        name: &str,
        success: bool,
        metadata: &T,
    ) -> AppResult<JobRecord>
    where
        T: Serialize + ?Sized,
    {
        let metadata = JsonBlob::from_serialize(metadata)?;
        self.insert_job(name, success, metadata).await
    }

    /// Record a job whose metadata is already JSON text.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed JSON, or a store error when
    /// the insert fails.
    pub async fn log_job_raw(
        &self,
        name: &str,
        success: bool,
        metadata: &str,
    ) -> AppResult<JobRecord> {
        let metadata = JsonBlob::parse("metadata", metadata)?;
        self.insert_job(name, success, metadata).await
    }

    async fn insert_job(
        &self,
        name: &str,
        success: bool,
        metadata: JsonBlob,
    ) -> AppResult<JobRecord> {
        let job = JobRecord::new(name.to_owned(), success, metadata, Utc::now());
        self.store.insert_job(job.clone()).await?;
        debug!("Logged job '{}' (success={})", job.name, job.success);
        Ok(job)
    }

    /// Delete every request and job record.
    ///
    /// # Errors
    ///
    /// Returns the first store failure; requests are deleted before jobs.
    pub async fn clear_all(&self) -> AppResult<ClearSummary> {
        let requests = self.store.delete_all(RecordKind::Request).await?;
        let jobs = self.store.delete_all(RecordKind::Job).await?;
        info!("Cleared {} request(s) and {} job(s)", requests, jobs);
        Ok(ClearSummary { requests, jobs })
    }

    /// # Errors
    ///
    /// Returns any store failure.
    pub async fn list_requests(
        &self,
        filter: &RequestFilter,
    ) -> AppResult<ListResponse<RequestRecord>> {
        let query = filter.resolve_at(Utc::now());
        let total = self.store.count_requests(&query.predicate).await?;
        let data = self
            .store
            .query_requests(&query.predicate, query.sort, Some(query.page))
            .await?;
        Ok(ListResponse { total, data })
    }

    /// # Errors
    ///
    /// Returns any store failure.
    pub async fn list_jobs(&self, filter: &JobFilter) -> AppResult<ListResponse<JobRecord>> {
        let query = filter.resolve_at(Utc::now());
        let total = self.store.count_jobs(&query.predicate).await?;
        let data = self
            .store
            .query_jobs(&query.predicate, query.sort, Some(query.page))
            .await?;
        Ok(ListResponse { total, data })
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown or malformed id.
    pub async fn find_request(&self, id: &str) -> AppResult<RequestRecord> {
        let uuid = parse_record_id(RecordKind::Request, id)?;
        self.store
            .find_request(uuid)
            .await?
            .ok_or_else(|| not_found(RecordKind::Request, id).into())
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown or malformed id.
    pub async fn find_job(&self, id: &str) -> AppResult<JobRecord> {
        let uuid = parse_record_id(RecordKind::Job, id)?;
        self.store
            .find_job(uuid)
            .await?
            .ok_or_else(|| not_found(RecordKind::Job, id).into())
    }

    /// Analytics over `[from, to]`.
    ///
    /// # Errors
    ///
    /// Returns any store failure.
    pub async fn analyze(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<AnalyzeReport> {
        Ok(analytics::analyze(self.store.as_ref(), TimeRange::new(from, to)).await?)
    }

    /// Analytics over the date range of a query-shaped filter.
    ///
    /// # Errors
    ///
    /// Returns any store failure.
    pub async fn analyze_filter(&self, filter: &BaseFilter) -> AppResult<AnalyzeReport> {
        let range = resolve_range(filter, Utc::now());
        Ok(analytics::analyze(self.store.as_ref(), range).await?)
    }

    /// Drain and stop the ingest pipeline.
    pub async fn shutdown(&self) {
        self.pipeline.shutdown().await;
    }
}

impl<S> RecordHook for Monitor<S>
where
    S: RecordSink + RecordStore + 'static,
{
    /// Forward to the pipeline unless saving is off or the path is skipped.
    fn on_record(&self, captured: CapturedExchange) {
        if !self.config.request_save_enabled {
            return;
        }
        let path = if captured.path.is_empty() {
            path_of_url(&captured.url)
        } else {
            captured.path.as_str()
        };
        if self.config.capture.should_skip(path) {
            debug!("Skipping capture for {}", path);
            return;
        }
        self.pipeline.on_record(captured);
    }
}

fn parse_record_id(kind: RecordKind, id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id.trim()).map_err(|_| not_found(kind, id))
}

fn not_found(kind: RecordKind, id: &str) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.to_owned(),
    }
}
