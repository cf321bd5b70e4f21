//! Persistence boundary: the write-side sink and the read-side store.
mod memory;
mod query;
mod sqlite;


use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::model::{JobRecord, RecordKind, RequestRecord};

pub use memory::MemoryStore;
pub use query::{JobPredicate, Page, RequestPredicate, Sort, SortDirection, SortKey, TimeRange};
pub use sqlite::SqliteStore;

/// Append-only bulk-insert target fed by the ingest pipeline.
///
/// A batch either persists as a whole or fails as a whole.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn bulk_insert(&self, records: Vec<RequestRecord>) -> StoreResult<()>;
}

/// Range/equality queries over persisted records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn count_requests(&self, predicate: &RequestPredicate) -> StoreResult<u64>;

    /// Records matching `predicate` ordered by `sort`; `page = None` loads
    /// every match.
    async fn query_requests(
        &self,
        predicate: &RequestPredicate,
        sort: Sort,
        page: Option<Page>,
    ) -> StoreResult<Vec<RequestRecord>>;

    async fn find_request(&self, id: Uuid) -> StoreResult<Option<RequestRecord>>;

    async fn insert_job(&self, job: JobRecord) -> StoreResult<()>;

    async fn count_jobs(&self, predicate: &JobPredicate) -> StoreResult<u64>;

    async fn query_jobs(
        &self,
        predicate: &JobPredicate,
        sort: Sort,
        page: Option<Page>,
    ) -> StoreResult<Vec<JobRecord>>;

    async fn find_job(&self, id: Uuid) -> StoreResult<Option<JobRecord>>;

    /// Delete every row of `kind`, returning how many were removed.
    async fn delete_all(&self, kind: RecordKind) -> StoreResult<u64>;
}
