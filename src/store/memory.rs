use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::model::{JobRecord, RecordKind, RequestRecord};

use super::{JobPredicate, Page, RecordSink, RecordStore, RequestPredicate, Sort};

#[derive(Debug, Default)]
struct MemoryState {
    requests: Vec<RequestRecord>,
    jobs: Vec<JobRecord>,
}

/// Process-local store backed by vectors.
///
/// Evaluates predicates with the same semantics as the SQLite store; used
/// when no database is configured and throughout the tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> StoreResult<MutexGuard<'_, MemoryState>> {
        self.state.lock().map_err(|err| StoreError::Poisoned {
            detail: err.to_string(),
        })
    }

    /// Number of stored request records.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned.
    pub fn request_len(&self) -> StoreResult<usize> {
        Ok(self.state()?.requests.len())
    }
}

fn paginate<T>(mut rows: Vec<T>, page: Option<Page>) -> Vec<T> {
    let Some(page) = page else {
        return rows;
    };
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.per_page).unwrap_or(usize::MAX);
    if offset >= rows.len() {
        return Vec::new();
    }
    let mut window = rows.split_off(offset);
    window.truncate(limit);
    window
}

fn count_u64(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

#[async_trait]
impl RecordSink for MemoryStore {
    async fn bulk_insert(&self, records: Vec<RequestRecord>) -> StoreResult<()> {
        self.state()?.requests.extend(records);
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn count_requests(&self, predicate: &RequestPredicate) -> StoreResult<u64> {
        let state = self.state()?;
        Ok(count_u64(
            state
                .requests
                .iter()
                .filter(|record| predicate.matches(record))
                .count(),
        ))
    }

    async fn query_requests(
        &self,
        predicate: &RequestPredicate,
        sort: Sort,
        page: Option<Page>,
    ) -> StoreResult<Vec<RequestRecord>> {
        let mut rows: Vec<RequestRecord> = self
            .state()?
            .requests
            .iter()
            .filter(|record| predicate.matches(record))
            .cloned()
            .collect();
        rows.sort_by(|left, right| sort.compare_requests(left, right));
        Ok(paginate(rows, page))
    }

    async fn find_request(&self, id: Uuid) -> StoreResult<Option<RequestRecord>> {
        Ok(self
            .state()?
            .requests
            .iter()
            .find(|record| record.id == id)
            .cloned())
    }

    async fn insert_job(&self, job: JobRecord) -> StoreResult<()> {
        self.state()?.jobs.push(job);
        Ok(())
    }

    async fn count_jobs(&self, predicate: &JobPredicate) -> StoreResult<u64> {
        let state = self.state()?;
        Ok(count_u64(
            state.jobs.iter().filter(|job| predicate.matches(job)).count(),
        ))
    }

    async fn query_jobs(
        &self,
        predicate: &JobPredicate,
        sort: Sort,
        page: Option<Page>,
    ) -> StoreResult<Vec<JobRecord>> {
        let mut rows: Vec<JobRecord> = self
            .state()?
            .jobs
            .iter()
            .filter(|job| predicate.matches(job))
            .cloned()
            .collect();
        rows.sort_by(|left, right| sort.compare_jobs(left, right));
        Ok(paginate(rows, page))
    }

    async fn find_job(&self, id: Uuid) -> StoreResult<Option<JobRecord>> {
        Ok(self.state()?.jobs.iter().find(|job| job.id == id).cloned())
    }

    async fn delete_all(&self, kind: RecordKind) -> StoreResult<u64> {
        let mut state = self.state()?;
        let removed = match kind {
            RecordKind::Request => std::mem::take(&mut state.requests).len(),
            RecordKind::Job => std::mem::take(&mut state.jobs).len(),
        };
        Ok(count_u64(removed))
    }
}
