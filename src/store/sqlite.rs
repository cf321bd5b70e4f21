mod sql;

use std::path::Path;

use async_trait::async_trait;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::model::{JobRecord, RecordKind, RequestRecord};

use super::{JobPredicate, Page, RecordSink, RecordStore, RequestPredicate, Sort};
use sql::{
    INSERT_JOB, INSERT_REQUEST, JOB_COLUMNS, JobRow, REQUEST_COLUMNS, RequestRow, SCHEMA,
    job_filter, job_values, order_and_page, request_filter, request_values,
};

/// SQLite-backed store; all statements run on `tokio-rusqlite`'s connection thread.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    conn: Connection,
}

fn sqlite_error(context: &'static str) -> impl FnOnce(tokio_rusqlite::Error) -> StoreError {
    move |err| StoreError::Sqlite {
        context,
        source: Box::new(err),
    }
}

impl SqliteStore {
    /// Open (or create) a database file and make sure the tables exist.
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be opened or initialized.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(sqlite_error("open sqlite db"))?;
        Self::init(conn).await
    }

    /// # Errors
    ///
    /// Returns an error when the database cannot be initialized.
    pub async fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(sqlite_error("open in-memory sqlite db"))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> StoreResult<Self> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(sqlite_error("initialize sqlite db"))?;
        Ok(Self { conn })
    }

    async fn count(&self, table: &'static str, filter: sql::Filter) -> StoreResult<u64> {
        let count = self
            .conn
            .call(move |conn| {
                let query = format!("SELECT COUNT(*) FROM {}{}", table, filter.sql);
                let count = conn.query_row(
                    &query,
                    rusqlite::params_from_iter(filter.params.iter()),
                    |row| row.get::<_, i64>(0),
                )?;
                Ok(count)
            })
            .await
            .map_err(sqlite_error("count sqlite rows"))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[async_trait]
impl RecordSink for SqliteStore {
    async fn bulk_insert(&self, records: Vec<RequestRecord>) -> StoreResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        let inserted = records.len();
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare_cached(INSERT_REQUEST)?;
                    for record in &records {
                        stmt.execute(rusqlite::params_from_iter(request_values(record)))?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(sqlite_error("write sqlite request batch"))?;
        debug!("Inserted {} request record(s) into sqlite", inserted);
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn count_requests(&self, predicate: &RequestPredicate) -> StoreResult<u64> {
        self.count(RecordKind::Request.table(), request_filter(predicate)).await
    }

    async fn query_requests(
        &self,
        predicate: &RequestPredicate,
        sort: Sort,
        page: Option<Page>,
    ) -> StoreResult<Vec<RequestRecord>> {
        let mut filter = request_filter(predicate);
        let tail = order_and_page(sort.key.request_column(), sort, page, &mut filter.params);
        let rows = self
            .conn
            .call(move |conn| {
                let query = format!(
                    "SELECT {} FROM {}{}{}",
                    REQUEST_COLUMNS,
                    RecordKind::Request.table(),
                    filter.sql,
                    tail
                );
                let mut stmt = conn.prepare(&query)?;
                let rows = stmt
                    .query_map(
                        rusqlite::params_from_iter(filter.params.iter()),
                        RequestRow::from_row,
                    )?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(sqlite_error("query sqlite request rows"))?;
        rows.into_iter().map(RequestRow::into_record).collect()
    }

    async fn find_request(&self, id: Uuid) -> StoreResult<Option<RequestRecord>> {
        let row = self
            .conn
            .call(move |conn| {
                let query = format!(
                    "SELECT {} FROM {} WHERE id = ?1",
                    REQUEST_COLUMNS,
                    RecordKind::Request.table()
                );
                let row = conn
                    .query_row(&query, [id.to_string()], RequestRow::from_row)
                    .optional()?;
                Ok(row)
            })
            .await
            .map_err(sqlite_error("find sqlite request row"))?;
        row.map(RequestRow::into_record).transpose()
    }

    async fn insert_job(&self, job: JobRecord) -> StoreResult<()> {
        self.conn
            .call(move |conn| {
                conn.execute(INSERT_JOB, rusqlite::params_from_iter(job_values(&job)))?;
                Ok(())
            })
            .await
            .map_err(sqlite_error("write sqlite job row"))
    }

    async fn count_jobs(&self, predicate: &JobPredicate) -> StoreResult<u64> {
        self.count(RecordKind::Job.table(), job_filter(predicate)).await
    }

    async fn query_jobs(
        &self,
        predicate: &JobPredicate,
        sort: Sort,
        page: Option<Page>,
    ) -> StoreResult<Vec<JobRecord>> {
        let mut filter = job_filter(predicate);
        let tail = order_and_page(sort.key.job_column(), sort, page, &mut filter.params);
        let rows = self
            .conn
            .call(move |conn| {
                let query = format!(
                    "SELECT {} FROM {}{}{}",
                    JOB_COLUMNS,
                    RecordKind::Job.table(),
                    filter.sql,
                    tail
                );
                let mut stmt = conn.prepare(&query)?;
                let rows = stmt
                    .query_map(
                        rusqlite::params_from_iter(filter.params.iter()),
                        JobRow::from_row,
                    )?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(sqlite_error("query sqlite job rows"))?;
        rows.into_iter().map(JobRow::into_record).collect()
    }

    async fn find_job(&self, id: Uuid) -> StoreResult<Option<JobRecord>> {
        let row = self
            .conn
            .call(move |conn| {
                let query = format!(
                    "SELECT {} FROM {} WHERE id = ?1",
                    JOB_COLUMNS,
                    RecordKind::Job.table()
                );
                let row = conn
                    .query_row(&query, [id.to_string()], JobRow::from_row)
                    .optional()?;
                Ok(row)
            })
            .await
            .map_err(sqlite_error("find sqlite job row"))?;
        row.map(JobRow::into_record).transpose()
    }

    async fn delete_all(&self, kind: RecordKind) -> StoreResult<u64> {
        let removed = self
            .conn
            .call(move |conn| {
                let removed = conn.execute(&format!("DELETE FROM {}", kind.table()), [])?;
                Ok(removed)
            })
            .await
            .map_err(sqlite_error("clear sqlite table"))?;
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}
