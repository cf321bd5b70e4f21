use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::model::{JobRecord, JsonBlob, RequestRecord};

use super::super::{JobPredicate, Page, RequestPredicate, Sort, TimeRange};

pub(super) const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS monitoring_request_logs (
        id TEXT PRIMARY KEY,
        routing_key TEXT NOT NULL,
        path TEXT NOT NULL,
        url TEXT NOT NULL,
        method TEXT NOT NULL,
        user_snapshot TEXT NOT NULL,
        request TEXT NOT NULL,
        response TEXT NOT NULL,
        response_headers TEXT NOT NULL,
        success INTEGER NOT NULL,
        duration_ms INTEGER NOT NULL,
        created_at_ns INTEGER NOT NULL,
        updated_at_ns INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_request_logs_created_at
        ON monitoring_request_logs(created_at_ns);
    CREATE TABLE IF NOT EXISTS monitoring_job_logs (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        success INTEGER NOT NULL,
        metadata TEXT NOT NULL,
        created_at_ns INTEGER NOT NULL,
        updated_at_ns INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_job_logs_created_at
        ON monitoring_job_logs(created_at_ns);";

pub(super) const REQUEST_COLUMNS: &str = "id, routing_key, path, url, method, user_snapshot, \
     request, response, response_headers, success, duration_ms, created_at_ns, updated_at_ns";

pub(super) const JOB_COLUMNS: &str =
    "id, name, success, metadata, created_at_ns, updated_at_ns";

pub(super) const INSERT_REQUEST: &str = "INSERT INTO monitoring_request_logs (
        id, routing_key, path, url, method, user_snapshot, request, response,
        response_headers, success, duration_ms, created_at_ns, updated_at_ns)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)";

pub(super) const INSERT_JOB: &str = "INSERT INTO monitoring_job_logs (
        id, name, success, metadata, created_at_ns, updated_at_ns)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

/// `WHERE ...` fragment (possibly empty) plus its positional parameters.
#[derive(Debug, Default)]
pub(super) struct Filter {
    pub(super) sql: String,
    pub(super) params: Vec<SqlValue>,
}

#[derive(Default)]
struct FilterBuilder {
    clauses: Vec<String>,
    params: Vec<SqlValue>,
}

impl FilterBuilder {
    fn push(&mut self, clause: &str, param: SqlValue) {
        self.clauses.push(clause.to_owned());
        self.params.push(param);
    }

    fn range(&mut self, range: Option<TimeRange>) {
        if let Some(range) = range {
            self.clauses.push("created_at_ns BETWEEN ? AND ?".to_owned());
            self.params.push(SqlValue::Integer(epoch_nanos(range.from)));
            self.params.push(SqlValue::Integer(epoch_nanos(range.to)));
        }
    }

    fn finish(self) -> Filter {
        let sql = if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        };
        Filter {
            sql,
            params: self.params,
        }
    }
}

pub(super) fn request_filter(predicate: &RequestPredicate) -> Filter {
    let mut builder = FilterBuilder::default();
    builder.range(predicate.range);
    if let Some(code) = predicate.status_code {
        builder.push(
            "CAST(json_extract(response, '$.statusCode') AS INTEGER) = ?",
            SqlValue::Integer(i64::from(code)),
        );
    }
    if let Some(needle) = predicate.url_contains.as_ref() {
        builder.push("instr(url, ?) > 0", SqlValue::Text(needle.clone()));
    }
    if !predicate.methods.is_empty() {
        let placeholders = vec!["?"; predicate.methods.len()].join(", ");
        builder.clauses.push(format!("method IN ({})", placeholders));
        builder.params.extend(
            predicate
                .methods
                .iter()
                .map(|method| SqlValue::Text(method.clone())),
        );
    }
    if let Some(success) = predicate.success {
        builder.push("success = ?", SqlValue::Integer(i64::from(success)));
    }
    if let Some(min) = predicate.duration_min {
        builder.push("duration_ms >= ?", SqlValue::Integer(clamp_i64(min)));
    }
    if let Some(max) = predicate.duration_max {
        builder.push("duration_ms <= ?", SqlValue::Integer(clamp_i64(max)));
    }
    builder.finish()
}

pub(super) fn job_filter(predicate: &JobPredicate) -> Filter {
    let mut builder = FilterBuilder::default();
    builder.range(predicate.range);
    if let Some(needle) = predicate.name_contains.as_ref() {
        builder.push("instr(name, ?) > 0", SqlValue::Text(needle.clone()));
    }
    if let Some(success) = predicate.success {
        builder.push("success = ?", SqlValue::Integer(i64::from(success)));
    }
    builder.finish()
}

/// `ORDER BY ... [LIMIT ? OFFSET ?]`, appending the page parameters.
pub(super) fn order_and_page(
    column: &str,
    sort: Sort,
    page: Option<Page>,
    params: &mut Vec<SqlValue>,
) -> String {
    let direction = sort.direction.sql();
    let order = format!(" ORDER BY {} {}, id {}", column, direction, direction);
    match page {
        Some(page) => {
            params.push(SqlValue::Integer(clamp_i64(page.per_page)));
            params.push(SqlValue::Integer(clamp_i64(page.offset())));
            format!("{} LIMIT ? OFFSET ?", order)
        }
        None => order,
    }
}

pub(super) fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Nanoseconds since the epoch, saturating outside 1677..2262.
pub(super) fn epoch_nanos(at: DateTime<Utc>) -> i64 {
    at.timestamp_nanos_opt()
        .unwrap_or(if at.timestamp() < 0 { i64::MIN } else { i64::MAX })
}

pub(super) fn request_values(record: &RequestRecord) -> [SqlValue; 13] {
    [
        SqlValue::Text(record.id.to_string()),
        SqlValue::Text(record.key.clone()),
        SqlValue::Text(record.path.clone()),
        SqlValue::Text(record.url.clone()),
        SqlValue::Text(record.method.clone()),
        SqlValue::Text(record.user.to_json_string()),
        SqlValue::Text(record.request.to_json_string()),
        SqlValue::Text(record.response.to_json_string()),
        SqlValue::Text(record.response_headers.to_json_string()),
        SqlValue::Integer(i64::from(record.success)),
        SqlValue::Integer(clamp_i64(record.duration_ms)),
        SqlValue::Integer(epoch_nanos(record.created_at)),
        SqlValue::Integer(epoch_nanos(record.updated_at)),
    ]
}

pub(super) fn job_values(job: &JobRecord) -> [SqlValue; 6] {
    [
        SqlValue::Text(job.id.to_string()),
        SqlValue::Text(job.name.clone()),
        SqlValue::Integer(i64::from(job.success)),
        SqlValue::Text(job.metadata.to_json_string()),
        SqlValue::Integer(epoch_nanos(job.created_at)),
        SqlValue::Integer(epoch_nanos(job.updated_at)),
    ]
}

/// Raw column values, decoded into a record outside the connection thread.
#[derive(Debug)]
pub(super) struct RequestRow {
    id: String,
    key: String,
    path: String,
    url: String,
    method: String,
    user: String,
    request: String,
    response: String,
    response_headers: String,
    success: bool,
    duration_ms: i64,
    created_at_ns: i64,
    updated_at_ns: i64,
}

impl RequestRow {
    pub(super) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            key: row.get(1)?,
            path: row.get(2)?,
            url: row.get(3)?,
            method: row.get(4)?,
            user: row.get(5)?,
            request: row.get(6)?,
            response: row.get(7)?,
            response_headers: row.get(8)?,
            success: row.get(9)?,
            duration_ms: row.get(10)?,
            created_at_ns: row.get(11)?,
            updated_at_ns: row.get(12)?,
        })
    }

    pub(super) fn into_record(self) -> StoreResult<RequestRecord> {
        Ok(RequestRecord {
            id: parse_id(&self.id)?,
            key: self.key,
            path: self.path,
            url: self.url,
            method: self.method,
            user: parse_blob("user", &self.user)?,
            request: parse_blob("request", &self.request)?,
            response: parse_blob("response", &self.response)?,
            response_headers: parse_blob("responseHeaders", &self.response_headers)?,
            success: self.success,
            duration_ms: u64::try_from(self.duration_ms).map_err(|err| StoreError::Corrupt {
                context: "decode request row",
                detail: format!("negative duration {}: {}", self.duration_ms, err),
            })?,
            created_at: parse_nanos(self.created_at_ns),
            updated_at: parse_nanos(self.updated_at_ns),
        })
    }
}

#[derive(Debug)]
pub(super) struct JobRow {
    id: String,
    name: String,
    success: bool,
    metadata: String,
    created_at_ns: i64,
    updated_at_ns: i64,
}

impl JobRow {
    pub(super) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            success: row.get(2)?,
            metadata: row.get(3)?,
            created_at_ns: row.get(4)?,
            updated_at_ns: row.get(5)?,
        })
    }

    pub(super) fn into_record(self) -> StoreResult<JobRecord> {
        Ok(JobRecord {
            id: parse_id(&self.id)?,
            name: self.name,
            success: self.success,
            metadata: parse_blob("metadata", &self.metadata)?,
            created_at: parse_nanos(self.created_at_ns),
            updated_at: parse_nanos(self.updated_at_ns),
        })
    }
}

fn parse_id(raw: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(raw).map_err(|err| StoreError::Corrupt {
        context: "decode row id",
        detail: format!("'{}': {}", raw, err),
    })
}

fn parse_blob(field: &'static str, raw: &str) -> StoreResult<JsonBlob> {
    JsonBlob::parse(field, raw).map_err(|err| StoreError::Corrupt {
        context: "decode JSON column",
        detail: err.to_string(),
    })
}

fn parse_nanos(nanos: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_nanos(nanos)
}
