use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{JobRecord, RequestRecord};

/// Inclusive creation-time window, matching SQL `BETWEEN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    #[must_use]
    pub const fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at <= self.to
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestPredicate {
    pub range: Option<TimeRange>,
    pub url_contains: Option<String>,
    /// Empty means any method.
    pub methods: Vec<String>,
    pub success: Option<bool>,
    pub status_code: Option<u16>,
    /// Inclusive lower bound in milliseconds.
    pub duration_min: Option<u64>,
    /// Inclusive upper bound in milliseconds.
    pub duration_max: Option<u64>,
}

impl RequestPredicate {
    #[must_use]
    pub fn in_range(range: TimeRange) -> Self {
        Self {
            range: Some(range),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    #[must_use]
    pub fn matches(&self, record: &RequestRecord) -> bool {
        self.range.is_none_or(|range| range.contains(record.created_at))
            && self
                .url_contains
                .as_deref()
                .is_none_or(|needle| record.url.contains(needle))
            && (self.methods.is_empty()
                || self.methods.iter().any(|method| *method == record.method))
            && self.success.is_none_or(|success| record.success == success)
            && self
                .status_code
                .is_none_or(|code| record.status_code() == Some(code))
            && self.duration_min.is_none_or(|min| record.duration_ms >= min)
            && self.duration_max.is_none_or(|max| record.duration_ms <= max)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobPredicate {
    pub range: Option<TimeRange>,
    pub name_contains: Option<String>,
    pub success: Option<bool>,
}

impl JobPredicate {
    #[must_use]
    pub fn matches(&self, job: &JobRecord) -> bool {
        self.range.is_none_or(|range| range.contains(job.created_at))
            && self
                .name_contains
                .as_deref()
                .is_none_or(|needle| job.name.contains(needle))
            && self.success.is_none_or(|success| job.success == success)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    CreatedAt,
    UpdatedAt,
    Duration,
    Url,
    Path,
    Method,
    Name,
    Success,
}

impl SortKey {
    /// Parse a client-supplied key; both `createdAt` and `created_at` work.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let key = match raw.trim().to_ascii_lowercase().replace('_', "").as_str() {
            "createdat" => Self::CreatedAt,
            "updatedat" => Self::UpdatedAt,
            "duration" => Self::Duration,
            "url" => Self::Url,
            "path" => Self::Path,
            "method" => Self::Method,
            "name" => Self::Name,
            "success" => Self::Success,
            _ => return None,
        };
        Some(key)
    }

    /// Column for request rows; keys without a request column sort by creation.
    #[must_use]
    pub const fn request_column(self) -> &'static str {
        match self {
            Self::UpdatedAt => "updated_at_ns",
            Self::Duration => "duration_ms",
            Self::Url => "url",
            Self::Path => "path",
            Self::Method => "method",
            Self::Success => "success",
            Self::CreatedAt | Self::Name => "created_at_ns",
        }
    }

    /// Column for job rows; keys without a job column sort by creation.
    #[must_use]
    pub const fn job_column(self) -> &'static str {
        match self {
            Self::UpdatedAt => "updated_at_ns",
            Self::Name => "name",
            Self::Success => "success",
            Self::CreatedAt | Self::Duration | Self::Url | Self::Path | Self::Method => {
                "created_at_ns"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }

    #[must_use]
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Sort {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Sort {
    #[must_use]
    pub const fn newest_first() -> Self {
        Self {
            key: SortKey::CreatedAt,
            direction: SortDirection::Descending,
        }
    }

    #[must_use]
    pub fn compare_requests(self, left: &RequestRecord, right: &RequestRecord) -> Ordering {
        let ordering = match self.key {
            SortKey::UpdatedAt => left.updated_at.cmp(&right.updated_at),
            SortKey::Duration => left.duration_ms.cmp(&right.duration_ms),
            SortKey::Url => left.url.cmp(&right.url),
            SortKey::Path => left.path.cmp(&right.path),
            SortKey::Method => left.method.cmp(&right.method),
            SortKey::Success => left.success.cmp(&right.success),
            SortKey::CreatedAt | SortKey::Name => left.created_at.cmp(&right.created_at),
        };
        self.direction.apply(ordering)
    }

    #[must_use]
    pub fn compare_jobs(self, left: &JobRecord, right: &JobRecord) -> Ordering {
        let ordering = match self.key {
            SortKey::UpdatedAt => left.updated_at.cmp(&right.updated_at),
            SortKey::Name => left.name.cmp(&right.name),
            SortKey::Success => left.success.cmp(&right.success),
            SortKey::CreatedAt
            | SortKey::Duration
            | SortKey::Url
            | SortKey::Path
            | SortKey::Method => left.created_at.cmp(&right.created_at),
        };
        self.direction.apply(ordering)
    }
}

/// One-based page with a bounded page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub page: u64,
    pub per_page: u64,
}

impl Page {
    #[must_use]
    pub const fn offset(self) -> u64 {
        self.per_page.saturating_mul(self.page.saturating_sub(1))
    }
}
