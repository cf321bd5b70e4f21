//! Raw, query-string shaped listing filters and their normalization.
//!
//! Every field is optional and malformed values fall back to defaults
//! instead of failing; callers always get a usable query.
mod resolve;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::analytics::EXCEPTION_STATUS;
use crate::store::{JobPredicate, Page, RequestPredicate, Sort, TimeRange};

pub use resolve::{
    DEFAULT_PAGE, DEFAULT_PER_PAGE, DEFAULT_WINDOW_HOURS, MAX_PER_PAGE, parse_methods,
    resolve_page, resolve_range, resolve_sort,
};

/// Pagination, sorting and date-range parameters shared by every listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BaseFilter {
    #[serde(deserialize_with = "lenient_text")]
    pub page: Option<String>,
    #[serde(alias = "perPage", deserialize_with = "lenient_text")]
    pub per_page: Option<String>,
    #[serde(rename = "sortKey", alias = "sort_key")]
    pub sort_key: Option<String>,
    /// Accepted for compatibility; listings always sort descending.
    #[serde(rename = "sortDir", alias = "sort_dir")]
    pub sort_dir: Option<String>,
    /// RFC 3339; defaults to 24 hours before now.
    #[serde(rename = "fromDate", alias = "from_date")]
    pub from_date: Option<String>,
    /// RFC 3339; defaults to now.
    #[serde(rename = "toDate", alias = "to_date")]
    pub to_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RequestFilter {
    #[serde(flatten)]
    pub base: BaseFilter,
    /// Substring of the full URL.
    pub url: Option<String>,
    /// Comma-separated list such as `GET,POST`.
    pub method: Option<String>,
    pub success: Option<bool>,
    /// `true` restricts to status 500 and overrides `status_code`.
    pub exception: Option<bool>,
    /// Inclusive lower duration bound in milliseconds.
    #[serde(rename = "durationGt", alias = "duration_gt")]
    pub duration_gt: Option<u64>,
    /// Inclusive upper duration bound in milliseconds.
    #[serde(rename = "durationLt", alias = "duration_lt")]
    pub duration_lt: Option<u64>,
    #[serde(rename = "statusCode", alias = "status_code")]
    pub status_code: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JobFilter {
    #[serde(flatten)]
    pub base: BaseFilter,
    /// Substring of the job name.
    pub name: Option<String>,
    pub success: Option<bool>,
}

/// A filter normalized into what the store understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuery<P> {
    pub range: TimeRange,
    pub predicate: P,
    pub sort: Sort,
    pub page: Page,
}

/// Query-string values arrive as text; JSON callers may send numbers.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|value| value.as_str().map_or_else(|| value.to_string(), str::to_owned)))
}

impl RequestFilter {
    #[must_use]
    pub fn resolve_at(&self, now: DateTime<Utc>) -> ResolvedQuery<RequestPredicate> {
        let range = resolve_range(&self.base, now);
        let status_code = if self.exception == Some(true) {
            Some(EXCEPTION_STATUS)
        } else {
            self.status_code
        };
        let predicate = RequestPredicate {
            range: Some(range),
            url_contains: self.url.clone().filter(|url| !url.is_empty()),
            methods: self.method.as_deref().map(parse_methods).unwrap_or_default(),
            success: self.success,
            status_code,
            duration_min: self.duration_gt,
            duration_max: self.duration_lt,
        };
        ResolvedQuery {
            range,
            predicate,
            sort: resolve_sort(&self.base),
            page: resolve_page(&self.base),
        }
    }
}

impl JobFilter {
    #[must_use]
    pub fn resolve_at(&self, now: DateTime<Utc>) -> ResolvedQuery<JobPredicate> {
        let range = resolve_range(&self.base, now);
        let predicate = JobPredicate {
            range: Some(range),
            name_contains: self.name.clone().filter(|name| !name.is_empty()),
            success: self.success,
        };
        ResolvedQuery {
            range,
            predicate,
            sort: resolve_sort(&self.base),
            page: resolve_page(&self.base),
        }
    }
}
