use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Scalar counters taken from the store before bucketing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportCounts {
    pub total: u64,
    pub success: u64,
    pub exceptions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeReport {
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
    pub total: u64,
    pub success: u64,
    pub exceptions: u64,
    pub duration: Vec<DurationBucket>,
    #[serde(rename = "durationURLs")]
    pub duration_urls: Vec<EndpointStats>,
    pub created_at: Vec<TimeBucket>,
    pub duration_boundaries: Vec<u64>,
}

/// Records whose duration falls in `[id, next boundary)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DurationBucket {
    pub id: u64,
    pub count: usize,
    pub data: Vec<DurationMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DurationMember {
    pub duration: u64,
    /// Route path, or the full URL when no path was recorded.
    pub url: String,
    pub method: String,
    pub success: bool,
}

/// Latency summary for one `(method, url)` pair over successful requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointStats {
    pub method: String,
    pub url: String,
    pub min: u64,
    pub max: u64,
    pub average: f64,
    pub count: usize,
}

/// Records created strictly inside `(id, next boundary)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeBucket {
    pub id: DateTime<Utc>,
    pub count: usize,
    pub data: Vec<TimeMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeMember {
    pub id: Uuid,
    pub url: String,
    pub method: String,
    pub success: bool,
    pub created_at: DateTime<Utc>,
}
