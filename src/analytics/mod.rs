//! Aggregate analytics over a time-ranged set of request records.
//!
//! The scalar counters come from store counts while the histograms are
//! computed in memory over the loaded records, so the two are not taken
//! from a single snapshot.
mod duration;
mod endpoints;
mod report;
mod timeline;


use tracing::debug;

use crate::error::StoreResult;
use crate::model::RequestRecord;
use crate::store::{RecordStore, RequestPredicate, Sort, SortDirection, SortKey, TimeRange};

pub use duration::{DURATION_BOUNDARIES, duration_buckets};
pub use endpoints::endpoint_stats;
pub use report::{
    AnalyzeReport, DurationBucket, DurationMember, EndpointStats, ReportCounts, TimeBucket,
    TimeMember,
};
pub use timeline::{time_boundaries, time_buckets, time_step};

/// Response status counted as an exception.
pub const EXCEPTION_STATUS: u16 = 500;

/// Count and bucket every request created inside `range` (inclusive).
///
/// # Errors
///
/// Returns any store failure from the count or load queries.
pub async fn analyze<S>(store: &S, range: TimeRange) -> StoreResult<AnalyzeReport>
where
    S: RecordStore + ?Sized,
{
    let in_range = RequestPredicate::in_range(range);
    let counts = ReportCounts {
        total: store.count_requests(&in_range).await?,
        success: store
            .count_requests(&in_range.clone().with_success(true))
            .await?,
        exceptions: store
            .count_requests(&in_range.clone().with_status(EXCEPTION_STATUS))
            .await?,
    };

    let chronological = Sort {
        key: SortKey::CreatedAt,
        direction: SortDirection::Ascending,
    };
    let records = store.query_requests(&in_range, chronological, None).await?;
    debug!(
        "Analyzing {} record(s) between {} and {}",
        records.len(),
        range.from,
        range.to
    );

    Ok(aggregate(range, counts, &records))
}

/// Pure assembly of the report from already-loaded records.
#[must_use]
pub fn aggregate(
    range: TimeRange,
    counts: ReportCounts,
    records: &[RequestRecord],
) -> AnalyzeReport {
    let duration = duration_buckets(records);
    let duration_urls = endpoint_stats(&duration);
    let created_at = time_buckets(range, records);

    AnalyzeReport {
        from_date: range.from,
        to_date: range.to,
        total: counts.total,
        success: counts.success,
        exceptions: counts.exceptions,
        duration,
        duration_urls,
        created_at,
        duration_boundaries: DURATION_BOUNDARIES.to_vec(),
    }
}
