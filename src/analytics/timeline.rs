use chrono::{DateTime, TimeDelta, Utc};

use crate::model::RequestRecord;
use crate::store::TimeRange;

use super::report::{TimeBucket, TimeMember};

const MONTH_DAYS: i64 = 30;

/// Bucket width for a range: minutes up to an hour, hours up to a day,
/// days up to 31 days, 30-day months beyond.
#[must_use]
pub fn time_step(range: TimeRange) -> TimeDelta {
    let span = range.to.signed_duration_since(range.from);
    if span <= TimeDelta::hours(1) {
        TimeDelta::minutes(1)
    } else if span <= TimeDelta::days(1) {
        TimeDelta::hours(1)
    } else if span <= TimeDelta::days(31) {
        TimeDelta::days(1)
    } else {
        TimeDelta::days(MONTH_DAYS)
    }
}

/// Interval edges: `from`, stepping while before `to`, then `to` itself.
///
/// Always yields at least two edges, so there is at least one interval.
#[must_use]
pub fn time_boundaries(range: TimeRange) -> Vec<DateTime<Utc>> {
    let step = time_step(range);
    let mut edges = Vec::new();
    let mut cursor = Some(range.from);
    while let Some(at) = cursor.filter(|at| *at < range.to) {
        edges.push(at);
        cursor = at.checked_add_signed(step);
    }
    if edges.is_empty() {
        edges.push(range.from);
    }
    edges.push(range.to);
    edges
}

/// Group records into time intervals, omitting empty ones.
///
/// Membership is strict on both ends, so a record created exactly on an
/// edge belongs to no bucket.
#[must_use]
pub fn time_buckets(range: TimeRange, records: &[RequestRecord]) -> Vec<TimeBucket> {
    time_boundaries(range)
        .windows(2)
        .filter_map(|edges| {
            let &[start, end] = edges else {
                return None;
            };
            let data: Vec<TimeMember> = records
                .iter()
                .filter(|record| start < record.created_at && record.created_at < end)
                .map(|record| TimeMember {
                    id: record.id,
                    url: record.url.clone(),
                    method: record.method.clone(),
                    success: record.success,
                    created_at: record.created_at,
                })
                .collect();
            (!data.is_empty()).then(|| TimeBucket {
                id: start,
                count: data.len(),
                data,
            })
        })
        .collect()
}
