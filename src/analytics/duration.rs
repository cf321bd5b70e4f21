use crate::model::RequestRecord;

use super::report::{DurationBucket, DurationMember};

/// Histogram edges in milliseconds. Durations at or above the last edge
/// are left out of the histogram.
pub const DURATION_BOUNDARIES: [u64; 11] = [0, 20, 40, 80, 130, 150, 180, 200, 500, 1000, 2000];

/// Group records into half-open `[lower, upper)` duration buckets,
/// omitting empty ones.
#[must_use]
pub fn duration_buckets(records: &[RequestRecord]) -> Vec<DurationBucket> {
    DURATION_BOUNDARIES
        .windows(2)
        .filter_map(|edges| {
            let &[lower, upper] = edges else {
                return None;
            };
            let data: Vec<DurationMember> = records
                .iter()
                .filter(|record| lower <= record.duration_ms && record.duration_ms < upper)
                .map(|record| DurationMember {
                    duration: record.duration_ms,
                    url: record.display_path().to_owned(),
                    method: record.method.clone(),
                    success: record.success,
                })
                .collect();
            (!data.is_empty()).then(|| DurationBucket {
                id: lower,
                count: data.len(),
                data,
            })
        })
        .collect()
}
