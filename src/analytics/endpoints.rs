use std::collections::BTreeMap;

use crate::capture::strip_query;

use super::report::{DurationBucket, EndpointStats};

/// Min/max/mean latency per `(method, url)` over successful bucket members.
///
/// Query strings are stripped before grouping. Requests past the last
/// duration boundary never appear here because they are not bucketed.
#[must_use]
pub fn endpoint_stats(buckets: &[DurationBucket]) -> Vec<EndpointStats> {
    let mut grouped: BTreeMap<(&str, &str), Vec<u64>> = BTreeMap::new();
    for member in buckets
        .iter()
        .flat_map(|bucket| bucket.data.iter())
        .filter(|member| member.success)
    {
        grouped
            .entry((member.method.as_str(), strip_query(&member.url)))
            .or_default()
            .push(member.duration);
    }

    grouped
        .into_iter()
        .filter_map(|((method, url), durations)| {
            let min = durations.iter().copied().min()?;
            let max = durations.iter().copied().max()?;
            Some(EndpointStats {
                method: method.to_owned(),
                url: url.to_owned(),
                min,
                max,
                average: mean(&durations),
                count: durations.len(),
            })
        })
        .collect()
}

#[expect(
    clippy::float_arithmetic,
    reason = "Average latency is reported as a fractional millisecond value."
)]
fn mean(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum = values.iter().fold(0_u64, |acc, value| acc.saturating_add(*value));
    sum as f64 / values.len() as f64
}
