use chrono::{DateTime, TimeDelta, Utc};

use crate::store::{Page, Sort, SortDirection, SortKey, TimeRange};

use super::BaseFilter;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PER_PAGE: u64 = 20;
pub const MAX_PER_PAGE: u64 = 50;
/// Lookback used when no `fromDate` is given.
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

/// Each bound falls back on its own when absent or not RFC 3339.
#[must_use]
pub fn resolve_range(filter: &BaseFilter, now: DateTime<Utc>) -> TimeRange {
    let from = parse_instant(filter.from_date.as_deref())
        .or_else(|| now.checked_sub_signed(TimeDelta::hours(DEFAULT_WINDOW_HOURS)))
        .unwrap_or(now);
    let to = parse_instant(filter.to_date.as_deref()).unwrap_or(now);
    TimeRange::new(from, to)
}

#[must_use]
pub fn resolve_page(filter: &BaseFilter) -> Page {
    let page = parse_positive(filter.page.as_deref()).unwrap_or(DEFAULT_PAGE);
    let per_page = parse_positive(filter.per_page.as_deref())
        .unwrap_or(DEFAULT_PER_PAGE)
        .min(MAX_PER_PAGE);
    Page { page, per_page }
}

/// Unknown keys sort by creation time; the direction is always descending.
#[must_use]
pub fn resolve_sort(filter: &BaseFilter) -> Sort {
    Sort {
        key: filter
            .sort_key
            .as_deref()
            .and_then(SortKey::parse)
            .unwrap_or_default(),
        direction: SortDirection::Descending,
    }
}

/// Split `GET, post,,` into `["GET", "POST"]`.
#[must_use]
pub fn parse_methods(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|method| !method.is_empty())
        .map(str::to_ascii_uppercase)
        .collect()
}

fn parse_instant(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw?.trim().parse::<u64>().ok().filter(|value| *value >= 1)
}
