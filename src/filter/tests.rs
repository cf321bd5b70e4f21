use chrono::TimeDelta;
use serde_json::json;

use super::{BaseFilter, JobFilter, RequestFilter, parse_methods, resolve_page, resolve_range};
use crate::error::{AppError, AppResult};
use crate::store::{Page, SortDirection, SortKey};
use crate::test_support::{at_offset, base_time};

fn base(page: Option<&str>, per_page: Option<&str>) -> BaseFilter {
    BaseFilter {
        page: page.map(str::to_owned),
        per_page: per_page.map(str::to_owned),
        ..BaseFilter::default()
    }
}

#[test]
fn pagination_is_clamped() -> AppResult<()> {
    let cases = [
        (None, None, 1, 20, 0),
        (Some("0"), Some("1000"), 1, 50, 0),
        (Some("3"), Some("10"), 3, 10, 20),
        (Some("-2"), Some("zero"), 1, 20, 0),
        (Some("2"), Some("0"), 2, 20, 20),
    ];
    for (page, per_page, expected_page, expected_per_page, expected_offset) in cases {
        let resolved = resolve_page(&base(page, per_page));
        let expected = Page {
            page: expected_page,
            per_page: expected_per_page,
        };
        if resolved != expected || resolved.offset() != expected_offset {
            return Err(AppError::validation(format!(
                "page={:?} per_page={:?}: got {:?}",
                page, per_page, resolved
            )));
        }
    }
    Ok(())
}

#[test]
fn date_bounds_default_independently() -> AppResult<()> {
    let now = base_time()?;
    let defaults = resolve_range(&BaseFilter::default(), now);
    let day_before = now
        .checked_sub_signed(TimeDelta::hours(24))
        .ok_or_else(|| AppError::validation("underflow"))?;
    if defaults.from != day_before || defaults.to != now {
        return Err(AppError::validation(format!("Unexpected defaults: {:?}", defaults)));
    }

    let only_from = BaseFilter {
        from_date: Some("2024-02-28T12:00:00Z".to_owned()),
        to_date: Some("not a date".to_owned()),
        ..BaseFilter::default()
    };
    let resolved = resolve_range(&only_from, now);
    let expected_from = at_offset(now, -36 * 3600)?;
    if resolved.from != expected_from || resolved.to != now {
        return Err(AppError::validation(format!("Unexpected range: {:?}", resolved)));
    }

    let offset_zone = BaseFilter {
        to_date: Some("2024-03-01T02:00:00+02:00".to_owned()),
        ..BaseFilter::default()
    };
    if resolve_range(&offset_zone, now).to != now {
        return Err(AppError::validation("Offsets should normalize to UTC"));
    }
    Ok(())
}

#[test]
fn exception_overrides_status_code() -> AppResult<()> {
    let now = base_time()?;
    let filter = RequestFilter {
        exception: Some(true),
        status_code: Some(404),
        ..RequestFilter::default()
    };
    if filter.resolve_at(now).predicate.status_code != Some(500) {
        return Err(AppError::validation("exception=true should force status 500"));
    }

    let not_exception = RequestFilter {
        exception: Some(false),
        status_code: Some(404),
        ..RequestFilter::default()
    };
    if not_exception.resolve_at(now).predicate.status_code != Some(404) {
        return Err(AppError::validation("exception=false keeps statusCode"));
    }
    Ok(())
}

#[test]
fn sort_is_whitelisted_and_always_descending() -> AppResult<()> {
    let now = base_time()?;
    let cases = [
        (Some("duration"), SortKey::Duration),
        (Some("created_at"), SortKey::CreatedAt),
        (Some("updatedAt"), SortKey::UpdatedAt),
        (Some("id; DROP TABLE x"), SortKey::CreatedAt),
        (None, SortKey::CreatedAt),
    ];
    for (raw, expected) in cases {
        let filter = JobFilter {
            base: BaseFilter {
                sort_key: raw.map(str::to_owned),
                sort_dir: Some("ASC".to_owned()),
                ..BaseFilter::default()
            },
            ..JobFilter::default()
        };
        let sort = filter.resolve_at(now).sort;
        if sort.key != expected || sort.direction != SortDirection::Descending {
            return Err(AppError::validation(format!(
                "sortKey {:?}: got {:?}",
                raw, sort
            )));
        }
    }
    Ok(())
}

#[test]
fn methods_are_trimmed_and_uppercased() -> AppResult<()> {
    let methods = parse_methods(" get, Post ,,DELETE ");
    if methods != vec!["GET", "POST", "DELETE"] {
        return Err(AppError::validation(format!("Unexpected methods: {:?}", methods)));
    }
    Ok(())
}

#[test]
fn query_shaped_json_deserializes() -> AppResult<()> {
    let filter: RequestFilter = serde_json::from_value(json!({
        "page": 2,
        "per_page": "5",
        "sortKey": "duration",
        "fromDate": "2024-02-29T00:00:00Z",
        "method": "get,post",
        "durationGt": 100,
        "statusCode": 201,
        "success": true
    }))?;
    let resolved = filter.resolve_at(base_time()?);
    if resolved.page.page != 2 || resolved.page.per_page != 5 {
        return Err(AppError::validation(format!("Unexpected page: {:?}", resolved.page)));
    }
    if resolved.predicate.methods != vec!["GET", "POST"]
        || resolved.predicate.duration_min != Some(100)
        || resolved.predicate.status_code != Some(201)
        || resolved.predicate.success != Some(true)
    {
        return Err(AppError::validation(format!(
            "Unexpected predicate: {:?}",
            resolved.predicate
        )));
    }
    if resolved.sort.key != SortKey::Duration {
        return Err(AppError::validation("Expected duration sort"));
    }
    Ok(())
}
