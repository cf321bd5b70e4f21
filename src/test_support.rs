use std::future::Future;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::{AppError, AppResult};

pub(crate) fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

/// Fixed reference instant so bucket boundaries stay predictable.
pub(crate) fn base_time() -> AppResult<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| AppError::validation("Invalid base time"))
}

pub(crate) fn at_offset(base: DateTime<Utc>, seconds: i64) -> AppResult<DateTime<Utc>> {
    base.checked_add_signed(Duration::seconds(seconds))
        .ok_or_else(|| AppError::validation("Timestamp overflow"))
}
