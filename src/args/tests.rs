use clap::Parser;

use super::{ApiwatchArgs, Command};
use crate::error::{AppError, AppResult};

fn parse<I>(args: I) -> AppResult<ApiwatchArgs>
where
    I: IntoIterator<Item = &'static str>,
{
    ApiwatchArgs::try_parse_from(args).map_err(AppError::from)
}

#[test]
fn requests_flags_build_a_filter() -> AppResult<()> {
    let args = parse([
        "apiwatch",
        "--db",
        "monitor.db",
        "requests",
        "--method",
        "get,post",
        "--exception",
        "--status-code",
        "404",
        "--per-page",
        "5",
    ])?;
    if args.db.as_deref() != Some(std::path::Path::new("monitor.db")) {
        return Err(AppError::validation("Expected --db before the subcommand"));
    }
    let Command::Requests(requests) = args.command else {
        return Err(AppError::validation("Expected requests subcommand"));
    };
    let filter = requests.to_filter();
    if filter.exception != Some(true)
        || filter.status_code != Some(404)
        || filter.method.as_deref() != Some("get,post")
        || filter.base.per_page.as_deref() != Some("5")
    {
        return Err(AppError::validation(format!("Unexpected filter: {:?}", filter)));
    }
    Ok(())
}

#[test]
fn global_flags_work_after_subcommand() -> AppResult<()> {
    let args = parse(["apiwatch", "clear", "--verbose", "--no-color"])?;
    if !args.verbose || !args.no_color || !matches!(args.command, Command::Clear) {
        return Err(AppError::validation("Expected global flags to be accepted"));
    }
    Ok(())
}

#[test]
fn lookup_rejects_malformed_ids() -> AppResult<()> {
    if parse(["apiwatch", "request", "not-a-uuid"]).is_ok() {
        return Err(AppError::validation("Expected malformed id to be rejected"));
    }
    let args = parse(["apiwatch", "job", "6f1c1c34-1a53-4f3e-9a55-1d6c3bde2a10"])?;
    if !matches!(args.command, Command::Job(_)) {
        return Err(AppError::validation("Expected job subcommand"));
    }
    Ok(())
}

#[test]
fn analyze_parses_rfc3339_bounds() -> AppResult<()> {
    let args = parse([
        "apiwatch",
        "analyze",
        "--from",
        "2024-03-01T00:00:00Z",
        "--to",
        "2024-03-01T03:00:00+01:00",
    ])?;
    let Command::Analyze(analyze) = args.command else {
        return Err(AppError::validation("Expected analyze subcommand"));
    };
    let (Some(from), Some(to)) = (analyze.from, analyze.to) else {
        return Err(AppError::validation("Expected both bounds"));
    };
    if to.signed_duration_since(from).num_hours() != 2 {
        return Err(AppError::validation("Offsets should normalize to UTC"));
    }
    if parse(["apiwatch", "analyze", "--from", "yesterday"]).is_ok() {
        return Err(AppError::validation("Expected invalid timestamp to fail"));
    }
    Ok(())
}

#[test]
fn log_job_defaults_to_success() -> AppResult<()> {
    let args = parse(["apiwatch", "log-job", "nightly-report", "--metadata", "{\"rows\":1}"])?;
    let Command::LogJob(job) = args.command else {
        return Err(AppError::validation("Expected log-job subcommand"));
    };
    if job.failed || job.name != "nightly-report" || job.metadata.is_none() {
        return Err(AppError::validation(format!("Unexpected args: {:?}", job)));
    }
    Ok(())
}
