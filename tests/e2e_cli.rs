
use std::fs;

use serde_json::Value;
use tempfile::tempdir;

use support_cli::{json_stdout, run_apiwatch};

const CAPTURES: &str = r#"{"url":"http://localhost/api/users/1","method":"GET","request":{},"response":{"statusCode":200},"responseHeaders":{},"success":true,"duration":12}
{"url":"http://localhost/api/users/2","method":"GET","request":{},"response":{"statusCode":200},"responseHeaders":{},"success":true,"duration":30}
{"url":"http://localhost/api/orders","method":"POST","request":{},"response":{"statusCode":500},"responseHeaders":{},"success":false,"duration":950}
"#;

fn field(value: &Value, key: &str) -> Result<u64, String> {
    value
        .get(key)
        .and_then(Value::as_u64)
        .ok_or_else(|| format!("missing numeric field '{}' in {}", key, value))
}

#[test]
fn e2e_ingest_list_and_analyze() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let db = dir.path().join("apiwatch.db");
    let input = dir.path().join("captures.jsonl");
    fs::write(&input, CAPTURES).map_err(|err| format!("write input failed: {}", err))?;
    let db_arg = db.to_string_lossy().into_owned();
    let input_arg = input.to_string_lossy().into_owned();

    let ingest = json_stdout(&run_apiwatch([
        "--db",
        db_arg.as_str(),
        "ingest",
        input_arg.as_str(),
    ])?)?;
    let pipeline = ingest
        .get("pipeline")
        .ok_or_else(|| "missing pipeline stats".to_owned())?;
    if field(&ingest, "lines")? != 3 || field(pipeline, "flushedRecords")? != 3 {
        return Err(format!("Unexpected ingest summary: {}", ingest));
    }

    let failed = json_stdout(&run_apiwatch([
        "--db",
        db_arg.as_str(),
        "requests",
        "--exception",
    ])?)?;
    if field(&failed, "total")? != 1 {
        return Err(format!("Expected one exception, got {}", failed));
    }

    let report = json_stdout(&run_apiwatch(["--db", db_arg.as_str(), "analyze"])?)?;
    if field(&report, "total")? != 3 || field(&report, "success")? != 2 {
        return Err(format!("Unexpected report: {}", report));
    }
    let endpoints = report
        .get("durationURLs")
        .and_then(Value::as_array)
        .ok_or_else(|| "missing durationURLs".to_owned())?;
    if endpoints.len() != 1 {
        return Err(format!("Expected one successful endpoint, got {:?}", endpoints));
    }
    Ok(())
}

#[test]
fn e2e_jobs_round_trip_and_clear() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let db = dir.path().join("apiwatch.db");
    let db_arg = db.to_string_lossy().into_owned();

    let job = json_stdout(&run_apiwatch([
        "--db",
        db_arg.as_str(),
        "log-job",
        "nightly-report",
        "--failed",
        "--metadata",
        r#"{"rows":12}"#,
    ])?)?;
    let id = job
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing job id in {}", job))?
        .to_owned();
    if job.get("success") != Some(&Value::Bool(false)) {
        return Err(format!("Expected failed job, got {}", job));
    }

    let found = json_stdout(&run_apiwatch(["--db", db_arg.as_str(), "job", id.as_str()])?)?;
    if found.get("name").and_then(Value::as_str) != Some("nightly-report") {
        return Err(format!("Unexpected job lookup: {}", found));
    }

    let cleared = json_stdout(&run_apiwatch(["--db", db_arg.as_str(), "clear"])?)?;
    if field(&cleared, "jobs")? != 1 {
        return Err(format!("Unexpected clear summary: {}", cleared));
    }

    let missing = run_apiwatch(["--db", db_arg.as_str(), "job", id.as_str()])?;
    if missing.status.success() {
        return Err("Expected lookup after clear to fail".to_owned());
    }

    let invalid = run_apiwatch(["--db", db_arg.as_str(), "log-job", "x", "--metadata", "{oops"])?;
    if invalid.status.success() {
        return Err("Expected invalid metadata to fail".to_owned());
    }
    Ok(())
}
