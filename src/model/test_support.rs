use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use super::{DEFAULT_ROUTING_KEY, JsonBlob, RequestRecord};

/// Request record with sensible defaults for tests.
pub(crate) fn request_record(
    method: &str,
    path: &str,
    duration_ms: u64,
    status_code: u16,
    created_at: DateTime<Utc>,
) -> RequestRecord {
    RequestRecord {
        id: Uuid::new_v4(),
        key: DEFAULT_ROUTING_KEY.to_owned(),
        path: path.to_owned(),
        url: format!("http://localhost{}", path),
        method: method.to_owned(),
        user: JsonBlob::null(),
        request: JsonBlob::from_value(json!({ "ip": "127.0.0.1" })),
        response: JsonBlob::from_value(json!({ "statusCode": status_code })),
        response_headers: JsonBlob::from_value(json!({})),
        success: status_code < 400,
        duration_ms,
        created_at,
        updated_at: created_at,
    }
}
