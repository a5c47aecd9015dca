//! Helpers for constructing record identifiers and metadata payloads.

use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

/// Build the metadata object stored alongside each record.
pub(crate) fn build_metadata(summary: &str, timestamp_rfc3339: &str) -> Value {
    let mut metadata = Map::new();
    metadata.insert("summary".into(), Value::String(summary.to_string()));
    metadata.insert(
        "timestamp".into(),
        Value::String(timestamp_rfc3339.to_string()),
    );
    Value::Object(metadata)
}

/// Current timestamp formatted for metadata storage.
pub(crate) fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// Construct a fresh 128-bit random identifier for a record.
pub(crate) fn generate_record_id() -> String {
    Uuid::new_v4().to_string()
}
