use serde_json::Value;
use tracing::debug;

use crate::task::ExternalTaskRecord;

/// What can go wrong between raw export text and a loaded task list. The
/// three variants map to distinct user-facing messages; none of them touch
/// existing state.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid export format: 'data' array not found")]
    MissingData,

    #[error("the export parsed but contains no usable tasks")]
    NoTasks,
}

/// Parse raw export text into task records.
///
/// The export is a JSON object with a top-level `data` array. Extra fields
/// anywhere are ignored. Individual records that fail to deserialize are
/// skipped rather than failing the whole import; they would have been
/// dropped by the normalizer anyway.
#[tracing::instrument(skip(raw), fields(len = raw.len()))]
pub fn parse_export(raw: &str) -> Result<Vec<ExternalTaskRecord>, ImportError> {
    let value: Value = serde_json::from_str(raw)?;

    let Some(data) = value.get("data").and_then(Value::as_array) else {
        return Err(ImportError::MissingData);
    };

    let mut records = Vec::with_capacity(data.len());
    for (idx, entry) in data.iter().enumerate() {
        match serde_json::from_value::<ExternalTaskRecord>(entry.clone()) {
            Ok(record) => records.push(record),
            Err(err) => {
                debug!(index = idx, error = %err, "skipping malformed record");
            }
        }
    }

    debug!(total = data.len(), parsed = records.len(), "parsed export");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::{ImportError, parse_export};

    #[test]
    fn rejects_text_that_is_not_json() {
        let err = parse_export("not json at all").expect_err("must fail");
        assert!(matches!(err, ImportError::Json(_)));
    }

    #[test]
    fn rejects_json_without_a_data_array() {
        for raw in [r#"{}"#, r#"{"data": 42}"#, r#"{"data": {"a": 1}}"#, r#"[1, 2]"#] {
            let err = parse_export(raw).expect_err("must fail");
            assert!(matches!(err, ImportError::MissingData), "input: {raw}");
        }
    }

    #[test]
    fn ignores_unknown_fields_and_malformed_records() {
        let raw = r#"{
            "next_page": null,
            "data": [
                {"gid": "1", "name": "A", "memberships": [], "resource_type": "task"},
                "definitely not an object",
                {"gid": "2"}
            ]
        }"#;

        let records = parse_export(raw).expect("parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].gid, "1");
        assert_eq!(records[1].gid, "2");
        assert_eq!(records[1].name, "");
    }
}
