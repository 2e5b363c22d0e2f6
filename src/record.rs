//! Record codec: the [`MjTask`] domain type and its fixed-order column tuple.
//!
//! Cache values are JSON documents with camelCase field names. [`MjTask::decode`]
//! performs a strict typed parse -- a value that is valid JSON but does not
//! match the record shape (for example, missing `id`) is a [`ParseError`],
//! and the caller decides to skip it. [`MjTask::to_row`] produces the
//! 15-value [`TaskRow`] in destination column order, re-serializing the two
//! untyped nested fields to JSON text and passing `None` through for every
//! absent optional. No value coercion, no default substitution.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A cache value that does not deserialize as an [`MjTask`].
///
/// Wraps the underlying `serde_json` error. Never fatal: the pipeline drops
/// the offending value, logs it, and continues.
#[derive(Debug, thiserror::Error)]
#[error("invalid task record: {source}")]
pub struct ParseError {
    #[from]
    source: serde_json::Error,
}

/// A task record as serialized in the cache.
///
/// Every field except `id` is optional and survives to the destination as
/// SQL `NULL` when absent. `properties` and `buttons` hold untyped nested
/// data ([`Value`]) that is only inspected transiently for validation and
/// stored back as serialized text. Unknown fields in the cached document
/// are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MjTask {
    /// Task identifier; the destination primary key.
    pub id: String,
    /// Untyped nested data, stored as a JSON column.
    #[serde(default)]
    pub properties: Option<Value>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub prompt_en: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub submit_time: Option<i64>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub start_time: Option<i64>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub finish_time: Option<i64>,
    #[serde(default)]
    pub progress: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub fail_reason: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    /// Untyped nested data, stored as a JSON column.
    #[serde(default)]
    pub buttons: Option<Value>,
}

/// The 15 destination column values in table order.
///
/// Field order matches [`COLUMNS`](crate::constants::COLUMNS); the bulk
/// loader binds fields in declaration order. Nested data arrives here
/// already re-serialized to JSON text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: String,
    pub properties: Option<String>,
    pub action: Option<String>,
    pub status: Option<String>,
    pub prompt: Option<String>,
    pub prompt_en: Option<String>,
    pub description: Option<String>,
    pub submit_time: Option<i64>,
    pub start_time: Option<i64>,
    pub finish_time: Option<i64>,
    pub progress: Option<String>,
    pub image_url: Option<String>,
    pub fail_reason: Option<String>,
    pub state: Option<String>,
    pub buttons: Option<String>,
}

impl MjTask {
    /// Parses a raw serialized cache value into a task record.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the value is not valid JSON, or is valid
    /// JSON that does not match the record shape (wrong type, missing `id`).
    pub fn decode(raw: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Produces the fixed-order column tuple for the destination table.
    ///
    /// `properties` and `buttons` are re-serialized to JSON text; all other
    /// fields pass through unchanged, `None` staying `None`.
    pub fn to_row(&self) -> TaskRow {
        TaskRow {
            id: self.id.clone(),
            properties: self.properties.as_ref().map(Value::to_string),
            action: self.action.clone(),
            status: self.status.clone(),
            prompt: self.prompt.clone(),
            prompt_en: self.prompt_en.clone(),
            description: self.description.clone(),
            submit_time: self.submit_time,
            start_time: self.start_time,
            finish_time: self.finish_time,
            progress: self.progress.clone(),
            image_url: self.image_url.clone(),
            fail_reason: self.fail_reason.clone(),
            state: self.state.clone(),
            buttons: self.buttons.as_ref().map(Value::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn decode_full_record_maps_camel_case_fields() {
        let raw = json!({
            "id": "1320098173412546",
            "properties": {"notifyHook": "https://example.com/hook"},
            "action": "IMAGINE",
            "status": "SUCCESS",
            "prompt": "a red fox",
            "promptEn": "a red fox",
            "description": "/imagine a red fox",
            "submitTime": 1_689_231_405_854_i64,
            "startTime": 1_689_231_442_755_i64,
            "finishTime": 1_689_231_544_312_i64,
            "progress": "100%",
            "imageUrl": "https://cdn.example.com/fox.png",
            "failReason": null,
            "state": "user-42",
            "buttons": [{"customId": "upsample::1"}],
        })
        .to_string();

        let task = MjTask::decode(&raw).unwrap();
        assert_eq!(task.id, "1320098173412546");
        assert_eq!(task.action.as_deref(), Some("IMAGINE"));
        assert_eq!(task.prompt_en.as_deref(), Some("a red fox"));
        assert_eq!(task.submit_time, Some(1_689_231_405_854));
        assert_eq!(task.fail_reason, None);
        assert!(task.properties.is_some());
        assert!(task.buttons.is_some());
    }

    #[test]
    fn decode_minimal_record_defaults_everything_but_id() {
        let task = MjTask::decode(r#"{"id":"a"}"#).unwrap();
        assert_eq!(task.id, "a");
        assert_eq!(task.to_row().properties, None);
        assert_eq!(task.to_row().submit_time, None);
    }

    #[test]
    fn decode_ignores_unknown_fields() {
        let task = MjTask::decode(r#"{"id":"a","extra":"ignored"}"#).unwrap();
        assert_eq!(task.id, "a");
    }

    #[test]
    fn decode_rejects_malformed_input() {
        assert!(MjTask::decode("not json").is_err());
        assert!(MjTask::decode("").is_err());
        // Valid JSON, wrong shape: not an object / missing id / id not a string.
        assert!(MjTask::decode("42").is_err());
        assert!(MjTask::decode("{}").is_err());
        assert!(MjTask::decode(r#"{"id":7}"#).is_err());
    }

    #[test]
    fn to_row_reserializes_nested_fields_as_equivalent_json() {
        let properties = json!({"zoom": 2, "nested": {"a": [1, 2]}});
        let task = MjTask::decode(
            &json!({"id": "a", "properties": properties, "buttons": ["b1"]}).to_string(),
        )
        .unwrap();

        let row = task.to_row();
        let text = row.properties.expect("properties column");
        let round_tripped: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(round_tripped, properties);
        assert_eq!(row.buttons.as_deref(), Some(r#"["b1"]"#));
    }

    #[test]
    fn to_row_passes_every_field_through_in_column_order() {
        let task = MjTask {
            id: "a".to_string(),
            properties: Some(json!({"p": 1})),
            action: Some("IMAGINE".to_string()),
            status: Some("SUCCESS".to_string()),
            prompt: Some("p".to_string()),
            prompt_en: Some("pe".to_string()),
            description: Some("d".to_string()),
            submit_time: Some(1),
            start_time: Some(2),
            finish_time: Some(3),
            progress: Some("100%".to_string()),
            image_url: Some("u".to_string()),
            fail_reason: Some("f".to_string()),
            state: Some("s".to_string()),
            buttons: Some(json!([])),
        };

        let row = task.to_row();
        assert_eq!(
            row,
            TaskRow {
                id: "a".to_string(),
                properties: Some(r#"{"p":1}"#.to_string()),
                action: Some("IMAGINE".to_string()),
                status: Some("SUCCESS".to_string()),
                prompt: Some("p".to_string()),
                prompt_en: Some("pe".to_string()),
                description: Some("d".to_string()),
                submit_time: Some(1),
                start_time: Some(2),
                finish_time: Some(3),
                progress: Some("100%".to_string()),
                image_url: Some("u".to_string()),
                fail_reason: Some("f".to_string()),
                state: Some("s".to_string()),
                buttons: Some("[]".to_string()),
            }
        );
    }

    proptest! {
        #[test]
        fn optional_fields_pass_through_without_coercion(
            status in proptest::option::of("[a-zA-Z ]{0,20}"),
            progress in proptest::option::of("[0-9]{0,3}%?"),
            submit_time in proptest::option::of(any::<i64>()),
        ) {
            let mut doc = json!({"id": "t"});
            if let Some(s) = &status {
                doc["status"] = json!(s);
            }
            if let Some(p) = &progress {
                doc["progress"] = json!(p);
            }
            if let Some(t) = submit_time {
                doc["submitTime"] = json!(t);
            }

            let row = MjTask::decode(&doc.to_string()).unwrap().to_row();
            prop_assert_eq!(row.status, status);
            prop_assert_eq!(row.progress, progress);
            prop_assert_eq!(row.submit_time, submit_time);
            prop_assert_eq!(row.properties, None);
            prop_assert_eq!(row.buttons, None);
        }
    }
}
