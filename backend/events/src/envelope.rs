//! Storage notification envelopes.
//!
//! A batch arrives either directly from storage (`Records[].s3`) or relayed
//! through a topic (`Records[].Sns.Message`), in which case the message is a
//! JSON string that must be decoded a second time into a [`RelayMessage`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outer `{"Records": [...]}` wrapper. Records are kept raw so one malformed
/// entry can be skipped without losing the rest of the batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationBatch {
    #[serde(rename = "Records")]
    pub records: Vec<Value>,
}

impl NotificationBatch {
    /// Borrow the records of an event; a missing or non-list `Records` is empty.
    pub fn records_of(event: &Value) -> &[Value] {
        event
            .get("Records")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// A storage-created record.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageRecord {
    pub s3: StorageEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageEntity {
    pub bucket: BucketEntity,
    pub object: ObjectEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketEntity {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectEntity {
    /// URL-encoded as delivered by storage.
    pub key: String,
    #[serde(default)]
    pub size: Option<u64>,
}

/// A topic-relayed record.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayRecord {
    #[serde(rename = "Sns")]
    pub sns: RelayPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayPayload {
    /// JSON-encoded [`RelayMessage`].
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Subject", default)]
    pub subject: Option<String>,
    #[serde(rename = "TopicArn", default)]
    pub topic_arn: Option<String>,
}

/// Minimal message published by the upload notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadNotice {
    pub bucket: String,
    pub key: String,
}

/// Second-stage decode of a relay message body.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RelayMessage {
    Notice(UploadNotice),
    Batch(NotificationBatch),
}

impl RelayPayload {
    pub fn decode(&self) -> Result<RelayMessage, serde_json::Error> {
        serde_json::from_str(&self.message)
    }
}

/// Decode an object key from a notification.
///
/// Storage encodes spaces as `+` and everything else with `%XX`.
pub fn decode_key(raw: &str) -> Result<String, std::string::FromUtf8Error> {
    urlencoding::decode(&raw.replace('+', " ")).map(|k| k.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_percent_and_plus() {
        assert_eq!(decode_key("a%20b.png").unwrap(), "a b.png");
        assert_eq!(decode_key("my+photo%2B1.jpg").unwrap(), "my photo+1.jpg");
        assert!(decode_key("bad%FF.png").is_err());
    }

    #[test]
    fn relay_message_prefers_notice_shape() {
        let payload = RelayPayload {
            message: json!({"bucket": "b", "key": "k.png"}).to_string(),
            subject: Some("New Image Uploaded".into()),
            topic_arn: None,
        };
        match payload.decode().unwrap() {
            RelayMessage::Notice(n) => assert_eq!(n.key, "k.png"),
            other => panic!("expected notice, got {other:?}"),
        }
    }

    #[test]
    fn relay_message_decodes_nested_batch() {
        let inner = json!({"Records": [{"s3": {"bucket": {"name": "b"}, "object": {"key": "k.png"}}}]});
        let payload = RelayPayload {
            message: inner.to_string(),
            subject: None,
            topic_arn: None,
        };
        match payload.decode().unwrap() {
            RelayMessage::Batch(batch) => assert_eq!(batch.records.len(), 1),
            other => panic!("expected batch, got {other:?}"),
        }
    }

    #[test]
    fn relay_message_rejects_garbage() {
        let payload = RelayPayload {
            message: "not json".into(),
            subject: None,
            topic_arn: None,
        };
        assert!(payload.decode().is_err());
    }

    #[test]
    fn missing_records_is_empty() {
        assert!(NotificationBatch::records_of(&json!({})).is_empty());
        assert!(NotificationBatch::records_of(&json!({"Records": "x"})).is_empty());
    }
}
