use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use geovision_core::ImageReference;
use geovision_media::{has_extension, CAPTION_EXTENSIONS};

use crate::envelope::{decode_key, NotificationBatch, RelayMessage, RelayRecord, StorageRecord};

/// Flatten a notification envelope into the image references it names.
///
/// Handles direct storage records and topic-relayed records (whose message is
/// either a nested storage batch or an upload notice). Malformed records and
/// non-image keys are logged and skipped; nothing here aborts the batch.
pub fn normalize(event: &Value) -> impl Iterator<Item = ImageReference> + '_ {
    NotificationBatch::records_of(event)
        .iter()
        .enumerate()
        .flat_map(|(index, record)| expand_record(index, record))
        .filter(|reference| {
            let keep = has_extension(&reference.key, CAPTION_EXTENSIONS);
            if !keep {
                info!(bucket = %reference.bucket, key = %reference.key, "Skipping non-image object");
            }
            keep
        })
}

/// One outer record expands to zero or more references.
fn expand_record(index: usize, record: &Value) -> Vec<ImageReference> {
    if record.get("Sns").is_some() {
        let relay = match RelayRecord::deserialize(record) {
            Ok(relay) => relay,
            Err(e) => {
                warn!(record = index, error = %e, "Skipping malformed relay record");
                return Vec::new();
            }
        };
        match relay.sns.decode() {
            Ok(RelayMessage::Notice(notice)) => {
                leaf_reference(index, &notice.bucket, &notice.key).into_iter().collect()
            }
            Ok(RelayMessage::Batch(batch)) => batch
                .records
                .iter()
                .filter_map(|inner| storage_reference(index, inner))
                .collect(),
            Err(e) => {
                warn!(record = index, error = %e, "Skipping relay record with undecodable message");
                Vec::new()
            }
        }
    } else {
        storage_reference(index, record).into_iter().collect()
    }
}

fn storage_reference(index: usize, record: &Value) -> Option<ImageReference> {
    match StorageRecord::deserialize(record) {
        Ok(storage) => leaf_reference(index, &storage.s3.bucket.name, &storage.s3.object.key),
        Err(e) => {
            warn!(record = index, error = %e, "Skipping malformed storage record");
            None
        }
    }
}

fn leaf_reference(index: usize, bucket: &str, raw_key: &str) -> Option<ImageReference> {
    match decode_key(raw_key) {
        Ok(key) => Some(ImageReference::new(bucket, key)),
        Err(e) => {
            warn!(record = index, bucket, key = raw_key, error = %e, "Skipping record with undecodable key");
            None
        }
    }
}

/// Loosely-read storage record as seen by the upload notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub bucket: Option<String>,
    /// Still URL-encoded; forwarded verbatim.
    pub key: Option<String>,
}

/// Read `(bucket, key)` from every direct storage record, tolerating gaps.
pub fn upload_candidates(event: &Value) -> impl Iterator<Item = UploadCandidate> + '_ {
    NotificationBatch::records_of(event).iter().map(|record| {
        let text = |pointer: &str| {
            record
                .pointer(pointer)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        UploadCandidate {
            bucket: text("/s3/bucket/name"),
            key: text("/s3/object/key"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn storage(bucket: &str, key: &str) -> Value {
        json!({
            "eventName": "ObjectCreated:Put",
            "s3": {"bucket": {"name": bucket}, "object": {"key": key, "size": 1024}}
        })
    }

    fn relay(message: Value) -> Value {
        json!({"EventSource": "aws:sns", "Sns": {"Message": message.to_string(), "Subject": "s"}})
    }

    #[test]
    fn filters_non_images_without_error() {
        let event = json!({"Records": [storage("b", "img/one.png"), storage("b", "notes/readme.txt")]});
        let refs: Vec<_> = normalize(&event).collect();
        assert_eq!(refs, vec![ImageReference::new("b", "img/one.png")]);
    }

    #[test]
    fn decodes_url_encoded_keys() {
        let event = json!({"Records": [storage("b", "a%20b.png")]});
        let refs: Vec<_> = normalize(&event).collect();
        assert_eq!(refs[0].key, "a b.png");
    }

    #[test]
    fn unwraps_relayed_storage_batch() {
        let inner = json!({"Records": [storage("b", "x/1.jpg"), storage("b", "x/2.JPEG")]});
        let event = json!({"Records": [relay(inner)]});
        let keys: Vec<_> = normalize(&event).map(|r| r.key).collect();
        assert_eq!(keys, vec!["x/1.jpg", "x/2.JPEG"]);
    }

    #[test]
    fn unwraps_relayed_upload_notice() {
        let event = json!({"Records": [relay(json!({"bucket": "up", "key": "my+pic.gif"}))]});
        let refs: Vec<_> = normalize(&event).collect();
        assert_eq!(refs, vec![ImageReference::new("up", "my pic.gif")]);
    }

    #[test]
    fn malformed_records_are_skipped() {
        let event = json!({"Records": [
            {"s3": {"bucket": {"name": "b"}}},
            {"Sns": {"Message": "{not json"}},
            {"Sns": {"Subject": "no message"}},
            storage("b", "bad%FF.png"),
            storage("b", "good.webp"),
        ]});
        let refs: Vec<_> = normalize(&event).collect();
        assert_eq!(refs, vec![ImageReference::new("b", "good.webp")]);
    }

    #[test]
    fn malformed_inner_record_does_not_drop_siblings() {
        let inner = json!({"Records": [{"s3": {}}, storage("b", "ok.png")]});
        let event = json!({"Records": [relay(inner)]});
        assert_eq!(normalize(&event).count(), 1);
    }

    #[test]
    fn empty_event_yields_nothing() {
        assert_eq!(normalize(&json!({})).count(), 0);
    }

    #[test]
    fn upload_candidates_tolerate_missing_fields() {
        let event = json!({"Records": [storage("b", "a.png"), {"s3": {"bucket": {"name": "b"}}}]});
        let candidates: Vec<_> = upload_candidates(&event).collect();
        assert_eq!(candidates[0].key.as_deref(), Some("a.png"));
        assert_eq!(candidates[1].key, None);
        assert_eq!(candidates[1].bucket.as_deref(), Some("b"));
    }
}
