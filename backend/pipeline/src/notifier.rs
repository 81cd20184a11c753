use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use geovision_core::{GeoError, GeoResult, Publisher};
use geovision_events::{upload_candidates, UploadNotice};
use geovision_media::{has_extension, UPLOAD_EXTENSIONS};

pub const UPLOAD_SUBJECT: &str = "New Image Uploaded";

/// Counts for one notifier invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotifyReport {
    pub published: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Republishes freshly uploaded images as `{bucket, key}` topic messages.
pub struct UploadNotifier {
    publisher: Arc<dyn Publisher>,
    topic: String,
}

impl UploadNotifier {
    pub fn new(publisher: Arc<dyn Publisher>, topic: impl Into<String>) -> Self {
        Self {
            publisher,
            topic: topic.into(),
        }
    }

    async fn publish(&self, notice: &UploadNotice) -> GeoResult<()> {
        let message = serde_json::to_string(notice).map_err(|e| GeoError::Other(e.into()))?;
        self.publisher
            .publish(&self.topic, UPLOAD_SUBJECT, &message)
            .await
    }

    /// Publish one notice per uploaded image. Publish failures are counted,
    /// never propagated.
    pub async fn notify(&self, event: &Value) -> NotifyReport {
        let mut report = NotifyReport::default();
        for candidate in upload_candidates(event) {
            let (Some(bucket), Some(key)) = (candidate.bucket, candidate.key) else {
                debug!("Skipping record without bucket or key");
                report.skipped += 1;
                continue;
            };
            if !has_extension(&key, UPLOAD_EXTENSIONS) {
                debug!(%key, "Skipping non-image upload");
                report.skipped += 1;
                continue;
            }

            let notice = UploadNotice { bucket, key };
            match self.publish(&notice).await {
                Ok(()) => {
                    info!(bucket = %notice.bucket, key = %notice.key, topic = %self.topic, "Published upload notice");
                    report.published += 1;
                }
                Err(e) => {
                    error!(bucket = %notice.bucket, key = %notice.key, error = %e, "Failed to publish upload notice");
                    report.failed += 1;
                }
            }
        }
        report
    }
}
