use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::Client;
use tracing::debug;

use geovision_core::{GeoError, GeoResult, Publisher};

const SERVICE: &str = "sns";

/// Topic publisher backed by Amazon SNS.
#[derive(Debug, Clone)]
pub struct SnsPublisher {
    client: Client,
}

impl SnsPublisher {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl Publisher for SnsPublisher {
    async fn publish(&self, topic: &str, subject: &str, message: &str) -> GeoResult<()> {
        let output = self
            .client
            .publish()
            .topic_arn(topic)
            .subject(subject)
            .message(message)
            .send()
            .await
            .map_err(|e| GeoError::collaborator(SERVICE, DisplayErrorContext(e)))?;

        debug!(topic, message_id = ?output.message_id(), "Published message");
        Ok(())
    }
}
