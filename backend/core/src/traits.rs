use async_trait::async_trait;
use bytes::Bytes;

use crate::error::GeoResult;
use crate::types::ImageFormat;

/// Object storage capabilities used by the functions.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the full body of an object.
    async fn get_object(&self, bucket: &str, key: &str) -> GeoResult<Bytes>;

    /// Write an object, replacing any existing one.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> GeoResult<()>;

    /// List every key under `prefix`, following pagination to the end.
    async fn list_keys(&self, bucket: &str, prefix: &str) -> GeoResult<Vec<String>>;
}

/// A hosted multimodal model.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Provider name (e.g., "bedrock-converse").
    fn name(&self) -> &str;

    /// Run one single-turn invocation and return the first text block of the reply.
    async fn converse(&self, request: &InferenceRequest) -> GeoResult<InferenceResponse>;
}

/// Notification topic publishing.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, topic: &str, subject: &str, message: &str) -> GeoResult<()>;
}

/// One block of a user turn, in the order the model should see it.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Image { format: ImageFormat, bytes: Bytes },
    Text(String),
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn image(format: ImageFormat, bytes: Bytes) -> Self {
        Self::Image { format, bytes }
    }
}

/// Request to an inference provider.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub model: String,
    pub system_prompt: Option<String>,
    pub content: Vec<ContentBlock>,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

impl InferenceRequest {
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            system_prompt: None,
            content: Vec::new(),
            max_tokens,
            temperature: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn push(&mut self, block: ContentBlock) {
        self.content.push(block);
    }

    pub fn image_count(&self) -> usize {
        self.content
            .iter()
            .filter(|b| matches!(b, ContentBlock::Image { .. }))
            .count()
    }
}

/// Response from an inference provider.
#[derive(Debug, Clone)]
pub struct InferenceResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub latency_ms: u64,
}
