use std::time::Instant;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tracing::debug;

use geovision_core::{
    ContentBlock, GeoError, GeoResult, InferenceProvider, InferenceRequest, InferenceResponse,
};

const PROVIDER: &str = "bedrock-messages";
const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Bedrock InvokeModel provider speaking the Anthropic Messages body.
/// Images travel base64-encoded inside the JSON payload.
#[derive(Debug, Clone)]
pub struct BedrockMessagesProvider {
    client: Client,
}

impl BedrockMessagesProvider {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    anthropic_version: &'static str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<MessagePart>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum MessagePart {
    Image { source: ImagePayload },
    Text { text: String },
}

#[derive(Serialize)]
struct ImagePayload {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: &'static str,
    data: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponsePart>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

fn encode_body(request: &InferenceRequest) -> serde_json::Result<Vec<u8>> {
    let content = request
        .content
        .iter()
        .map(|block| match block {
            ContentBlock::Text(text) => MessagePart::Text { text: text.clone() },
            ContentBlock::Image { format, bytes } => MessagePart::Image {
                source: ImagePayload {
                    kind: "base64",
                    media_type: format.mime_type(),
                    data: STANDARD.encode(bytes),
                },
            },
        })
        .collect();

    let body = MessagesRequest {
        anthropic_version: ANTHROPIC_VERSION,
        max_tokens: request.max_tokens,
        system: request.system_prompt.as_deref(),
        temperature: request.temperature,
        messages: vec![ChatMessage {
            role: "user",
            content,
        }],
    };
    serde_json::to_vec(&body)
}

fn first_text(body: &[u8]) -> GeoResult<(String, u64, u64)> {
    let parsed: MessagesResponse = serde_json::from_slice(body)
        .map_err(|e| GeoError::collaborator(PROVIDER, format!("unparseable response: {e}")))?;

    let text = parsed
        .content
        .into_iter()
        .find(|part| part.kind == "text")
        .and_then(|part| part.text)
        .ok_or_else(|| GeoError::collaborator(PROVIDER, "response contained no text block"))?;

    let (input, output) = parsed
        .usage
        .map(|u| (u.input_tokens, u.output_tokens))
        .unwrap_or_default();
    Ok((text, input, output))
}

#[async_trait]
impl InferenceProvider for BedrockMessagesProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn converse(&self, request: &InferenceRequest) -> GeoResult<InferenceResponse> {
        let start = Instant::now();
        let payload = encode_body(request)
            .map_err(|e| GeoError::collaborator(PROVIDER, format!("failed to encode request: {e}")))?;

        debug!(
            model = %request.model,
            images = request.image_count(),
            payload_bytes = payload.len(),
            "Sending InvokeModel request"
        );

        let output = self
            .client
            .invoke_model()
            .model_id(&request.model)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(payload))
            .send()
            .await
            .map_err(|e| GeoError::collaborator(PROVIDER, DisplayErrorContext(e)))?;

        let (text, input_tokens, output_tokens) = first_text(output.body().as_ref())?;

        Ok(InferenceResponse {
            text,
            provider: PROVIDER.to_string(),
            model: request.model.clone(),
            input_tokens,
            output_tokens,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use geovision_core::ImageFormat;
    use serde_json::Value;

    #[test]
    fn body_matches_messages_schema() {
        let mut request = InferenceRequest::new("anthropic.claude-3-haiku-20240307-v1:0", 1000);
        request.push(ContentBlock::image(ImageFormat::Jpeg, Bytes::from_static(b"abc")));
        request.push(ContentBlock::text("What do you see?"));

        let body: Value = serde_json::from_slice(&encode_body(&request).unwrap()).unwrap();
        assert_eq!(body["anthropic_version"], "bedrock-2023-05-31");
        assert_eq!(body["max_tokens"], 1000);
        assert!(body.get("system").is_none());
        assert!(body.get("temperature").is_none());

        let content = &body["messages"][0]["content"];
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["type"], "base64");
        assert_eq!(content[0]["source"]["media_type"], "image/jpeg");
        assert_eq!(content[0]["source"]["data"], "YWJj");
        assert_eq!(content[1], serde_json::json!({"type": "text", "text": "What do you see?"}));
    }

    #[test]
    fn extracts_first_text_block() {
        let body = br#"{"content":[{"type":"text","text":"A red barn."}],"usage":{"input_tokens":12,"output_tokens":4}}"#;
        let (text, input, output) = first_text(body).unwrap();
        assert_eq!(text, "A red barn.");
        assert_eq!((input, output), (12, 4));
    }

    #[test]
    fn empty_content_is_collaborator_failure() {
        let err = first_text(br#"{"content":[]}"#).unwrap_err();
        assert!(matches!(err, GeoError::Collaborator { .. }));
        assert!(first_text(b"<html>").is_err());
    }
}
