use std::time::Instant;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::types::{
    ContentBlock as WireBlock, ConversationRole, ImageBlock, ImageFormat as WireFormat,
    ImageSource, InferenceConfiguration, Message, SystemContentBlock,
};
use aws_sdk_bedrockruntime::Client;
use tracing::debug;

use geovision_core::{
    ContentBlock, GeoError, GeoResult, ImageFormat, InferenceProvider, InferenceRequest,
    InferenceResponse,
};

const PROVIDER: &str = "bedrock-converse";

/// Bedrock Converse API provider. Images travel as raw bytes.
#[derive(Debug, Clone)]
pub struct BedrockConverseProvider {
    client: Client,
}

impl BedrockConverseProvider {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

fn wire_format(format: ImageFormat) -> WireFormat {
    match format {
        ImageFormat::Jpeg => WireFormat::Jpeg,
        ImageFormat::Png => WireFormat::Png,
        ImageFormat::Gif => WireFormat::Gif,
        ImageFormat::Webp => WireFormat::Webp,
    }
}

fn wire_block(block: &ContentBlock) -> GeoResult<WireBlock> {
    match block {
        ContentBlock::Text(text) => Ok(WireBlock::Text(text.clone())),
        ContentBlock::Image { format, bytes } => {
            let image = ImageBlock::builder()
                .format(wire_format(*format))
                .source(ImageSource::Bytes(Blob::new(bytes.to_vec())))
                .build()
                .map_err(|e| GeoError::collaborator(PROVIDER, e))?;
            Ok(WireBlock::Image(image))
        }
    }
}

/// Output limits for the call. The wire field is an `i32`.
fn inference_config(request: &InferenceRequest) -> GeoResult<InferenceConfiguration> {
    let max_tokens = i32::try_from(request.max_tokens).map_err(|_| {
        GeoError::Config(format!(
            "max_tokens {} exceeds the Converse limit of {}",
            request.max_tokens,
            i32::MAX
        ))
    })?;
    Ok(InferenceConfiguration::builder()
        .max_tokens(max_tokens)
        .set_temperature(request.temperature)
        .build())
}

#[async_trait]
impl InferenceProvider for BedrockConverseProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn converse(&self, request: &InferenceRequest) -> GeoResult<InferenceResponse> {
        let start = Instant::now();

        let content = request
            .content
            .iter()
            .map(wire_block)
            .collect::<GeoResult<Vec<_>>>()?;

        let message = Message::builder()
            .role(ConversationRole::User)
            .set_content(Some(content))
            .build()
            .map_err(|e| GeoError::collaborator(PROVIDER, e))?;

        let config = inference_config(request)?;

        debug!(
            model = %request.model,
            images = request.image_count(),
            blocks = request.content.len(),
            "Sending Converse request"
        );

        let mut call = self
            .client
            .converse()
            .model_id(&request.model)
            .messages(message)
            .inference_config(config);
        if let Some(system) = &request.system_prompt {
            call = call.system(SystemContentBlock::Text(system.clone()));
        }

        let output = call
            .send()
            .await
            .map_err(|e| GeoError::collaborator(PROVIDER, DisplayErrorContext(e)))?;

        let text = output
            .output()
            .and_then(|o| o.as_message().ok())
            .and_then(|m| m.content().iter().find_map(|b| b.as_text().ok()))
            .cloned()
            .ok_or_else(|| GeoError::collaborator(PROVIDER, "response contained no text block"))?;

        let (input_tokens, output_tokens) = output
            .usage()
            .map(|u| (u.input_tokens().max(0) as u64, u.output_tokens().max(0) as u64))
            .unwrap_or_default();

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
