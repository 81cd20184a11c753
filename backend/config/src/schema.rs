//! Typed runtime configuration.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use geovision_core::GeoError;

/// Which function the configuration is loaded for. Selects the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Caption,
    Analyzer,
    Notifier,
}

/// Bedrock wire dialect used for inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InferenceApi {
    /// Converse API with raw image bytes.
    Converse,
    /// InvokeModel with an Anthropic Messages body.
    Messages,
}

impl InferenceApi {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Converse => "converse",
            Self::Messages => "messages",
        }
    }
}

impl fmt::Display for InferenceApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InferenceApi {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "converse" => Ok(Self::Converse),
            "messages" | "invoke" => Ok(Self::Messages),
            other => Err(GeoError::Config(format!(
                "unknown INFERENCE_API '{other}'. Use 'converse' or 'messages'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable console output.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "console" | "text" => Ok(Self::Pretty),
            other => Err(GeoError::Config(format!(
                "unknown LOG_FORMAT '{other}'. Use 'json' or 'pretty'"
            ))),
        }
    }
}

/// Effective configuration of one function process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoVisionConfig {
    pub profile: Profile,
    pub model_id: String,
    pub inference_api: InferenceApi,
    /// `None` defers to the SDK's region chain.
    pub region: Option<String>,
    /// Bucket the room analyzer lists folders in.
    pub bucket: String,
    pub topic_arn: Option<String>,
    pub caption_prompt: String,
    pub caption_template_key: Option<String>,
    /// `None` reads the template from the bucket of the image being captioned.
    pub caption_template_bucket: Option<String>,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub log_level: String,
    pub log_format: LogFormat,
}
