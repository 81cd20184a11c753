//! Per-profile default values.

use crate::schema::{GeoVisionConfig, InferenceApi, LogFormat, Profile};

pub const DEFAULT_CAPTION_MODEL: &str = "anthropic.claude-3-haiku-20240307-v1:0";
pub const DEFAULT_ANALYZER_MODEL: &str = "amazon.nova-lite-v1:0";
pub const DEFAULT_ANALYZER_REGION: &str = "us-east-1";
pub const DEFAULT_BUCKET: &str = "azrius-data";
pub const DEFAULT_CAPTION_PROMPT: &str = "What do you see?";
pub const DEFAULT_CAPTION_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_ANALYZER_MAX_TOKENS: u32 = 800;
pub const DEFAULT_ANALYZER_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// The configuration a profile runs with when no variable is set.
pub fn profile_defaults(profile: Profile) -> GeoVisionConfig {
    let base = GeoVisionConfig {
        profile,
        model_id: DEFAULT_CAPTION_MODEL.to_string(),
        inference_api: InferenceApi::Messages,
        region: None,
        bucket: DEFAULT_BUCKET.to_string(),
        topic_arn: None,
        caption_prompt: DEFAULT_CAPTION_PROMPT.to_string(),
        caption_template_key: None,
        caption_template_bucket: None,
        max_tokens: DEFAULT_CAPTION_MAX_TOKENS,
        temperature: None,
        log_level: DEFAULT_LOG_LEVEL.to_string(),
        log_format: LogFormat::Json,
    };

    match profile {
        Profile::Caption | Profile::Notifier => base,
        Profile::Analyzer => GeoVisionConfig {
            model_id: DEFAULT_ANALYZER_MODEL.to_string(),
            inference_api: InferenceApi::Converse,
            region: Some(DEFAULT_ANALYZER_REGION.to_string()),
            max_tokens: DEFAULT_ANALYZER_MAX_TOKENS,
            temperature: Some(DEFAULT_ANALYZER_TEMPERATURE),
            ..base
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyzer_defaults_differ_from_caption() {
        let caption = profile_defaults(Profile::Caption);
        let analyzer = profile_defaults(Profile::Analyzer);
        assert_eq!(caption.inference_api, InferenceApi::Messages);
        assert_eq!(caption.max_tokens, 1000);
        assert_eq!(caption.temperature, None);
        assert_eq!(analyzer.inference_api, InferenceApi::Converse);
        assert_eq!(analyzer.model_id, "amazon.nova-lite-v1:0");
        assert_eq!(analyzer.region.as_deref(), Some("us-east-1"));
        assert_eq!(analyzer.temperature, Some(0.5));
        assert_eq!(analyzer.bucket, caption.bucket);
    }
}
