//! Config validation with field-level messages.

use thiserror::Error;
use tracing::{error, warn};

use geovision_core::{GeoError, GeoResult};

use crate::schema::{GeoVisionConfig, InferenceApi, Profile};

#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return every error and warning found.
pub fn validate(config: &GeoVisionConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_inference(config, &mut report);
    validate_storage(config, &mut report);
    validate_messaging(config, &mut report);
    report
}

fn validate_inference(config: &GeoVisionConfig, report: &mut ValidationReport) {
    if config.profile == Profile::Notifier {
        return;
    }
    if config.model_id.trim().is_empty() {
        report.error("MODEL_ID", "Model id cannot be empty");
    }
    if config.max_tokens == 0 {
        report.error("MAX_TOKENS", "MAX_TOKENS must be >= 1");
    } else if i32::try_from(config.max_tokens).is_err() {
        report.error(
            "MAX_TOKENS",
            format!("MAX_TOKENS must be <= {}", i32::MAX),
        );
    }
    if let Some(t) = config.temperature {
        if !(0.0..=1.0).contains(&t) {
            report.error("TEMPERATURE", format!("Temperature {t} is outside [0, 1]"));
        }
    }
    if config.inference_api == InferenceApi::Messages && !config.model_id.starts_with("anthropic.")
    {
        report.warn(
            "INFERENCE_API",
            format!(
                "Model '{}' may not accept the Anthropic messages body; consider INFERENCE_API=converse",
                config.model_id
            ),
        );
    }
}

fn validate_storage(config: &GeoVisionConfig, report: &mut ValidationReport) {
    match config.profile {
        Profile::Analyzer if config.bucket.trim().is_empty() => {
            report.error("BUCKET_NAME", "Analyzer needs a bucket to list folders in");
        }
        Profile::Caption => {
            if config.caption_template_bucket.is_some() && config.caption_template_key.is_none() {
                report.warn(
                    "CAPTION_TEMPLATE_BUCKET",
                    "Template bucket is set without CAPTION_TEMPLATE_KEY; captions are stored untemplated",
                );
            }
        }
        _ => {}
    }
}

fn validate_messaging(config: &GeoVisionConfig, report: &mut ValidationReport) {
    if config.profile == Profile::Notifier && config.topic_arn.is_none() {
        report.error("TOPIC_ARN", "Notifier requires a topic to publish to");
    }
}

impl GeoVisionConfig {
    /// Log every finding and fail on errors.
    pub fn ensure_valid(&self) -> GeoResult<()> {
        let report = validate(self);
        for warning in &report.warnings {
            warn!(path = %warning.path, message = %warning.message, "Config warning");
        }
        for err in &report.errors {
            error!(path = %err.path, message = %err.message, "Config error");
        }
        match report.errors.first() {
            None => Ok(()),
            Some(first) => Err(GeoError::Config(format!(
                "{first} ({} error(s) total)",
                report.errors.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::profile_defaults;

    #[test]
    fn defaults_are_valid_except_notifier_topic() {
        assert!(validate(&profile_defaults(Profile::Caption)).is_valid());
        assert!(validate(&profile_defaults(Profile::Analyzer)).is_valid());

        let report = validate(&profile_defaults(Profile::Notifier));
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "TOPIC_ARN");
    }

    #[test]
    fn rejects_zero_tokens_and_hot_temperature() {
        let mut config = profile_defaults(Profile::Analyzer);
        config.max_tokens = 0;
        config.temperature = Some(1.5);
        let report = validate(&config);
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["MAX_TOKENS", "TEMPERATURE"]);
        assert!(matches!(config.ensure_valid(), Err(GeoError::Config(_))));
    }

    #[test]
    fn rejects_max_tokens_beyond_wire_range() {
        let mut config = profile_defaults(Profile::Caption);
        config.max_tokens = u32::MAX;
        let report = validate(&config);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "MAX_TOKENS");
    }

    #[test]
    fn warns_on_messages_dialect_with_non_anthropic_model() {
        let mut config = profile_defaults(Profile::Caption);
        config.model_id = "amazon.nova-lite-v1:0".into();
        let report = validate(&config);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].path, "INFERENCE_API");
    }

    #[test]
    fn notifier_skips_inference_checks() {
        let mut config = profile_defaults(Profile::Notifier);
        config.topic_arn = Some("arn:aws:sns:us-east-1:1:uploads".into());
        config.max_tokens = 0;
        assert!(config.ensure_valid().is_ok());
    }
}
