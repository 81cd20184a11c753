//! Process start-up: configuration, logging, and collaborator wiring.
//!
//! Everything here runs once per cold start; the flows it returns are shared
//! by reference across invocations.

use std::sync::Arc;

use aws_config::SdkConfig;
use tracing::info;

use geovision_config::{GeoVisionConfig, InferenceApi, Profile};
use geovision_core::{GeoError, GeoResult, InferenceProvider};
use geovision_logging::init_logger;
use geovision_pipeline::{
    AnalyzerSettings, CaptionOrchestrator, CaptionSettings, RoomAnalyzer, TemplateLocation,
    UploadNotifier,
};
use geovision_providers::{
    load_sdk_config, BedrockConverseProvider, BedrockMessagesProvider, S3ObjectStore,
    SnsPublisher,
};

/// Load config for `profile`, start logging, then reject invalid settings.
pub fn bootstrap(profile: Profile) -> GeoResult<GeoVisionConfig> {
    let config = GeoVisionConfig::from_env(profile)?;
    init_logger(&config.log_level, config.log_format);
    config.ensure_valid()?;
    info!(
        profile = ?config.profile,
        model = %config.model_id,
        api = %config.inference_api,
        "Configuration loaded"
    );
    Ok(config)
}

pub async fn sdk_config(config: &GeoVisionConfig) -> SdkConfig {
    load_sdk_config(config.region.as_deref()).await
}

pub fn inference_provider(api: InferenceApi, sdk: &SdkConfig) -> Arc<dyn InferenceProvider> {
    match api {
        InferenceApi::Converse => Arc::new(BedrockConverseProvider::new(sdk)),
        InferenceApi::Messages => Arc::new(BedrockMessagesProvider::new(sdk)),
    }
}

pub fn caption_settings(config: &GeoVisionConfig) -> CaptionSettings {
    let mut settings = CaptionSettings::new(&config.model_id);
    settings.prompt = config.caption_prompt.clone();
    settings.max_tokens = config.max_tokens;
    settings.temperature = config.temperature;
    if let Some(key) = &config.caption_template_key {
        settings = settings.with_template(TemplateLocation {
            bucket: config.caption_template_bucket.clone(),
            key: key.clone(),
        });
    }
    settings
}

pub fn analyzer_settings(config: &GeoVisionConfig) -> AnalyzerSettings {
    let mut settings = AnalyzerSettings::new(&config.bucket, &config.model_id);
    settings.max_tokens = config.max_tokens;
    settings.temperature = config.temperature;
    settings
}

pub fn caption_orchestrator(config: &GeoVisionConfig, sdk: &SdkConfig) -> CaptionOrchestrator {
    CaptionOrchestrator::new(
        Arc::new(S3ObjectStore::new(sdk)),
        inference_provider(config.inference_api, sdk),
        caption_settings(config),
    )
}

pub fn room_analyzer(config: &GeoVisionConfig, sdk: &SdkConfig) -> RoomAnalyzer {
    RoomAnalyzer::new(
        Arc::new(S3ObjectStore::new(sdk)),
        inference_provider(config.inference_api, sdk),
        analyzer_settings(config),
    )
}

pub fn upload_notifier(config: &GeoVisionConfig, sdk: &SdkConfig) -> GeoResult<UploadNotifier> {
    let topic = config
        .topic_arn
        .as_deref()
        .ok_or_else(|| GeoError::Config("TOPIC_ARN is not set".to_string()))?;
    Ok(UploadNotifier::new(Arc::new(SnsPublisher::new(sdk)), topic))
}
