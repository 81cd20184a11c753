//! `caption` and `analyze`: run a flow once against the live services.

use anyhow::Result;
use serde_json::{json, Value};
use tracing::info;

use geovision_config::{GeoVisionConfig, LogFormat, Profile};
use geovision_core::ImageReference;
use geovision_functions::app;
use geovision_logging::init_logger;

/// Load config for `profile` with console logging.
pub fn load_config(profile: Profile, verbose: bool) -> Result<GeoVisionConfig> {
    let mut config = GeoVisionConfig::from_env(profile)?;
    config.log_format = LogFormat::Pretty;
    if verbose {
        config.log_level = "debug".to_string();
    }
    init_logger(&config.log_level, config.log_format);
    config.ensure_valid()?;
    Ok(config)
}

pub async fn caption(config: &GeoVisionConfig, bucket: &str, key: &str) -> Result<Value> {
    let sdk = app::sdk_config(config).await;
    let orchestrator = app::caption_orchestrator(config, &sdk);
    let outcome = orchestrator
        .caption(&ImageReference::new(bucket, key))
        .await?;
    info!(caption_key = %outcome.caption_key, "Caption stored");
    Ok(json!({
        "source": outcome.source.to_string(),
        "caption_key": outcome.caption_key,
        "text": outcome.text,
    }))
}

pub async fn analyze(config: &GeoVisionConfig, folder: &str) -> Result<Value> {
    let sdk = app::sdk_config(config).await;
    let analyzer = app::room_analyzer(config, &sdk);
    let analysis = analyzer.analyze(folder).await?;
    Ok(serde_json::to_value(analysis)?)
}
