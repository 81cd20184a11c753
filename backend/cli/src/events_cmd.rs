//! `normalize`: show which images a saved notification event would caption.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use geovision_core::ImageReference;
use geovision_events::normalize;

pub async fn read_event(path: &Path) -> Result<Value> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read event file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Event file {} is not valid JSON", path.display()))
}

pub async fn run(path: &Path) -> Result<Vec<ImageReference>> {
    let event = read_event(path).await?;
    Ok(normalize(&event).collect())
}
