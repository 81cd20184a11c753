//! Environment variable loading.
//!
//! Empty values count as unset. Variables are read through a lookup map so
//! tests never touch the process environment.

use std::collections::HashMap;
use std::str::FromStr;

use geovision_core::{GeoError, GeoResult};

use crate::defaults::profile_defaults;
use crate::schema::{GeoVisionConfig, Profile};

pub const MODEL_ID: &str = "MODEL_ID";
pub const INFERENCE_API: &str = "INFERENCE_API";
pub const AWS_REGION: &str = "AWS_REGION";
pub const BUCKET_NAME: &str = "BUCKET_NAME";
pub const TOPIC_ARN: &str = "TOPIC_ARN";
pub const CAPTION_PROMPT: &str = "CAPTION_PROMPT";
pub const CAPTION_TEMPLATE_KEY: &str = "CAPTION_TEMPLATE_KEY";
pub const CAPTION_TEMPLATE_BUCKET: &str = "CAPTION_TEMPLATE_BUCKET";
pub const MAX_TOKENS: &str = "MAX_TOKENS";
pub const TEMPERATURE: &str = "TEMPERATURE";
pub const LOG_LEVEL: &str = "LOG_LEVEL";
pub const LOG_FORMAT: &str = "LOG_FORMAT";

impl GeoVisionConfig {
    /// Load from the process environment.
    pub fn from_env(profile: Profile) -> GeoResult<Self> {
        Self::from_lookup(profile, &std::env::vars().collect())
    }

    /// Load from a provided map.
    pub fn from_lookup(profile: Profile, env: &HashMap<String, String>) -> GeoResult<Self> {
        let get = |name: &str| {
            env.get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let mut config = profile_defaults(profile);
        if let Some(model) = get(MODEL_ID) {
            config.model_id = model;
        }
        if let Some(api) = get(INFERENCE_API) {
            config.inference_api = api.parse()?;
        }
        if let Some(region) = get(AWS_REGION) {
            config.region = Some(region);
        }
        if let Some(bucket) = get(BUCKET_NAME) {
            config.bucket = bucket;
        }
        config.topic_arn = get(TOPIC_ARN);
        if let Some(prompt) = get(CAPTION_PROMPT) {
            config.caption_prompt = prompt;
        }
        config.caption_template_key = get(CAPTION_TEMPLATE_KEY);
        config.caption_template_bucket = get(CAPTION_TEMPLATE_BUCKET);
        if let Some(raw) = get(MAX_TOKENS) {
            config.max_tokens = parse_var(MAX_TOKENS, &raw)?;
        }
        if let Some(raw) = get(TEMPERATURE) {
            config.temperature = Some(parse_var(TEMPERATURE, &raw)?);
        }
        if let Some(level) = get(LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(format) = get(LOG_FORMAT) {
            config.log_format = format.parse()?;
        }
        Ok(config)
    }
}

fn parse_var<T>(name: &str, raw: &str) -> GeoResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| GeoError::Config(format!("{name}='{raw}' is invalid: {e}")))
}
