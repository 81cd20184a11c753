//! `geovision-config`: runtime configuration for the GeoVision functions.
//!
//! Provides:
//! - Typed config with per-function defaults ([`Profile`])
//! - Environment loading with an injectable lookup map
//! - Validation reports with field-level messages

pub mod defaults;
pub mod env;
pub mod schema;
pub mod validation;

pub use defaults::profile_defaults;
pub use schema::{GeoVisionConfig, InferenceApi, LogFormat, Profile};
pub use validation::{validate, ConfigValidationError, ValidationReport};
