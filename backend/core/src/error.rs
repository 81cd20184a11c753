use thiserror::Error;

/// Top-level error type for the GeoVision functions.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Request body was not valid JSON or lacked a required field.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Object key does not follow `app/user/project/date/lat_lon/timestamp_heading.ext`.
    #[error("malformed key '{key}': {reason}")]
    MalformedKey { key: String, reason: String },

    #[error("not found: {0}")]
    NotFound(String),

    /// Any error surfaced by storage, inference, or messaging.
    #[error("{service} error: {message}")]
    Collaborator { service: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GeoError {
    pub fn malformed_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn collaborator(service: impl Into<String>, message: impl ToString) -> Self {
        Self::Collaborator {
            service: service.into(),
            message: message.to_string(),
        }
    }

    /// Short machine-readable kind, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "malformed_input",
            Self::MalformedKey { .. } => "malformed_key",
            Self::NotFound(_) => "not_found",
            Self::Collaborator { .. } => "collaborator_failure",
            Self::Config(_) => "config",
            Self::Other(_) => "other",
        }
    }
}

impl From<serde_json::Error> for GeoError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedInput(err.to_string())
    }
}

pub type GeoResult<T> = Result<T, GeoError>;
