//! HTTP proxy integration shapes for the analyzer endpoint.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use geovision_core::{GeoError, GeoResult};

/// Subset of the proxy request the analyzer reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequest {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl ApiRequest {
    /// The raw body text; an absent body reads as `{}`.
    pub fn body_text(&self) -> GeoResult<String> {
        let Some(body) = &self.body else {
            return Ok("{}".to_string());
        };
        if !self.is_base64_encoded {
            return Ok(body.clone());
        }
        let bytes = STANDARD
            .decode(body)
            .map_err(|e| GeoError::MalformedInput(format!("Invalid base64 body: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| GeoError::MalformedInput(format!("Body is not UTF-8: {e}")))
    }
}

/// Body of an analyze request: `{"folder": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub folder: Option<String>,
}

impl AnalyzeRequest {
    /// Parse the body and return the non-empty folder it names.
    pub fn folder_from(request: &ApiRequest) -> GeoResult<String> {
        let body = request.body_text()?;
        let parsed: AnalyzeRequest = serde_json::from_str(&body)
            .map_err(|_| GeoError::MalformedInput("Invalid JSON body".to_string()))?;
        match parsed.folder {
            Some(folder) if !folder.is_empty() => Ok(folder),
            _ => Err(GeoError::MalformedInput("Missing folder".to_string())),
        }
    }
}

/// Proxy response. Every response is JSON and CORS-permissive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ApiResponse {
    pub fn json(status_code: u16, body: &Value) -> Self {
        let headers = BTreeMap::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        ]);
        Self {
            status_code,
            headers,
            body: body.to_string(),
        }
    }

    pub fn ok(body: &Value) -> Self {
        Self::json(200, body)
    }

    /// Map an error to its status: bad input 400, missing data 404, anything else 500.
    pub fn from_error(err: &GeoError) -> Self {
        let status = match err {
            GeoError::MalformedInput(_) => 400,
            GeoError::NotFound(_) => 404,
            _ => 500,
        };
        Self::json(status, &json!({ "error": err.to_string() }))
    }
}
