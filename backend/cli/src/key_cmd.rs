//! `parse-key` and `compass`: offline metadata inspection.

use anyhow::Result;
use serde_json::{json, Value};

use geovision_metadata::{compass, parse_key};

pub fn parse_key_json(key: &str) -> Result<Value> {
    let metadata = parse_key(key)?;
    Ok(json!({
        "app": metadata.app,
        "user": metadata.user,
        "project": metadata.project,
        "date": metadata.date,
        "latitude": metadata.latitude,
        "longitude": metadata.longitude,
        "timestamp": metadata.timestamp,
        "orientation": metadata.orientation.to_string(),
    }))
}

pub fn compass_json(degrees: f64) -> Value {
    let label = compass(degrees);
    json!({
        "direction": label.direction.as_str(),
        "degrees": label.degrees,
        "label": label.to_string(),
    })
}
