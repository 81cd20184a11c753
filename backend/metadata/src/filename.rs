use chrono::NaiveDateTime;
use tracing::debug;

use geovision_core::{GeoError, GeoResult, ParsedKeyMetadata};
use geovision_media::strip_image_extension;

use crate::compass::compass;

/// Whole-second part of the capture time, e.g. `2025-06-17T135157` in
/// `2025-06-17T135157.758Z`.
const SECONDS_FORMAT: &str = "%Y-%m-%dT%H%M%S";

/// The fraction after the literal `.` carries 1 to 6 digits.
const MAX_FRACTION_DIGITS: usize = 6;

const DISPLAY_FORMAT: &str = "%B %d, %Y at %I:%M %p UTC";

const MIN_SEGMENTS: usize = 6;

/// Split `value` on a single `_`; any other count is an error.
fn split_pair<'a>(value: &'a str, key: &str, what: &str) -> GeoResult<(&'a str, &'a str)> {
    match value.split_once('_') {
        Some((left, right)) if !right.contains('_') => Ok((left, right)),
        _ => Err(GeoError::malformed_key(
            key,
            format!("{what} '{value}' must contain exactly one '_'"),
        )),
    }
}

/// Parse `YYYY-MM-DDTHHMMSS.ffffffZ`, requiring the dot and the `Z`.
fn parse_timestamp(raw: &str, key: &str) -> GeoResult<NaiveDateTime> {
    let invalid =
        |reason: &str| GeoError::malformed_key(key, format!("invalid timestamp '{raw}': {reason}"));

    let body = raw
        .strip_suffix('Z')
        .ok_or_else(|| invalid("missing trailing 'Z'"))?;
    let (whole, fraction) = body
        .split_once('.')
        .ok_or_else(|| invalid("missing fractional seconds"))?;
    if !(1..=MAX_FRACTION_DIGITS).contains(&fraction.len())
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid("fractional seconds must be 1 to 6 digits"));
    }

    NaiveDateTime::parse_from_str(whole, SECONDS_FORMAT).map_err(|e| invalid(&e.to_string()))
}

/// Parse an upload key of the form `app/user/project/date/lat_lon/timestamp_heading.ext`.
///
/// Latitude, longitude and date are passed through verbatim. The heading is a
/// bearing in degrees and becomes the compass orientation.
pub fn parse_key(key: &str) -> GeoResult<ParsedKeyMetadata> {
    let parts: Vec<&str> = key.split('/').collect();
    if parts.len() < MIN_SEGMENTS {
        return Err(GeoError::malformed_key(
            key,
            format!(
                "expected at least {MIN_SEGMENTS} '/'-separated segments, found {}",
                parts.len()
            ),
        ));
    }
    debug!(key, segments = parts.len(), "parsing upload key");

    let (latitude, longitude) = split_pair(parts[4], key, "coordinate segment")?;

    let stem = strip_image_extension(parts[5]);
    let (timestamp_str, heading_str) = split_pair(stem, key, "file name")?;

    let timestamp = parse_timestamp(timestamp_str, key)?;

    let heading: f64 = heading_str.parse().map_err(|_| {
        GeoError::malformed_key(key, format!("invalid heading '{heading_str}'"))
    })?;

    Ok(ParsedKeyMetadata {
        app: parts[0].to_string(),
        user: parts[1].to_string(),
        project: parts[2].to_string(),
        date: parts[3].to_string(),
        latitude: latitude.to_string(),
        longitude: longitude.to_string(),
        timestamp: timestamp.format(DISPLAY_FORMAT).to_string(),
        orientation: compass(heading),
    })
}
