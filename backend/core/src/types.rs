use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageReference {
    pub bucket: String,
    pub key: String,
}

impl ImageReference {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// The eight compass points, clockwise from North in 45° steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    #[serde(rename = "North-East")]
    NorthEast,
    East,
    #[serde(rename = "South-East")]
    SouthEast,
    South,
    #[serde(rename = "South-West")]
    SouthWest,
    West,
    #[serde(rename = "North-West")]
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::North => "North",
            Self::NorthEast => "North-East",
            Self::East => "East",
            Self::SouthEast => "South-East",
            Self::South => "South",
            Self::SouthWest => "South-West",
            Self::West => "West",
            Self::NorthWest => "North-West",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compass point plus the rounded heading it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompassLabel {
    pub direction: Direction,
    /// Always in `0..360`.
    pub degrees: u16,
}

impl fmt::Display for CompassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}°)", self.direction, self.degrees)
    }
}

/// Metadata encoded in an upload key of the form
/// `app/user/project/date/lat_lon/timestamp_heading.ext`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedKeyMetadata {
    pub app: String,
    pub user: String,
    pub project: String,
    pub date: String,
    pub latitude: String,
    pub longitude: String,
    /// Human-readable capture time, e.g. `June 17, 2025 at 01:51 PM UTC`.
    pub timestamp: String,
    pub orientation: CompassLabel,
}

/// Result of a multi-image room analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAnalysis {
    pub room_layout: String,
    pub furniture_positions: String,
    pub feng_shui_advice: String,
    pub image_count: usize,
}

/// Image encodings accepted by the inference runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }
}
