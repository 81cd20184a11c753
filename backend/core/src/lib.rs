pub mod error;
pub mod traits;
pub mod types;

pub use error::{GeoError, GeoResult};
pub use traits::{
    ContentBlock, InferenceProvider, InferenceRequest, InferenceResponse, ObjectStore, Publisher,
};
pub use types::{
    CompassLabel, Direction, ImageFormat, ImageReference, ParsedKeyMetadata, StructuredAnalysis,
};
