//! Inbound event shapes for the GeoVision functions.
//!
//! - [`envelope`]: storage notifications, optionally relayed through a topic
//! - [`normalizer`]: flattening envelopes into [`ImageReference`]s
//! - [`http`]: proxy request/response bodies for the analyzer endpoint
//!
//! [`ImageReference`]: geovision_core::ImageReference

pub mod envelope;
pub mod http;
pub mod normalizer;

pub use envelope::{
    decode_key, NotificationBatch, RelayMessage, RelayPayload, StorageRecord, UploadNotice,
};
pub use http::{AnalyzeRequest, ApiRequest, ApiResponse};
pub use normalizer::{normalize, upload_candidates, UploadCandidate};
