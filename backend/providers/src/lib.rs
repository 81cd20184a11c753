//! Collaborator implementations.
//!
//! Production implementations wrap the AWS SDK clients; [`mock`] holds the
//! in-memory fakes used by tests across the workspace.

pub mod anthropic;
pub mod bedrock;
pub mod mock;
pub mod s3;
pub mod sns;

pub use anthropic::BedrockMessagesProvider;
pub use bedrock::BedrockConverseProvider;
pub use s3::S3ObjectStore;
pub use sns::SnsPublisher;

use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Load shared SDK configuration from the environment, optionally pinning the region.
pub async fn load_sdk_config(region: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    loader.load().await
}
