use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::debug;

use geovision_core::{GeoError, GeoResult, ObjectStore};

const SERVICE: &str = "s3";

/// Object storage backed by Amazon S3.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> GeoResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| GeoError::collaborator(SERVICE, DisplayErrorContext(e)))?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| GeoError::collaborator(SERVICE, format!("failed to read body: {e}")))?;

        let bytes = data.into_bytes();
        debug!(bucket, key, size = bytes.len(), "Fetched object");
        Ok(bytes)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> GeoResult<()> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| GeoError::collaborator(SERVICE, DisplayErrorContext(e)))?;

        debug!(bucket, key, size, content_type, "Stored object");
        Ok(())
    }

    async fn list_keys(&self, bucket: &str, prefix: &str) -> GeoResult<Vec<String>> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| GeoError::collaborator(SERVICE, DisplayErrorContext(e)))?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );
        }

        debug!(bucket, prefix, count = keys.len(), "Listed objects");
        Ok(keys)
    }
}
