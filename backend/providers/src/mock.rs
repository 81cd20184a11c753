//! In-memory collaborators for tests and local dry runs.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;

use geovision_core::{
    GeoError, GeoResult, InferenceProvider, InferenceRequest, InferenceResponse, ObjectStore,
    Publisher,
};

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// An object held by [`MemoryObjectStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
}

impl StoredObject {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Object store over a sorted map, so listings come back in key order.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<(String, String), StoredObject>>,
    failing_gets: Mutex<HashSet<(String, String)>>,
    fail_listing: bool,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, bucket: &str, key: &str, body: impl Into<Bytes>) -> Self {
        self.insert(bucket, key, body, "application/octet-stream");
        self
    }

    /// Make every fetch of `bucket/key` fail, whether or not it exists.
    pub fn failing_get(self, bucket: &str, key: &str) -> Self {
        locked(&self.failing_gets).insert((bucket.to_string(), key.to_string()));
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn insert(&self, bucket: &str, key: &str, body: impl Into<Bytes>, content_type: &str) {
        locked(&self.objects).insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body: body.into(),
                content_type: content_type.to_string(),
            },
        );
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        locked(&self.objects)
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> GeoResult<Bytes> {
        let id = (bucket.to_string(), key.to_string());
        if locked(&self.failing_gets).contains(&id) {
            return Err(GeoError::collaborator("s3", format!("simulated failure for {bucket}/{key}")));
        }
        locked(&self.objects)
            .get(&id)
            .map(|object| object.body.clone())
            .ok_or_else(|| GeoError::collaborator("s3", format!("NoSuchKey: {bucket}/{key}")))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> GeoResult<()> {
        self.insert(bucket, key, body, content_type);
        Ok(())
    }

    async fn list_keys(&self, bucket: &str, prefix: &str) -> GeoResult<Vec<String>> {
        if self.fail_listing {
            return Err(GeoError::collaborator("s3", "simulated listing failure"));
        }
        Ok(locked(&self.objects)
            .keys()
            .filter(|(b, k)| b == bucket && k.starts_with(prefix))
            .map(|(_, k)| k.clone())
            .collect())
    }
}

/// A provider that returns a canned reply and records every request.
#[derive(Debug)]
pub struct MockProvider {
    name: String,
    fixed_response: Option<String>,
    failure: Option<String>,
    requests: Mutex<Vec<InferenceRequest>>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fixed_response: None,
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Some(response.into());
        self
    }

    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn requests(&self) -> Vec<InferenceRequest> {
        locked(&self.requests).clone()
    }
}

#[async_trait]
impl InferenceProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn converse(&self, request: &InferenceRequest) -> GeoResult<InferenceResponse> {
        locked(&self.requests).push(request.clone());
        if let Some(message) = &self.failure {
            return Err(GeoError::collaborator(self.name.clone(), message));
        }
        Ok(InferenceResponse {
            text: self
                .fixed_response
                .clone()
                .unwrap_or_else(|| "Mock response".to_string()),
            provider: self.name.clone(),
            model: request.model.clone(),
            input_tokens: 0,
            output_tokens: 0,
            latency_ms: 0,
        })
    }
}

/// A message captured by [`RecordingPublisher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub subject: String,
    pub message: String,
}

/// Publisher that records messages, optionally rejecting those containing a marker.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<PublishedMessage>>,
    reject_containing: Option<String>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(mut self, marker: impl Into<String>) -> Self {
        self.reject_containing = Some(marker.into());
        self
    }

    pub fn published(&self) -> Vec<PublishedMessage> {
        locked(&self.published).clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, topic: &str, subject: &str, message: &str) -> GeoResult<()> {
        if let Some(marker) = &self.reject_containing {
            if message.contains(marker.as_str()) {
                return Err(GeoError::collaborator("sns", "simulated publish failure"));
            }
        }
        locked(&self.published).push(PublishedMessage {
            topic: topic.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}
