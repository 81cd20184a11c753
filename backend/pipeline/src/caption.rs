use std::sync::Arc;

use bytes::Bytes;
use tracing::{error, info, instrument};

use geovision_core::{
    ContentBlock, GeoError, GeoResult, ImageReference, InferenceProvider, InferenceRequest,
    ObjectStore, ParsedKeyMetadata,
};
use geovision_media::{image_format_for, sibling_key};
use geovision_metadata::parse_key;

use crate::template::render_caption;

pub const DEFAULT_CAPTION_PROMPT: &str = "What do you see?";
pub const DEFAULT_CAPTION_MAX_TOKENS: u32 = 1000;
pub const CAPTION_CONTENT_TYPE: &str = "text/plain";

/// Where the caption template lives. `bucket: None` means the image's own bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLocation {
    pub bucket: Option<String>,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct CaptionSettings {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub template: Option<TemplateLocation>,
}

impl CaptionSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: DEFAULT_CAPTION_PROMPT.to_string(),
            max_tokens: DEFAULT_CAPTION_MAX_TOKENS,
            temperature: None,
            template: None,
        }
    }

    pub fn with_template(mut self, template: TemplateLocation) -> Self {
        self.template = Some(template);
        self
    }
}

/// A caption that was written back to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionOutcome {
    pub source: ImageReference,
    pub caption_key: String,
    pub text: String,
}

/// A reference that could not be captioned.
#[derive(Debug, Clone)]
pub struct FailedReference {
    pub reference: ImageReference,
    pub kind: &'static str,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub processed: Vec<CaptionOutcome>,
    pub failed: Vec<FailedReference>,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.processed.len() + self.failed.len()
    }
}

/// Describes images with a hosted model and stores each description next to its image.
pub struct CaptionOrchestrator {
    store: Arc<dyn ObjectStore>,
    provider: Arc<dyn InferenceProvider>,
    settings: CaptionSettings,
}

impl CaptionOrchestrator {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        provider: Arc<dyn InferenceProvider>,
        settings: CaptionSettings,
    ) -> Self {
        Self {
            store,
            provider,
            settings,
        }
    }

    /// Caption one image: fetch, describe, optionally template, store as `.txt`.
    pub async fn caption(&self, reference: &ImageReference) -> GeoResult<CaptionOutcome> {
        // A templated caption needs the key's metadata; fail before any paid call.
        let metadata = match &self.settings.template {
            Some(_) => Some(parse_key(&reference.key)?),
            None => None,
        };

        let bytes = self
            .store
            .get_object(&reference.bucket, &reference.key)
            .await?;

        let mut request = InferenceRequest::new(&self.settings.model, self.settings.max_tokens)
            .with_temperature(self.settings.temperature);
        request.push(ContentBlock::image(image_format_for(&reference.key), bytes));
        request.push(ContentBlock::text(&self.settings.prompt));

        let reply = self.provider.converse(&request).await?;
        info!(
            source = %reference,
            provider = %reply.provider,
            latency_ms = reply.latency_ms,
            output_tokens = reply.output_tokens,
            "Described image"
        );

        let text = match (&self.settings.template, &metadata) {
            (Some(location), Some(metadata)) => {
                self.apply_template(location, reference, &reply.text, metadata)
                    .await?
            }
            _ => reply.text,
        };

        let caption_key = sibling_key(&reference.key, "txt");
        self.store
            .put_object(
                &reference.bucket,
                &caption_key,
                Bytes::from(text.clone()),
                CAPTION_CONTENT_TYPE,
            )
            .await?;
        info!(bucket = %reference.bucket, key = %caption_key, "Wrote description");

        Ok(CaptionOutcome {
            source: reference.clone(),
            caption_key,
            text,
        })
    }

    async fn apply_template(
        &self,
        location: &TemplateLocation,
        reference: &ImageReference,
        description: &str,
        metadata: &ParsedKeyMetadata,
    ) -> GeoResult<String> {
        let bucket = location.bucket.as_deref().unwrap_or(&reference.bucket);
        let raw = self.store.get_object(bucket, &location.key).await?;
        let template = String::from_utf8(raw.to_vec()).map_err(|e| {
            GeoError::Config(format!(
                "caption template {bucket}/{} is not UTF-8: {e}",
                location.key
            ))
        })?;
        Ok(render_caption(&template, description, metadata))
    }

    /// Caption every reference in order. A failure is logged and recorded
    /// against its reference; later references are still attempted.
    #[instrument(skip_all, fields(provider = self.provider.name()))]
    pub async fn run_batch<I>(&self, references: I) -> BatchReport
    where
        I: IntoIterator<Item = ImageReference>,
    {
        let mut report = BatchReport::default();
        for reference in references {
            match self.caption(&reference).await {
                Ok(outcome) => report.processed.push(outcome),
                Err(e) => {
                    error!(
                        bucket = %reference.bucket,
                        key = %reference.key,
                        kind = e.kind(),
                        error = %e,
                        "Error processing image"
                    );
                    report.failed.push(FailedReference {
                        reference,
                        kind: e.kind(),
                        error: e.to_string(),
                    });
                }
            }
        }
        info!(
            processed = report.processed.len(),
            failed = report.failed.len(),
            "Caption batch finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geovision_core::ImageFormat;
    use geovision_providers::mock::{MemoryObjectStore, MockProvider};

    const KEY: &str = "app/user/proj/2025-06-17/41.9291_-71.4518/2025-06-17T135157.758Z_90.0.png";

    fn orchestrator(
        store: Arc<MemoryObjectStore>,
        provider: Arc<MockProvider>,
        settings: CaptionSettings,
    ) -> CaptionOrchestrator {
        CaptionOrchestrator::new(store, provider, settings)
    }

    #[tokio::test]
    async fn writes_sibling_text_object() {
        let store = Arc::new(MemoryObjectStore::new().with_object("photos", "trip/barn.JPG", "jpegbytes"));
        let provider = Arc::new(MockProvider::new("mock").with_response("A red barn."));
        let captioner = orchestrator(store.clone(), provider.clone(), CaptionSettings::new("haiku"));

        let outcome = captioner
            .caption(&ImageReference::new("photos", "trip/barn.JPG"))
            .await
            .unwrap();
        assert_eq!(outcome.caption_key, "trip/barn.txt");

        let stored = store.object("photos", "trip/barn.txt").unwrap();
        assert_eq!(stored.text(), "A red barn.");
        assert_eq!(stored.content_type, "text/plain");

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "haiku");
        assert_eq!(requests[0].max_tokens, 1000);
        assert_eq!(
            requests[0].content,
            vec![
                ContentBlock::image(ImageFormat::Jpeg, Bytes::from("jpegbytes")),
                ContentBlock::text("What do you see?"),
            ]
        );
    }

    #[tokio::test]
    async fn continues_after_fetch_failure() {
        let store = Arc::new(
            MemoryObjectStore::new()
                .with_object("b", "first.png", "1")
                .failing_get("b", "first.png")
                .with_object("b", "second.png", "2"),
        );
        let provider = Arc::new(MockProvider::new("mock").with_response("second image"));
        let captioner = orchestrator(store.clone(), provider, CaptionSettings::new("m"));

        let report = captioner
            .run_batch(vec![
                ImageReference::new("b", "first.png"),
                ImageReference::new("b", "second.png"),
            ])
            .await;

        assert_eq!(report.attempted(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].reference.key, "first.png");
        assert_eq!(report.failed[0].kind, "collaborator_failure");
        assert_eq!(report.processed[0].caption_key, "second.txt");
        assert!(store.object("b", "second.txt").is_some());
        assert!(store.object("b", "first.txt").is_none());
    }

    #[tokio::test]
    async fn inference_failure_writes_nothing() {
        let store = Arc::new(MemoryObjectStore::new().with_object("b", "a.png", "x"));
        let provider = Arc::new(MockProvider::new("mock").failing("ThrottlingException"));
        let captioner = orchestrator(store.clone(), provider, CaptionSettings::new("m"));

        let report = captioner.run_batch([ImageReference::new("b", "a.png")]).await;
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].error.contains("ThrottlingException"));
        assert!(store.object("b", "a.txt").is_none());
    }

    #[tokio::test]
    async fn applies_template_with_metadata() {
        let store = Arc::new(
            MemoryObjectStore::new()
                .with_object("photos", KEY, "png")
                .with_object("config", "templates/caption.txt", "{{orientation}} on {{date}}: {{description}}"),
        );
        let provider = Arc::new(MockProvider::new("mock").with_response("A field."));
        let settings = CaptionSettings::new("m").with_template(TemplateLocation {
            bucket: Some("config".into()),
            key: "templates/caption.txt".into(),
        });
        let captioner = orchestrator(store.clone(), provider, settings);

        let outcome = captioner.caption(&ImageReference::new("photos", KEY)).await.unwrap();
        assert_eq!(outcome.text, "East (90°) on 2025-06-17: A field.");
        let txt_key = KEY.replace(".png", ".txt");
        assert_eq!(store.object("photos", &txt_key).unwrap().text(), outcome.text);
    }

    #[tokio::test]
    async fn template_needs_well_formed_key() {
        let store = Arc::new(
            MemoryObjectStore::new()
                .with_object("b", "loose.png", "png")
                .with_object("b", "caption.tmpl", "{{description}}"),
        );
        let provider = Arc::new(MockProvider::new("mock"));
        let settings = CaptionSettings::new("m").with_template(TemplateLocation {
            bucket: None,
            key: "caption.tmpl".into(),
        });
        let captioner = orchestrator(store.clone(), provider.clone(), settings);

        let report = captioner.run_batch([ImageReference::new("b", "loose.png")]).await;
        assert_eq!(report.failed[0].kind, "malformed_key");
        assert!(provider.requests().is_empty());
        assert!(store.object("b", "loose.txt").is_none());
    }
}
