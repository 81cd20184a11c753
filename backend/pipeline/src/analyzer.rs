use std::sync::Arc;

use tracing::{info, instrument};

use geovision_core::{
    ContentBlock, GeoError, GeoResult, InferenceProvider, InferenceRequest, ObjectStore,
    StructuredAnalysis,
};
use geovision_media::{has_extension, image_format_for, ROOM_EXTENSIONS};
use geovision_metadata::parse_key;

use crate::sections::{extract_sections, FENG_SHUI_TITLE, FURNITURE_TITLE, ROOM_LAYOUT_TITLE};

pub const ANALYZER_SYSTEM_PROMPT: &str =
    "You are a spatial reasoning assistant with Feng Shui expertise.";
pub const DEFAULT_ANALYZER_MAX_TOKENS: u32 = 800;
pub const DEFAULT_ANALYZER_TEMPERATURE: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    /// Bucket holding the room folders.
    pub bucket: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

impl AnalyzerSettings {
    pub fn new(bucket: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            model: model.into(),
            max_tokens: DEFAULT_ANALYZER_MAX_TOKENS,
            temperature: Some(DEFAULT_ANALYZER_TEMPERATURE),
        }
    }
}

/// Closing instruction appended after every image.
pub fn instruction_prompt(image_count: usize) -> String {
    format!(
        "You are a spatial reasoning expert with strong Feng Shui knowledge.\n\n\
         You are given {image_count} images of a room taken from different angles.\n\
         Each image includes a compass orientation.\n\n\
         Please:\n\
         1. Reconstruct the room layout as best you can.\n\
         2. Identify key furniture positions.\n\
         3. Recommend 3 Feng Shui improvements.\n\n\
         Answer in three sections headed exactly \"### {ROOM_LAYOUT_TITLE}\", \
         \"### {FURNITURE_TITLE}\" and \"### {FENG_SHUI_TITLE}\"."
    )
}

/// Reconstructs a room from every photo in a folder with one model call.
pub struct RoomAnalyzer {
    store: Arc<dyn ObjectStore>,
    provider: Arc<dyn InferenceProvider>,
    settings: AnalyzerSettings,
}

impl RoomAnalyzer {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        provider: Arc<dyn InferenceProvider>,
        settings: AnalyzerSettings,
    ) -> Self {
        Self {
            store,
            provider,
            settings,
        }
    }

    /// Keys of `.jpg`/`.png` objects under `folder/`, in listing order.
    pub async fn list_folder_images(&self, folder: &str) -> GeoResult<Vec<String>> {
        let prefix = format!("{folder}/");
        let keys = self.store.list_keys(&self.settings.bucket, &prefix).await?;
        Ok(keys
            .into_iter()
            .filter(|key| has_extension(key, ROOM_EXTENSIONS))
            .collect())
    }

    #[instrument(skip(self), fields(bucket = %self.settings.bucket))]
    pub async fn analyze(&self, folder: &str) -> GeoResult<StructuredAnalysis> {
        let keys = self.list_folder_images(folder).await?;
        if keys.is_empty() {
            return Err(GeoError::NotFound(format!(
                "No images found for folder {folder}"
            )));
        }
        info!(count = keys.len(), folder, "Found images for folder");

        // Every key must parse before any bytes are fetched.
        let oriented = keys
            .iter()
            .map(|key| parse_key(key).map(|meta| (key, meta.orientation)))
            .collect::<GeoResult<Vec<_>>>()?;

        let mut request = InferenceRequest::new(&self.settings.model, self.settings.max_tokens)
            .with_system_prompt(ANALYZER_SYSTEM_PROMPT)
            .with_temperature(self.settings.temperature);

        for (index, (key, orientation)) in oriented.iter().enumerate() {
            let bytes = self.store.get_object(&self.settings.bucket, key).await?;
            request.push(ContentBlock::image(image_format_for(key), bytes));
            request.push(ContentBlock::text(format!(
                "Image {} heading: {}",
                index + 1,
                orientation
            )));
        }
        request.push(ContentBlock::text(instruction_prompt(oriented.len())));

        let reply = self.provider.converse(&request).await?;
        info!(
            provider = %reply.provider,
            latency_ms = reply.latency_ms,
            input_tokens = reply.input_tokens,
            output_tokens = reply.output_tokens,
            "Room analysis complete"
        );

        let sections = extract_sections(&reply.text);
        Ok(StructuredAnalysis {
            room_layout: sections.room_layout,
            furniture_positions: sections.furniture_positions,
            feng_shui_advice: sections.feng_shui_advice,
            image_count: oriented.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use geovision_core::ImageFormat;
    use geovision_providers::mock::{MemoryObjectStore, MockProvider};

    const NORTH: &str = "zen/u1/den/2025-06-17/41.9_-71.4/2025-06-17T135157.758Z_0.0.jpg";
    const EAST: &str = "zen/u1/den/2025-06-17/41.9_-71.4/2025-06-17T135210.101Z_92.4.png";
    const REPLY: &str = "### Room Layout Reconstruction\nSquare room.\n\
                         ### Key Furniture Positions\nSofa by the north wall.\n\
                         ### Feng Shui Improvements\n1. Add a mirror.";

    fn analyzer(store: MemoryObjectStore, provider: Arc<MockProvider>) -> RoomAnalyzer {
        RoomAnalyzer::new(
            Arc::new(store),
            provider,
            AnalyzerSettings::new("azrius-data", "amazon.nova-lite-v1:0"),
        )
    }

    fn den() -> MemoryObjectStore {
        MemoryObjectStore::new()
            .with_object("azrius-data", NORTH, "north")
            .with_object("azrius-data", EAST, "east")
            .with_object("azrius-data", "zen/u1/den/notes.txt", "ignored")
            .with_object("azrius-data", "zen/u1/den-other/x.jpg", "other folder")
    }

    #[tokio::test]
    async fn bundles_every_image_into_one_request() {
        let provider = Arc::new(MockProvider::new("mock").with_response(REPLY));
        let analysis = analyzer(den(), provider.clone()).analyze("zen/u1/den").await.unwrap();

        assert_eq!(analysis.image_count, 2);
        assert_eq!(analysis.room_layout, "Square room.");
        assert_eq!(analysis.furniture_positions, "Sofa by the north wall.");
        assert_eq!(analysis.feng_shui_advice, "1. Add a mirror.");

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.system_prompt.as_deref(), Some(ANALYZER_SYSTEM_PROMPT));
        assert_eq!(request.max_tokens, 800);
        assert_eq!(request.temperature, Some(0.5));
        assert_eq!(request.content.len(), 5);
        assert_eq!(request.content[0], ContentBlock::image(ImageFormat::Jpeg, Bytes::from("north")));
        assert_eq!(request.content[1], ContentBlock::text("Image 1 heading: North (0°)"));
        assert_eq!(request.content[2], ContentBlock::image(ImageFormat::Png, Bytes::from("east")));
        assert_eq!(request.content[3], ContentBlock::text("Image 2 heading: East (92°)"));
        match &request.content[4] {
            ContentBlock::Text(text) => assert!(text.contains("given 2 images")),
            other => panic!("expected instruction text, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_folder_is_not_found() {
        let provider = Arc::new(MockProvider::new("mock"));
        let err = analyzer(den(), provider.clone()).analyze("zen/u2/attic").await.unwrap_err();
        assert!(matches!(err, GeoError::NotFound(_)));
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn malformed_key_fails_whole_request() {
        let store = den().with_object("azrius-data", "zen/u1/den/random.jpg", "x");
        let provider = Arc::new(MockProvider::new("mock").with_response(REPLY));
        let err = analyzer(store, provider.clone()).analyze("zen/u1/den").await.unwrap_err();
        assert!(matches!(err, GeoError::MalformedKey { .. }));
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn listing_failure_propagates() {
        let provider = Arc::new(MockProvider::new("mock"));
        let err = analyzer(den().failing_list(), provider).analyze("zen/u1/den").await.unwrap_err();
        assert!(matches!(err, GeoError::Collaborator { .. }));
    }

    #[tokio::test]
    async fn unstructured_reply_yields_empty_sections() {
        let provider = Arc::new(MockProvider::new("mock").with_response("I cannot see a room."));
        let analysis = analyzer(den(), provider).analyze("zen/u1/den").await.unwrap();
        assert_eq!(analysis.image_count, 2);
        assert!(analysis.room_layout.is_empty());
        assert!(analysis.feng_shui_advice.is_empty());
    }
}
