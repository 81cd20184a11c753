//! Orchestration flows.
//!
//! Each flow takes its collaborators as `Arc<dyn …>` handles built once per
//! process, so tests can substitute the in-memory fakes.

pub mod analyzer;
pub mod caption;
pub mod notifier;
pub mod sections;
pub mod template;

pub use analyzer::{AnalyzerSettings, RoomAnalyzer};
pub use caption::{BatchReport, CaptionOrchestrator, CaptionOutcome, CaptionSettings, TemplateLocation};
pub use notifier::{NotifyReport, UploadNotifier};
pub use sections::{extract_sections, RoomSections};
pub use template::render_caption;
