//! Serverless entry points for GeoVision.
//!
//! The binaries under `src/bin` are thin: they call [`app`] once at cold
//! start and hand every invocation to a function in [`handlers`].

pub mod app;
pub mod handlers;

pub use handlers::{handle_analyze, handle_caption, handle_notify};
