//! Structured logging for GeoVision.
//!
//! Functions log one JSON object per line for the log collector; the CLI logs
//! human-readable lines to stderr.

pub mod logger;

pub use logger::init_logger;
