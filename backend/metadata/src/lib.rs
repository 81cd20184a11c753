//! Deterministic metadata derived from upload keys.
//!
//! Keys follow `app/user/project/date/lat_lon/timestamp_heading.ext`, where the
//! heading is a compass bearing in degrees.

pub mod compass;
pub mod filename;

pub use compass::compass;
pub use filename::parse_key;
