//! Image extension rules shared by the caption, analyzer, and notifier flows.

pub mod mime_detect;

pub use mime_detect::{
    extension_of, has_extension, image_format_for, sibling_key,
    strip_image_extension, CAPTION_EXTENSIONS, ROOM_EXTENSIONS, UPLOAD_EXTENSIONS,
};
