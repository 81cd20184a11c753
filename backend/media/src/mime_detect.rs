//! Extension-based detection for stored objects.
//!
//! Object keys are `/`-separated; only the final segment carries an extension,
//! and a leading dot (`dir/.png`) is a hidden name, not an extension.

use std::path::Path;

use geovision_core::ImageFormat;

/// Extensions the caption flow will describe.
pub const CAPTION_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "webp"];

/// Extensions the upload notifier forwards downstream.
pub const UPLOAD_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Extensions the room analyzer bundles into a request.
pub const ROOM_EXTENSIONS: &[&str] = &["jpg", "png"];

fn raw_extension(key: &str) -> Option<&str> {
    let name = key.rsplit('/').next().unwrap_or(key);
    Path::new(name).extension().and_then(|e| e.to_str())
}

/// Lowercased extension of the key's final segment, without the dot.
pub fn extension_of(key: &str) -> Option<String> {
    raw_extension(key).map(|e| e.to_lowercase())
}

/// Whether the key's extension (case-insensitive) is in `allowed`.
pub fn has_extension(key: &str, allowed: &[&str]) -> bool {
    extension_of(key)
        .map(|ext| allowed.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Format tag to send with the image bytes.
///
/// The runtime only accepts jpeg/png/gif/webp; anything else is labelled jpeg.
pub fn image_format_for(key: &str) -> ImageFormat {
    match extension_of(key).as_deref() {
        Some("png") => ImageFormat::Png,
        Some("gif") => ImageFormat::Gif,
        Some("webp") => ImageFormat::Webp,
        _ => ImageFormat::Jpeg,
    }
}

/// Strip a trailing caption-allowed extension from a file name, if present.
pub fn strip_image_extension(name: &str) -> &str {
    match raw_extension(name) {
        Some(ext) if CAPTION_EXTENSIONS.contains(&ext.to_lowercase().as_str()) => {
            &name[..name.len() - ext.len() - 1]
        }
        _ => name,
    }
}

/// The same key with its extension replaced (or appended) by `new_ext`.
pub fn sibling_key(key: &str, new_ext: &str) -> String {
    let stem = match raw_extension(key) {
        Some(ext) => &key[..key.len() - ext.len() - 1],
        None => key,
    };
    format!("{stem}.{new_ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_only_from_last_segment() {
        assert_eq!(extension_of("trip.png/notes"), None);
        assert_eq!(extension_of("dir/.png"), None);
        assert_eq!(extension_of("a/b/photo.WebP").as_deref(), Some("webp"));
    }

    #[test]
    fn allow_lists_are_case_insensitive() {
        assert!(has_extension("x/y.TIFF", CAPTION_EXTENSIONS));
        assert!(!has_extension("x/y.tiff", UPLOAD_EXTENSIONS));
        assert!(!has_extension("x/y.jpeg", ROOM_EXTENSIONS));
        assert!(!has_extension("x/notes.txt", CAPTION_EXTENSIONS));
    }

    #[test]
    fn bmp_is_sent_as_jpeg() {
        assert_eq!(image_format_for("scan.bmp"), ImageFormat::Jpeg);
        assert_eq!(image_format_for("scan.PNG"), ImageFormat::Png);
    }

    #[test]
    fn strips_only_known_image_extensions() {
        assert_eq!(strip_image_extension("2025-06-17T135157.758Z_90.0.png"), "2025-06-17T135157.758Z_90.0");
        assert_eq!(strip_image_extension("2025-06-17T135157.758Z_90.0.JPG"), "2025-06-17T135157.758Z_90.0");
        // "0" is not an image extension, so nothing is removed
        assert_eq!(strip_image_extension("2025-06-17T135157.758Z_90.0"), "2025-06-17T135157.758Z_90.0");
    }

    #[test]
    fn sibling_key_replaces_extension() {
        assert_eq!(sibling_key("path/to/image.jpg", "txt"), "path/to/image.txt");
        assert_eq!(sibling_key("v1.2/image", "txt"), "v1.2/image.txt");
    }
}
