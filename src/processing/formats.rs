//! Source format selection and the fixed output format

use std::path::Path;

/// Extensions accepted as pipeline input.
///
/// Matching is case-sensitive: `photo.PNG` is skipped. This mirrors the
/// behavior batch consumers of this tool already depend on.
pub const SOURCE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Every output is re-encoded as JPEG regardless of the source format.
pub const OUTPUT_EXTENSION: &str = "jpg";

/// Check whether a path carries a supported source extension
pub fn is_supported_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Detect source format from file header (magic bytes)
///
/// Used for diagnostics when a decode fails: a file whose extension lies
/// about its content gets a clearer error message.
pub fn detect_format_from_header(data: &[u8]) -> Option<&'static str> {
    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("jpeg");
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("png");
    }

    None
}
