//! File name sanitizing

/// Characters Windows rejects in file names
pub const RESERVED_CHARS: [char; 8] = ['\\', '/', ':', '*', '"', '<', '>', '|'];

/// Strip characters that are not allowed in Windows file names
///
/// Suitable as a [`ManifestParser`](super::ManifestParser) sanitizer; the
/// parser never applies it on its own.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars().filter(|c| !RESERVED_CHARS.contains(c)).collect()
}
