pub mod auth;
pub mod entries;
pub mod export;
pub mod tags;

use url::form_urlencoded::byte_serialize;

/// Percent-encodes a value for use as a single path segment, so labels like
/// `c#` or `a/b` round-trip through `Path` extraction.
pub(crate) fn encode_segment(value: &str) -> String {
    // byte_serialize already escapes a literal `+`, so every `+` left is a space.
    byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// A tag label with its `/tags/...` link.
pub struct TagLink {
    pub label: String,
    pub href: String,
}

impl TagLink {
    pub fn new(label: String) -> Self {
        Self {
            href: format!("/tags/{}", encode_segment(&label)),
            label,
        }
    }
}
