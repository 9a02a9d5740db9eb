#![deny(missing_docs)]

//! # Reference Utilities
//!
//! Shared helpers for reading `$ref` targets.
//!
//! Only document-local references (`#/components/...`) are resolvable; these helpers never
//! fetch external documents.

use percent_encoding::percent_decode_str;

/// The `components` section a local reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentSection {
    /// `#/components/schemas`
    Schemas,
    /// `#/components/parameters`
    Parameters,
    /// `#/components/requestBodies`
    RequestBodies,
    /// `#/components/responses`
    Responses,
    /// `#/components/headers`
    Headers,
}

impl ComponentSection {
    /// The key of the section inside `components`.
    pub fn key(&self) -> &'static str {
        match self {
            ComponentSection::Schemas => "schemas",
            ComponentSection::Parameters => "parameters",
            ComponentSection::RequestBodies => "requestBodies",
            ComponentSection::Responses => "responses",
            ComponentSection::Headers => "headers",
        }
    }
}

/// Whether a reference targets another document (absolute URI or relative file).
pub(crate) fn is_external_ref(ref_str: &str) -> bool {
    !ref_str.is_empty() && !ref_str.starts_with('#')
}

/// Extracts a component name from a `$ref` if it points to `#/components/{section}/{name}`.
///
/// Returns `None` for external references and for pointers into other sections.
pub(crate) fn extract_component_name(ref_str: &str, section: ComponentSection) -> Option<String> {
    if is_external_ref(ref_str) {
        return None;
    }
    let pointer = ref_str.trim_start_matches('#').trim_start_matches('/');
    let segments: Vec<&str> = pointer.split('/').collect();

    if segments.len() != 3 {
        return None;
    }
    if segments[0] != "components" || segments[1] != section.key() {
        return None;
    }

    let name = decode_pointer_segment(segments[2]);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Resolves a discriminator mapping value to a schema component name.
///
/// Mapping values may be full references or bare component names.
pub(crate) fn mapping_target_name(value: &str) -> Option<String> {
    if value.starts_with('#') {
        extract_component_name(value, ComponentSection::Schemas)
    } else if value.contains('/') {
        None
    } else {
        Some(value.to_string())
    }
}

/// Decodes a JSON Pointer segment taken from a URI fragment.
///
/// Percent-decoding runs first, then `~1` and `~0` are unescaped (RFC 6901 §6).
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    percent_decode_str(segment)
        .decode_utf8_lossy()
        .replace("~1", "/")
        .replace("~0", "~")
}
