//! Fixed-length document segmentation.

use crate::{Error, ErrorContext, Result};

/// Split `document` into consecutive slices of `segment_length` characters.
///
/// Lengths count Unicode scalar values, so multi-byte text is never cut
/// mid-character. The last segment may be shorter; an empty document yields
/// no segments.
pub fn split_document_by_length(document: &str, segment_length: usize) -> Result<Vec<String>> {
    if segment_length == 0 {
        return Err(Error::configuration_with_context(
            "segment length must be at least 1",
            ErrorContext::new()
                .with_field_path("segment_length")
                .with_source("segment"),
        ));
    }

    let mut segments = Vec::with_capacity(document.len() / segment_length + 1);
    let mut current = String::new();
    let mut count = 0;
    for ch in document.chars() {
        current.push(ch);
        count += 1;
        if count == segment_length {
            segments.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    Ok(segments)
}
