//! Attachment image references.

use std::sync::LazyLock;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;

use crate::dom::unescape;

static ATTACHMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<ri:attachment[^>]*ri:filename="([^"]+)""#).expect("invalid attachment regex")
});

/// Characters escaped in a query component: everything but unreserved characters.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// An attachment-backed image referenced by a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Download URL of the attachment.
    pub original_url: String,
    pub file_name: String,
    /// Filled in once the attachment is downloaded.
    pub content_type: Option<String>,
    /// Filled in once the attachment is downloaded.
    pub size: Option<u64>,
}

/// Collect attachment references from raw storage format markup.
///
/// One reference per `ri:attachment` occurrence, in document order, without
/// deduplication.
pub fn extract_image_refs(markup: &str, page_id: &str, base_url: &str) -> Vec<ImageRef> {
    let base_url = base_url.trim_end_matches('/');
    ATTACHMENT_PATTERN
        .captures_iter(markup)
        .filter_map(|caps| {
            let file_name = unescape(&caps[1]);
            if file_name.is_empty() {
                return None;
            }
            let encoded = query_escape(&file_name);
            Some(ImageRef {
                original_url: format!("{base_url}/download/attachments/{page_id}/{encoded}"),
                file_name,
                content_type: None,
                size: None,
            })
        })
        .collect()
}

/// Query-component escaping with `+` for spaces.
fn query_escape(value: &str) -> String {
    utf8_percent_encode(value, QUERY_COMPONENT)
        .to_string()
        .replace("%20", "+")
}
