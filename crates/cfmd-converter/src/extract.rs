//! Typed value extraction from macro and attachment subtrees.

use crate::dom::Element;

/// Value of a direct `ac:parameter` child, trimmed. Empty values count as missing.
pub fn parameter(element: &Element, name: &str) -> Option<String> {
    element
        .elements()
        .find(|child| child.is("ac:parameter") && child.attr("ac:name") == Some(name))
        .map(|param| param.text_content().trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Returns `true` if the element has any `ac:parameter` child.
pub fn has_parameters(element: &Element) -> bool {
    element.child("ac:parameter").is_some()
}

/// Code language of a code macro.
pub fn language(element: &Element) -> Option<String> {
    parameter(element, "language")
}

/// Literal body of a macro (`ac:plain-text-body`), with surrounding blank lines removed.
///
/// CDATA sections reach the tree as `<pre data-cdata="true">`, see [`crate::cdata`].
pub fn plain_text_body(element: &Element) -> Option<String> {
    let body = element.find_tag("ac:plain-text-body")?;
    let text = body
        .find(&|child| child.is("pre") && child.attr("data-cdata") == Some("true"))
        .map_or_else(|| body.text_content(), Element::text_content);
    Some(text.trim_start_matches(['\n', '\r']).trim_end().to_owned())
}

/// Diagram source of a diagram macro, fully trimmed.
pub fn diagram_text(element: &Element) -> Option<String> {
    plain_text_body(element)
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// Filename of the first `ri:attachment` in the subtree.
pub fn attachment_filename(element: &Element) -> Option<&str> {
    element
        .find_tag("ri:attachment")
        .and_then(|attachment| attachment.non_empty_attr("ri:filename"))
}

/// The element itself if it is a rich text body, otherwise its first rich text body descendant.
pub fn rich_text_body(element: &Element) -> Option<&Element> {
    if element.is("ac:rich-text-body") {
        return Some(element);
    }
    element.find_tag("ac:rich-text-body")
}
