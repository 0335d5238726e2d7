//! Read-only document tree for Confluence storage format.

use std::fmt::Write;

/// A node in the parsed document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Text leaf with entities already decoded.
    Text(String),
    /// Tagged element.
    Element(Element),
}

/// Tagged element with ordered attributes and children.
///
/// Tag and attribute names keep their namespace prefix (`ac:link`, `ri:filename`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Node {
    /// Returns the element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) => None,
        }
    }

    /// Returns `true` for text nodes containing only whitespace.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Get attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Get attribute value, treating empty values as missing.
    pub fn non_empty_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).filter(|value| !value.is_empty())
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    /// Iterate over direct element children.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// First direct element child with the given tag.
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.elements().find(|child| child.is(tag))
    }

    /// First descendant (depth-first, pre-order) matching the predicate.
    pub fn find(&self, predicate: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        for child in self.elements() {
            if predicate(child) {
                return Some(child);
            }
            if let Some(found) = child.find(predicate) {
                return Some(found);
            }
        }
        None
    }

    /// First descendant with the given tag.
    pub fn find_tag(&self, tag: &str) -> Option<&Element> {
        self.find(&|element| element.is(tag))
    }

    /// Returns `true` if any descendant matches the predicate.
    pub fn contains(&self, predicate: &dyn Fn(&Element) -> bool) -> bool {
        self.find(predicate).is_some()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Serialize the element back to markup, escaping text and attribute values.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        serialize_element(self, &mut out);
        out
    }
}

fn collect_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(child) => collect_text(child, out),
        }
    }
}

fn serialize_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    for (key, value) in &element.attrs {
        write!(out, r#" {key}="{}""#, escape_attr(value)).unwrap();
    }
    if element.children.is_empty() {
        out.push_str(" />");
        return;
    }
    out.push('>');
    for child in &element.children {
        match child {
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::Element(child) => serialize_element(child, out),
        }
    }
    write!(out, "</{}>", element.tag).unwrap();
}

/// Escape text content for inclusion in HTML.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape an attribute value for inclusion in a double-quoted attribute.
pub fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use crate::dom::parse;

    #[test]
    fn test_attr_lookup() {
        let root = parse(r#"<ri:attachment ri:filename="a.png" ri:version-at-save="1"/>"#);
        let attachment = root.child("ri:attachment").unwrap();

        assert_eq!(attachment.attr("ri:filename"), Some("a.png"));
        assert_eq!(attachment.attr("ri:missing"), None);
    }

    #[test]
    fn test_non_empty_attr() {
        let root = parse(r#"<ac:link ac:anchor=""/>"#);
        let link = root.child("ac:link").unwrap();

        assert_eq!(link.attr("ac:anchor"), Some(""));
        assert_eq!(link.non_empty_attr("ac:anchor"), None);
    }

    #[test]
    fn test_find_tag_depth_first() {
        let root = parse("<div><p><ul><li>deep</li></ul></p><ul><li>shallow</li></ul></div>");

        let ul = root.find_tag("ul").unwrap();
        assert_eq!(ul.text_content(), "deep");
    }

    #[test]
    fn test_text_content() {
        let root = parse("<p>Hello <strong>bold</strong> world</p>");

        assert_eq!(root.text_content(), "Hello bold world");
    }

    #[test]
    fn test_to_html_escapes() {
        let root = parse(r#"<a href="x?a=1&amp;b=&quot;2&quot;">1 &lt; 2</a>"#);
        let link = root.child("a").unwrap();

        assert_eq!(
            link.to_html(),
            r#"<a href="x?a=1&amp;b=&quot;2&quot;">1 &lt; 2</a>"#
        );
    }
}
