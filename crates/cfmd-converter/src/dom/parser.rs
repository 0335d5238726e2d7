//! Lenient storage format parser built on quick-xml.
//!
//! Confluence storage format is almost XML: namespace prefixes are never
//! declared, HTML named entities appear everywhere and void elements such as
//! `<br>` are sometimes left open. The parser accepts all of that and never
//! fails. Markup it cannot tokenize is kept as literal text.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::warn;

use super::entities::{decode_entity, html_entity};
use super::node::{Element, Node};

/// HTML elements that never have children.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Parse storage format markup into a tree.
///
/// The returned root element has an empty tag and holds the top-level nodes.
pub fn parse(markup: &str) -> Element {
    let mut reader = Reader::from_str(markup);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut stack = vec![Element::default()];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let element = decode_element(&reader, &e);
                if VOID_ELEMENTS.contains(&element.tag.as_str()) {
                    push_node(&mut stack, Node::Element(element));
                } else {
                    stack.push(element);
                }
            }
            Ok(Event::Empty(e)) => {
                let element = decode_element(&reader, &e);
                push_node(&mut stack, Node::Element(element));
            }
            Ok(Event::Text(e)) => {
                let text = decode_bytes(&reader, &e);
                push_text(&mut stack, &text);
            }
            Ok(Event::GeneralRef(e)) => {
                let entity = decode_bytes(&reader, &e);
                push_text(&mut stack, &decode_entity(&entity));
            }
            Ok(Event::CData(e)) => {
                push_text(&mut stack, &String::from_utf8_lossy(&e));
            }
            Ok(Event::End(e)) => {
                let tag = decode_bytes(&reader, e.name().as_ref());
                // Stray end tags are ignored; a match closes everything opened after it.
                if let Some(index) = stack.iter().rposition(|open| open.tag == tag)
                    && index > 0
                {
                    close_to(&mut stack, index);
                }
            }
            Ok(Event::Eof) => break,
            Ok(Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_)) => {}
            Err(err) => {
                let position = usize::try_from(reader.error_position()).unwrap_or(markup.len());
                let rest = markup.get(position..).unwrap_or_default();
                warn!(error = %err, position, "Unparseable markup kept as text");
                push_text(&mut stack, rest);
                break;
            }
        }
    }

    close_to(&mut stack, 1);
    stack.pop().unwrap_or_default()
}

/// Pop and attach every open element at `index` or above.
fn close_to(stack: &mut Vec<Element>, index: usize) {
    while stack.len() > index.max(1) {
        if let Some(element) = stack.pop() {
            push_node(stack, Node::Element(element));
        }
    }
}

fn push_node(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

/// Append text, merging with a preceding text node.
fn push_text(stack: &mut [Element], text: &str) {
    if text.is_empty() {
        return;
    }
    let Some(parent) = stack.last_mut() else {
        return;
    };
    if let Some(Node::Text(last)) = parent.children.last_mut() {
        last.push_str(text);
    } else {
        parent.children.push(Node::Text(text.to_owned()));
    }
}

fn decode_element(reader: &Reader<&[u8]>, e: &BytesStart) -> Element {
    let mut element = Element::new(decode_bytes(reader, e.name().as_ref()));
    for attr in e.attributes().with_checks(false).flatten() {
        let key = decode_bytes(reader, attr.key.as_ref());
        let value = attr.unescape_value_with(html_entity).map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            Cow::into_owned,
        );
        element.attrs.push((key, value));
    }
    element
}

fn decode_bytes(reader: &Reader<&[u8]>, bytes: &[u8]) -> String {
    reader.decoder().decode(bytes).map_or_else(
        |_| String::from_utf8_lossy(bytes).into_owned(),
        Cow::into_owned,
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn element(node: &Node) -> &Element {
        node.as_element().unwrap()
    }

    #[test]
    fn test_parse_simple_element() {
        let root = parse("<p>Hello</p>");

        assert_eq!(root.children.len(), 1);
        let p = element(&root.children[0]);
        assert_eq!(p.tag, "p");
        assert_eq!(p.text_content(), "Hello");
    }

    #[test]
    fn test_parse_nested_elements_keep_order() {
        let root = parse("<p><strong>Bold</strong> text</p>");

        let p = element(&root.children[0]);
        assert_eq!(p.children.len(), 2);
        assert_eq!(element(&p.children[0]).tag, "strong");
        assert_eq!(p.children[1], Node::Text(" text".to_owned()));
    }

    #[test]
    fn test_parse_namespaced_tags_without_declarations() {
        let root = parse(
            r#"<ac:structured-macro ac:name="info"><ac:rich-text-body><p>x</p></ac:rich-text-body></ac:structured-macro>"#,
        );

        let mac = element(&root.children[0]);
        assert_eq!(mac.tag, "ac:structured-macro");
        assert_eq!(mac.attr("ac:name"), Some("info"));
        assert!(mac.child("ac:rich-text-body").is_some());
    }

    #[test]
    fn test_parse_html_entities() {
        let root = parse("<p>Hello&nbsp;World&mdash;Test &amp; more</p>");

        assert_eq!(
            root.text_content(),
            "Hello\u{00a0}World\u{2014}Test & more"
        );
    }

    #[test]
    fn test_parse_entities_in_attributes() {
        let root = parse(r#"<a title="a&nbsp;b &amp; c">x</a>"#);

        let a = element(&root.children[0]);
        assert_eq!(a.attr("title"), Some("a\u{00a0}b & c"));
    }

    #[test]
    fn test_unclosed_void_element() {
        let root = parse("<p>Before<br>After</p>");

        let p = element(&root.children[0]);
        assert_eq!(p.children.len(), 3);
        assert_eq!(element(&p.children[1]).tag, "br");
        assert_eq!(p.children[2], Node::Text("After".to_owned()));
    }

    #[test]
    fn test_mismatched_end_tag_closes_inner_elements() {
        let root = parse("<div><p>text</div><p>next</p>");

        assert_eq!(root.children.len(), 2);
        let div = element(&root.children[0]);
        assert_eq!(element(&div.children[0]).text_content(), "text");
    }

    #[test]
    fn test_stray_end_tag_ignored() {
        let root = parse("<p>a</span>b</p>");

        assert_eq!(root.children.len(), 1);
        assert_eq!(root.text_content(), "ab");
    }

    #[test]
    fn test_comments_dropped() {
        let root = parse("<p>a<!-- hidden -->b</p>");

        assert_eq!(root.text_content(), "ab");
    }

    #[test]
    fn test_unclosed_elements_attached_at_eof() {
        let root = parse("<ul><li>one<li>two");

        let ul = element(&root.children[0]);
        assert_eq!(ul.tag, "ul");
        assert_eq!(ul.text_content(), "onetwo");
    }

    #[test]
    fn test_cdata_kept_as_text() {
        let root = parse("<pre><![CDATA[a < b]]></pre>");

        assert_eq!(root.text_content(), "a < b");
    }
}
