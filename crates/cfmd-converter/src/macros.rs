//! Structured macro rendering.
//!
//! Every `ac:structured-macro` is mapped to a [`MacroKind`] by its `ac:name`
//! attribute. Block macros (admonitions, code, diagrams, expand sections)
//! open and close their own blocks; the rest render inline.

use std::fmt::Write;

use tracing::debug;

use crate::default::{ensure_blank_line, fenced_block, quote_lines};
use crate::dispatch::{RenderOutcome, Renderer};
use crate::dom::{Element, Node};
use crate::extract;
use crate::slug::slugify;

/// Admonition flavours rendered as block quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admonition {
    Info,
    Warning,
    Note,
    Tip,
}

impl Admonition {
    fn prefix(self) -> &'static str {
        match self {
            Self::Info => "ℹ️ **Info:**",
            Self::Warning => "⚠️ **Warning:**",
            Self::Note => "📝 **Note:**",
            Self::Tip => "💡 **Tip:**",
        }
    }
}

/// Known macro kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroKind<'a> {
    Admonition(Admonition),
    /// `code` and `noformat`.
    Code,
    /// Mermaid diagram.
    Diagram,
    Expand,
    Details,
    Status,
    TableOfContents,
    Children,
    Jira,
    ViewFile,
    Anchor,
    Unsupported(&'a str),
}

impl<'a> MacroKind<'a> {
    pub fn from_name(name: &'a str) -> Self {
        match name {
            "info" => Self::Admonition(Admonition::Info),
            "warning" => Self::Admonition(Admonition::Warning),
            "note" => Self::Admonition(Admonition::Note),
            "tip" => Self::Admonition(Admonition::Tip),
            "code" | "noformat" => Self::Code,
            "mermaid-macro" | "mermaid" => Self::Diagram,
            "expand" => Self::Expand,
            "details" => Self::Details,
            "status" => Self::Status,
            "toc" => Self::TableOfContents,
            "children" => Self::Children,
            "jira" => Self::Jira,
            "view-file" => Self::ViewFile,
            "anchor" => Self::Anchor,
            other => Self::Unsupported(other),
        }
    }
}

/// Handler for `ac:structured-macro`.
pub fn render_macro(
    renderer: &mut Renderer<'_>,
    element: &Element,
    out: &mut String,
) -> RenderOutcome {
    let name = element.non_empty_attr("ac:name").unwrap_or("unknown");
    match MacroKind::from_name(name) {
        MacroKind::Admonition(kind) => {
            let content = render_rich_body(renderer, element);
            write_block(out, &admonition(kind, &content));
        }
        MacroKind::Code => {
            let language = extract::language(element).unwrap_or_default();
            let code = extract::plain_text_body(element).unwrap_or_default();
            write_block(out, &fenced_block(&language, &code));
        }
        MacroKind::Diagram => match extract::diagram_text(element) {
            Some(diagram) => write_block(out, &fenced_block("mermaid", &diagram)),
            None => write_block(out, "<!-- Empty mermaid macro -->"),
        },
        MacroKind::Expand | MacroKind::Details => {
            let content = render_rich_body(renderer, element);
            write_block(out, &content);
        }
        MacroKind::Status => out.push_str(&status(element)),
        MacroKind::TableOfContents => {
            write_block(out, "[toc]");
            // Parameters would leak through the default conversion.
            if !extract::has_parameters(element) {
                return RenderOutcome::TryNext;
            }
        }
        MacroKind::Children => write_block(out, "<!-- Child Pages -->"),
        MacroKind::Jira => out.push_str(&jira(element, renderer.base_url)),
        MacroKind::ViewFile => match extract::attachment_filename(element) {
            Some(file) => write!(out, "[{file}]({}/{file})", renderer.image_folder).unwrap(),
            None => out.push_str("<!-- file attachment not found -->"),
        },
        MacroKind::Anchor => {
            let slug = slugify(element.text_content().trim());
            if slug.is_empty() {
                out.push_str("<!-- anchor macro has no anchor -->");
            } else {
                write!(out, r#"<a name="{slug}"></a>"#).unwrap();
            }
        }
        MacroKind::Unsupported(name) => {
            debug!(name, "Unsupported macro");
            write!(out, "<!-- Unsupported macro: {name} -->").unwrap();
        }
    }
    RenderOutcome::Success
}

/// Convert the macro's rich text body.
///
/// Direct text is trimmed and empty paragraphs are skipped.
fn render_rich_body(renderer: &mut Renderer<'_>, element: &Element) -> String {
    let Some(body) = extract::rich_text_body(element) else {
        return String::new();
    };
    let mut buf = String::new();
    for child in &body.children {
        match child {
            Node::Text(text) => buf.push_str(text.trim()),
            Node::Element(child) if child.is("p") && child.children.is_empty() => {}
            Node::Element(child) => renderer.render_element(child, &mut buf),
        }
    }
    buf.trim().to_owned()
}

fn write_block(out: &mut String, block: &str) {
    if block.is_empty() {
        return;
    }
    ensure_blank_line(out);
    out.push_str(block);
    ensure_blank_line(out);
}

fn admonition(kind: Admonition, content: &str) -> String {
    let prefix = kind.prefix();
    if content.is_empty() {
        format!("> {prefix}")
    } else if content.contains('\n') {
        format!("> {prefix}\n{}", quote_lines(content))
    } else {
        format!("> {prefix} {content}")
    }
}

fn status(element: &Element) -> String {
    let Some(title) = extract::parameter(element, "title") else {
        return String::new();
    };
    let colour = extract::parameter(element, "colour").unwrap_or_default();
    let emoji = match colour.to_lowercase().as_str() {
        "red" => "🔴",
        "yellow" => "🟡",
        "green" => "🟢",
        "blue" => "🔵",
        "grey" | "gray" => "⚪",
        _ => return format!("**[{title}]**"),
    };
    format!("{emoji} **{title}**")
}

fn jira(element: &Element, base_url: Option<&str>) -> String {
    let Some(key) = extract::parameter(element, "key") else {
        return "<!-- Jira issue key not found -->".to_owned();
    };
    match base_url.filter(|base| !base.is_empty()) {
        Some(base) => {
            let jira_base = base.trim_end_matches('/').replacen("confluence", "jira", 1);
            format!("[{key}]({jira_base}/browse/{key})")
        }
        None => key,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cdata::preserve_cdata;
    use crate::dispatch::CONFLUENCE_REGISTRY;
    use crate::dom::parse;
    use crate::users::UserCache;

    fn render_with_base(markup: &str, base_url: Option<&str>) -> String {
        let root = parse(&preserve_cdata(markup));
        let mut renderer =
            Renderer::new(&CONFLUENCE_REGISTRY, "assets", base_url, UserCache::new(None));
        renderer.render_document(&root).trim().to_owned()
    }

    fn render(markup: &str) -> String {
        render_with_base(markup, None)
    }

    fn with_body(name: &str, body: &str) -> String {
        format!(
            r#"<ac:structured-macro ac:name="{name}"><ac:rich-text-body>{body}</ac:rich-text-body></ac:structured-macro>"#
        )
    }

    #[test]
    fn test_macro_kind_from_name() {
        assert_eq!(MacroKind::from_name("noformat"), MacroKind::Code);
        assert_eq!(MacroKind::from_name("mermaid"), MacroKind::Diagram);
        assert_eq!(
            MacroKind::from_name("gallery"),
            MacroKind::Unsupported("gallery")
        );
    }

    #[test]
    fn test_warning_single_line() {
        assert_eq!(
            render(&with_body("warning", "<p>Disk full</p>")),
            "> ⚠️ **Warning:** Disk full"
        );
    }

    #[test]
    fn test_info_multi_line() {
        assert_eq!(
            render(&with_body("info", "<p>First</p><p>Second</p>")),
            "> ℹ️ **Info:**\n> First\n>\n> Second"
        );
    }

    #[test]
    fn test_note_and_tip_empty_body() {
        assert_eq!(render(&with_body("note", "<p/>")), "> 📝 **Note:**");
        assert_eq!(
            render(r#"<ac:structured-macro ac:name="tip"/>"#),
            "> 💡 **Tip:**"
        );
    }

    #[test]
    fn test_admonition_separated_from_paragraphs() {
        assert_eq!(
            render(&format!("<p>Before</p>{}<p>After</p>", with_body("tip", "<p>x</p>"))),
            "Before\n\n> 💡 **Tip:** x\n\nAfter"
        );
    }

    #[test]
    fn test_code_macro_with_language() {
        let markup = "<ac:structured-macro ac:name=\"code\"><ac:parameter ac:name=\"language\">go</ac:parameter><ac:plain-text-body><![CDATA[if a < b {\n}]]></ac:plain-text-body></ac:structured-macro>";

        assert_eq!(render(markup), "```go\nif a < b {\n}\n```");
    }

    #[test]
    fn test_noformat_macro_untagged() {
        let markup = "<ac:structured-macro ac:name=\"noformat\"><ac:plain-text-body><![CDATA[raw <b>text</b>]]></ac:plain-text-body></ac:structured-macro>";

        assert_eq!(render(markup), "```\nraw <b>text</b>\n```");
    }

    #[test]
    fn test_mermaid_macro() {
        let markup = "<ac:structured-macro ac:name=\"mermaid-macro\"><ac:plain-text-body><![CDATA[\ngraph TD;\n  A-->B;\n]]></ac:plain-text-body></ac:structured-macro>";

        assert_eq!(render(markup), "```mermaid\ngraph TD;\n  A-->B;\n```");
    }

    #[test]
    fn test_empty_mermaid_macro() {
        let markup = "<ac:structured-macro ac:name=\"mermaid-macro\"><ac:plain-text-body><![CDATA[]]></ac:plain-text-body></ac:structured-macro>";

        assert_eq!(render(markup), "<!-- Empty mermaid macro -->");
    }

    #[test]
    fn test_expand_macro_unwrapped() {
        let markup = r#"<ac:structured-macro ac:name="expand"><ac:parameter ac:name="title">More</ac:parameter><ac:rich-text-body><p>Hidden <strong>text</strong></p></ac:rich-text-body></ac:structured-macro>"#;

        assert_eq!(render(markup), "Hidden **text**");
        assert_eq!(render(&with_body("details", "")), "");
    }

    #[test]
    fn test_status_macro() {
        let status = |params: &str| {
            render(&format!(
                r#"<p>State: <ac:structured-macro ac:name="status">{params}</ac:structured-macro></p>"#
            ))
        };

        assert_eq!(
            status(r#"<ac:parameter ac:name="title">Done</ac:parameter><ac:parameter ac:name="colour">Green</ac:parameter>"#),
            "State: 🟢 **Done**"
        );
        assert_eq!(
            status(r#"<ac:parameter ac:name="title">Done</ac:parameter><ac:parameter ac:name="colour">Purple</ac:parameter>"#),
            "State: **[Done]**"
        );
        assert_eq!(
            status(r#"<ac:parameter ac:name="title">Idle</ac:parameter>"#),
            "State: **[Idle]**"
        );
        assert_eq!(
            status(r#"<ac:parameter ac:name="colour">Grey</ac:parameter>"#),
            "State:"
        );
    }

    #[test]
    fn test_toc_macro() {
        assert_eq!(render(r#"<ac:structured-macro ac:name="toc"/>"#), "[toc]");
        assert_eq!(
            render(
                r#"<ac:structured-macro ac:name="toc"><ac:parameter ac:name="maxLevel">2</ac:parameter></ac:structured-macro>"#
            ),
            "[toc]"
        );
    }

    #[test]
    fn test_children_macro() {
        assert_eq!(
            render(r#"<ac:structured-macro ac:name="children"/>"#),
            "<!-- Child Pages -->"
        );
    }

    #[test]
    fn test_jira_macro() {
        let markup = r#"<ac:structured-macro ac:name="jira"><ac:parameter ac:name="key">PROJ-42</ac:parameter></ac:structured-macro>"#;

        assert_eq!(
            render_with_base(markup, Some("https://confluence.example.com/")),
            "[PROJ-42](https://jira.example.com/browse/PROJ-42)"
        );
        assert_eq!(render(markup), "PROJ-42");
        assert_eq!(
            render(r#"<ac:structured-macro ac:name="jira"/>"#),
            "<!-- Jira issue key not found -->"
        );
    }

    #[test]
    fn test_view_file_macro() {
        assert_eq!(
            render(
                r#"<ac:structured-macro ac:name="view-file"><ac:parameter ac:name="name"><ri:attachment ri:filename="spec.pdf"/></ac:parameter></ac:structured-macro>"#
            ),
            "[spec.pdf](assets/spec.pdf)"
        );
        assert_eq!(
            render(r#"<ac:structured-macro ac:name="view-file"/>"#),
            "<!-- file attachment not found -->"
        );
    }

    #[test]
    fn test_anchor_macro() {
        assert_eq!(
            render(
                r#"<ac:structured-macro ac:name="anchor"><ac:parameter ac:name="">Setup Steps</ac:parameter></ac:structured-macro>"#
            ),
            r#"<a name="setup-steps"></a>"#
        );
        assert_eq!(
            render(r#"<ac:structured-macro ac:name="anchor"/>"#),
            "<!-- anchor macro has no anchor -->"
        );
    }

    #[test]
    fn test_unsupported_macro_named() {
        assert_eq!(
            render(r#"<ac:structured-macro ac:name="gallery"><ac:parameter ac:name="x">1</ac:parameter></ac:structured-macro>"#),
            "<!-- Unsupported macro: gallery -->"
        );
        assert_eq!(
            render("<ac:structured-macro/>"),
            "<!-- Unsupported macro: unknown -->"
        );
    }
}
