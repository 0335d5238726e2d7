//! Generic HTML to Markdown conversion.
//!
//! Used for every element without a registered handler, and after handlers
//! that return [`RenderOutcome::TryNext`](crate::dispatch::RenderOutcome).
//! Markdown metacharacters in text are not escaped.

use std::fmt::Write;

use crate::dispatch::Renderer;
use crate::dom::Element;

/// Elements whose content never reaches the output.
const SKIPPED: &[&str] = &[
    "ac:parameter",
    "ac:task-id",
    "ac:task-status",
    "script",
    "style",
    "head",
    "title",
];

/// Containers rendered as their children, separated from siblings by a blank line.
const BLOCK_CONTAINERS: &[&str] = &[
    "p",
    "div",
    "section",
    "article",
    "ac:layout",
    "ac:layout-section",
    "ac:layout-cell",
];

pub fn render_element(renderer: &mut Renderer<'_>, element: &Element, out: &mut String) {
    let tag = element.tag.as_str();
    if SKIPPED.contains(&tag) {
        return;
    }
    if BLOCK_CONTAINERS.contains(&tag) {
        ensure_blank_line(out);
        renderer.render_children(element, out);
        ensure_blank_line(out);
        return;
    }
    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => render_heading(renderer, element, out),
        "strong" | "b" => render_emphasis(renderer, element, "**", out),
        "em" | "i" => render_emphasis(renderer, element, "*", out),
        "s" | "del" | "strike" => render_emphasis(renderer, element, "~~", out),
        "code" | "tt" => render_inline_code(element, out),
        "a" => render_anchor(renderer, element, out),
        "img" => render_img(element, out),
        "br" => render_line_break(out),
        "hr" => {
            ensure_blank_line(out);
            out.push_str("* * *");
            ensure_blank_line(out);
        }
        "ul" => render_list(renderer, element, false, out),
        "ol" => render_list(renderer, element, true, out),
        "blockquote" => render_blockquote(renderer, element, out),
        "pre" => render_pre(element, out),
        "tr" => render_table_row(renderer, element, out),
        "ac:plain-text-link-body" => render_text(&element.text_content(), out),
        _ => renderer.render_children(element, out),
    }
}

/// Append text with whitespace runs collapsed to one space.
pub fn render_text(text: &str, out: &mut String) {
    let collapsed = collapse_whitespace(text);
    if collapsed.is_empty() {
        return;
    }
    if ends_with_whitespace(out) {
        out.push_str(collapsed.trim_start_matches(' '));
    } else {
        out.push_str(&collapsed);
    }
}

/// Close the current block: trailing whitespace is dropped and a blank line added.
///
/// Does nothing at the start of a buffer, so nested blocks never start with blank lines.
pub fn ensure_blank_line(out: &mut String) {
    let len = out.trim_end_matches([' ', '\t', '\r', '\n']).len();
    out.truncate(len);
    if !out.is_empty() {
        out.push_str("\n\n");
    }
}

/// Fenced code block. The fence grows past the longest backtick run in `code`.
pub fn fenced_block(language: &str, code: &str) -> String {
    let longest = code
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or_default();
    let fence = "`".repeat(longest.max(2) + 1);
    format!("{fence}{language}\n{code}\n{fence}")
}

/// Prefix every line with `> `. Blank lines become a bare `>`.
pub fn quote_lines(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                ">".to_owned()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if matches!(c, ' ' | '\t' | '\n' | '\r') {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn ends_with_whitespace(out: &str) -> bool {
    out.ends_with([' ', '\n'])
}

fn render_heading(renderer: &mut Renderer<'_>, element: &Element, out: &mut String) {
    let level = element.tag[1..].parse::<usize>().unwrap_or(1);
    let content = renderer.children_to_string(element);
    let content = content.replace('\n', " ");
    let content = content.trim();
    if content.is_empty() {
        return;
    }
    ensure_blank_line(out);
    write!(out, "{} {content}", "#".repeat(level)).unwrap();
    ensure_blank_line(out);
}

fn render_emphasis(renderer: &mut Renderer<'_>, element: &Element, marker: &str, out: &mut String) {
    let inner = renderer.children_to_string(element);
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        render_text(&inner, out);
        return;
    }
    if inner.starts_with(char::is_whitespace) && !out.is_empty() && !ends_with_whitespace(out) {
        out.push(' ');
    }
    write!(out, "{marker}{trimmed}{marker}").unwrap();
    if inner.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

fn render_inline_code(element: &Element, out: &mut String) {
    let code = collapse_whitespace(&element.text_content());
    if code.trim().is_empty() {
        return;
    }
    if code.contains('`') {
        write!(out, "`` {code} ``").unwrap();
    } else {
        write!(out, "`{code}`").unwrap();
    }
}

fn render_anchor(renderer: &mut Renderer<'_>, element: &Element, out: &mut String) {
    let href = element.attr("href").unwrap_or_default().trim();
    let text = renderer.children_to_string(element);
    let text = text.replace('\n', " ");
    let text = text.trim();
    if href.is_empty() {
        render_text(text, out);
        return;
    }
    let text = if text.is_empty() { href } else { text };
    write!(out, "[{text}]({})", href.replace(' ', "%20")).unwrap();
}

fn render_img(element: &Element, out: &mut String) {
    let Some(src) = element.non_empty_attr("src") else {
        return;
    };
    let alt = element.attr("alt").unwrap_or_default();
    write!(out, "![{alt}]({})", src.replace(' ', "%20")).unwrap();
}

fn render_line_break(out: &mut String) {
    let len = out.trim_end_matches(' ').len();
    out.truncate(len);
    if out.is_empty() || out.ends_with('\n') {
        return;
    }
    out.push_str("  \n");
}

fn render_list(renderer: &mut Renderer<'_>, element: &Element, ordered: bool, out: &mut String) {
    let start = element
        .attr("start")
        .and_then(|start| start.trim().parse::<usize>().ok())
        .unwrap_or(1);
    let mut items: Vec<String> = Vec::new();
    for child in element.elements() {
        if child.is("li") {
            let marker = if ordered {
                format!("{}. ", start + items.len())
            } else {
                "- ".to_owned()
            };
            let content = renderer.children_to_string(child);
            items.push(indent_item(&marker, content.trim()));
        } else {
            // Lists nested directly in a list belong to the preceding item.
            let content = {
                let mut buf = String::new();
                renderer.render_element(child, &mut buf);
                buf
            };
            let content = content.trim();
            if content.is_empty() {
                continue;
            }
            match items.last_mut() {
                Some(last) => {
                    last.push_str("\n\n");
                    last.push_str(&indent_item("  ", content)[2..]);
                }
                None => items.push(content.to_owned()),
            }
        }
    }
    if items.is_empty() {
        return;
    }
    ensure_blank_line(out);
    out.push_str(&items.join("\n"));
    ensure_blank_line(out);
}

/// Prefix the first line with the marker and indent the rest by its width.
pub(crate) fn indent_item(marker: &str, content: &str) -> String {
    let padding = " ".repeat(marker.len());
    let mut item = String::from(marker);
    for (index, line) in content.lines().enumerate() {
        if index > 0 {
            item.push('\n');
            if !line.is_empty() {
                item.push_str(&padding);
            }
        }
        item.push_str(line);
    }
    item
}

fn render_blockquote(renderer: &mut Renderer<'_>, element: &Element, out: &mut String) {
    let content = renderer.children_to_string(element);
    let content = content.trim();
    if content.is_empty() {
        return;
    }
    ensure_blank_line(out);
    out.push_str(&quote_lines(content));
    ensure_blank_line(out);
}

fn render_pre(element: &Element, out: &mut String) {
    let code = element.text_content();
    let code = code.trim_matches(['\n', '\r']);
    let language = element
        .attr("class")
        .and_then(|class| {
            class
                .split_whitespace()
                .find_map(|name| name.strip_prefix("language-"))
        })
        .or_else(|| element.attr("data-language"))
        .unwrap_or_default();
    ensure_blank_line(out);
    out.push_str(&fenced_block(language, code));
    ensure_blank_line(out);
}

/// Rows of tables the table handler declined, one paragraph per row.
fn render_table_row(renderer: &mut Renderer<'_>, element: &Element, out: &mut String) {
    let cells: Vec<String> = element
        .elements()
        .map(|cell| {
            let content = renderer.children_to_string(cell);
            content.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .filter(|cell| !cell.is_empty())
        .collect();
    if cells.is_empty() {
        return;
    }
    ensure_blank_line(out);
    out.push_str(&cells.join(" "));
    ensure_blank_line(out);
}
