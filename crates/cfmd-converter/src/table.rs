//! Table conversion with cell flattening.
//!
//! Markdown table cells hold a single line. Cells with block structure
//! (lists, several paragraphs, line breaks) are "complex" and flattened to
//! one line of inline HTML; simple cells go through the regular conversion.

use std::fmt::Write;

use crate::dispatch::{RenderOutcome, Renderer};
use crate::dom::{Element, Node, escape_text};
use crate::{inline, macros};

/// Elements that make a cell complex wherever they appear in it.
const COMPLEX_DESCENDANTS: &[&str] = &[
    "ul",
    "ol",
    "div",
    "blockquote",
    "pre",
    "table",
    "ac:task-list",
];

const BLOCK_CHILDREN: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6"];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Inline elements kept as HTML inside flattened cells.
const VERBATIM_INLINE: &[&str] = &["strong", "b", "em", "i", "code", "a"];

struct Row {
    cells: Vec<String>,
    header: bool,
}

/// Handler for `table`.
///
/// Tables without a `tbody` or without rows are left to the default conversion.
pub fn render_table(
    renderer: &mut Renderer<'_>,
    element: &Element,
    out: &mut String,
) -> RenderOutcome {
    if element.child("tbody").is_none() {
        return RenderOutcome::TryNext;
    }

    let mut rows = Vec::new();
    for child in element.elements() {
        match child.tag.as_str() {
            "thead" | "tbody" | "tfoot" => {
                for tr in child.elements().filter(|tr| tr.is("tr")) {
                    rows.extend(collect_row(renderer, tr));
                }
            }
            "tr" => rows.extend(collect_row(renderer, child)),
            _ => {}
        }
    }
    if rows.is_empty() {
        return RenderOutcome::TryNext;
    }

    let columns = rows.iter().map(|row| row.cells.len()).max().unwrap_or_default();
    let has_header_row = rows.iter().any(|row| row.header);
    for (index, row) in rows.iter_mut().enumerate() {
        row.cells.resize(columns, " ".to_owned());
        writeln!(out, "| {} |", row.cells.join(" | ")).unwrap();
        if index == 0 && (row.header || !has_header_row) {
            writeln!(out, "|{}", "---|".repeat(columns)).unwrap();
        }
    }
    RenderOutcome::Success
}

/// A row is a header row iff it has no data cell.
fn collect_row(renderer: &mut Renderer<'_>, tr: &Element) -> Option<Row> {
    let mut cells = Vec::new();
    let mut has_data_cell = false;
    for cell in tr.elements() {
        match cell.tag.as_str() {
            "td" => has_data_cell = true,
            "th" => {}
            _ => continue,
        }
        cells.push(render_cell(renderer, cell));
    }
    if cells.is_empty() {
        return None;
    }
    Some(Row {
        cells,
        header: !has_data_cell,
    })
}

fn render_cell(renderer: &mut Renderer<'_>, cell: &Element) -> String {
    let content = if is_complex(cell) {
        flatten_cell(renderer, cell)
    } else {
        let simple = render_simple_cell(renderer, cell);
        // Block macros and the like still produce several lines.
        if simple.contains('\n') {
            flatten_cell(renderer, cell)
        } else {
            simple
        }
    };
    if content.is_empty() || content == "&nbsp;" {
        return " ".to_owned();
    }
    escape_pipes(&content)
}

/// Escape `|` so it stays inside the cell.
///
/// Backslashes directly before a pipe are doubled first so they survive
/// as literal text instead of being read as the pipe's escape.
fn escape_pipes(content: &str) -> String {
    let mut escaped = String::with_capacity(content.len());
    let mut pending_backslashes = 0;
    for ch in content.chars() {
        match ch {
            '\\' => pending_backslashes += 1,
            '|' => {
                escaped.push_str(&"\\\\".repeat(pending_backslashes));
                escaped.push_str("\\|");
                pending_backslashes = 0;
            }
            _ => {
                escaped.push_str(&"\\".repeat(pending_backslashes));
                escaped.push(ch);
                pending_backslashes = 0;
            }
        }
    }
    escaped.push_str(&"\\".repeat(pending_backslashes));
    escaped
}

/// Returns `true` if the cell needs flattening.
pub fn is_complex(cell: &Element) -> bool {
    if cell.contains(&|element| COMPLEX_DESCENDANTS.contains(&element.tag.as_str())) {
        return true;
    }
    let mut block_children = 0;
    for child in cell.elements() {
        if child.is("br") {
            return true;
        }
        if BLOCK_CHILDREN.contains(&child.tag.as_str()) {
            block_children += 1;
            if block_children > 1 || child.find_tag("br").is_some() {
                return true;
            }
        }
    }
    false
}

/// Only the first non-blank child of a simple cell is rendered.
fn render_simple_cell(renderer: &mut Renderer<'_>, cell: &Element) -> String {
    let Some(first) = cell.children.iter().find(|child| !child.is_blank_text()) else {
        return String::new();
    };
    let mut buf = String::new();
    renderer.render_node(first, &mut buf);
    buf.trim().to_owned()
}

/// Flatten a cell to one line of inline HTML.
pub fn flatten_cell(renderer: &mut Renderer<'_>, cell: &Element) -> String {
    let mut buf = String::new();
    flatten_children(renderer, cell, &mut buf);
    let buf = buf.replace('\n', " ").replace('\r', "");
    buf.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn flatten_children(renderer: &mut Renderer<'_>, element: &Element, out: &mut String) {
    let count = element.children.len();
    for (index, child) in element.children.iter().enumerate() {
        flatten_node(renderer, child, index + 1 < count, out);
    }
}

fn flatten_node(
    renderer: &mut Renderer<'_>,
    node: &Node,
    has_next_sibling: bool,
    out: &mut String,
) {
    let element = match node {
        Node::Text(text) => {
            out.push_str(&escape_text(text));
            return;
        }
        Node::Element(element) => element,
    };
    let tag = element.tag.as_str();
    if HEADINGS.contains(&tag) {
        out.push_str("<strong>");
        flatten_children(renderer, element, out);
        out.push_str("</strong>");
        return;
    }
    if VERBATIM_INLINE.contains(&tag) {
        out.push_str(&element.to_html());
        return;
    }
    match tag {
        "br" => out.push_str("<br>"),
        "p" => {
            if !element.children.is_empty() {
                flatten_children(renderer, element, out);
                if has_next_sibling {
                    out.push(' ');
                }
            }
        }
        "ul" => flatten_list(renderer, element, false, 0, out),
        "ol" => flatten_list(renderer, element, true, 0, out),
        "ac:task-list" => flatten_task_list(renderer, element, out),
        "ac:structured-macro" => {
            macros::render_macro(renderer, element, out);
        }
        "ac:emoticon" => {
            inline::render_emoticon(renderer, element, out);
            flatten_children(renderer, element, out);
        }
        "ac:link" => {
            if inline::render_link(renderer, element, out) == RenderOutcome::TryNext {
                flatten_children(renderer, element, out);
            }
        }
        "time" => {
            inline::render_time(renderer, element, out);
            flatten_children(renderer, element, out);
        }
        "ac:image" => {
            inline::render_image(renderer, element, out);
        }
        "ac:inline-comment-marker" => {
            inline::render_inline_comment(renderer, element, out);
        }
        "ac:placeholder" => {
            inline::render_placeholder(renderer, element, out);
        }
        "ac:parameter" | "ac:task-id" | "ac:task-status" => {}
        _ => flatten_children(renderer, element, out),
    }
}

fn flatten_list(
    renderer: &mut Renderer<'_>,
    list: &Element,
    ordered: bool,
    depth: usize,
    out: &mut String,
) {
    out.push_str("<br>");
    for (index, item) in list.elements().filter(|child| child.is("li")).enumerate() {
        out.push_str(&"&nbsp;&nbsp;".repeat(depth));
        if ordered {
            write!(out, "{}. ", index + 1).unwrap();
        } else {
            out.push_str("• ");
        }
        flatten_list_item(renderer, item, depth, out);
        out.push_str("<br>");
    }
}

/// Nested lists inside an item are indented one level deeper.
fn flatten_list_item(renderer: &mut Renderer<'_>, item: &Element, depth: usize, out: &mut String) {
    for child in &item.children {
        match child {
            Node::Element(list) if list.is("ul") => flatten_list(renderer, list, false, depth + 1, out),
            Node::Element(list) if list.is("ol") => flatten_list(renderer, list, true, depth + 1, out),
            Node::Element(paragraph) if paragraph.is("p") => {
                flatten_children(renderer, paragraph, out);
            }
            _ => flatten_node(renderer, child, false, out),
        }
    }
}

fn flatten_task_list(renderer: &mut Renderer<'_>, list: &Element, out: &mut String) {
    out.push_str("<br>");
    for task in list.elements().filter(|child| child.is("ac:task")) {
        out.push_str(if inline::is_complete(task) { "☑ " } else { "☐ " });
        if let Some(body) = task.child("ac:task-body") {
            flatten_children(renderer, body, out);
        }
        out.push_str("<br>");
    }
}
