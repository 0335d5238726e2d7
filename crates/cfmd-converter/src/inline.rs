//! Handlers for Confluence inline elements and task lists.

use std::fmt::Write;

use crate::default::indent_item;
use crate::dispatch::{RenderOutcome, Renderer};
use crate::dom::Element;
use crate::extract;
use crate::slug::slugify;

/// `ac:image`: attachment images point into the image folder, `ri:url` images stay remote.
pub fn render_image(
    renderer: &mut Renderer<'_>,
    element: &Element,
    out: &mut String,
) -> RenderOutcome {
    if let Some(file) = extract::attachment_filename(element) {
        write!(out, "![{file}]({}/{file})", renderer.image_folder).unwrap();
    } else if let Some(url) = element
        .find_tag("ri:url")
        .and_then(|url| url.non_empty_attr("ri:value"))
    {
        let alt = element.attr("ac:alt").unwrap_or_default();
        write!(out, "![{alt}]({url})").unwrap();
    } else {
        out.push_str("<!-- Image attachment not found -->");
    }
    RenderOutcome::Success
}

/// `ac:emoticon`: fallback glyph, then shortname, then `:name:`.
pub fn render_emoticon(_: &mut Renderer<'_>, element: &Element, out: &mut String) -> RenderOutcome {
    if let Some(fallback) = element.non_empty_attr("ac:emoji-fallback") {
        write!(out, "{fallback} ").unwrap();
    } else if let Some(shortname) = element.non_empty_attr("ac:emoji-shortname") {
        write!(out, "{shortname} ").unwrap();
    } else if let Some(name) = element.non_empty_attr("ac:name") {
        write!(out, ":{name}:").unwrap();
    } else {
        out.push_str(":emoji: ");
    }
    RenderOutcome::TryNext
}

/// `ac:link`: anchor links and user mentions. Page links fall through to their body text.
pub fn render_link(
    renderer: &mut Renderer<'_>,
    element: &Element,
    out: &mut String,
) -> RenderOutcome {
    if let Some(anchor) = element.attr("ac:anchor") {
        let text = element
            .find_tag("ac:plain-text-link-body")
            .map(Element::text_content)
            .unwrap_or_default();
        let text = text.trim();
        if !text.is_empty() {
            write!(out, "[{text}](#{})", slugify(anchor)).unwrap();
            return RenderOutcome::Success;
        }
    }
    let account_id = element
        .elements()
        .filter(|child| child.is("ri:user"))
        .find_map(|user| user.non_empty_attr("ri:account-id"));
    if let Some(account_id) = account_id {
        let mention = renderer.users.mention(account_id);
        if out.is_empty() || out.ends_with([' ', '\n']) {
            out.push_str(mention.trim_start());
        } else {
            out.push_str(&mention);
        }
    }
    RenderOutcome::TryNext
}

/// `ac:inline-comment-marker`: marked text followed by the comment reference.
pub fn render_inline_comment(
    renderer: &mut Renderer<'_>,
    element: &Element,
    out: &mut String,
) -> RenderOutcome {
    renderer.render_children(element, out);
    if let Some(reference) = element.non_empty_attr("ac:ref") {
        write!(out, "<!-- comment-ref: {reference} -->").unwrap();
    }
    RenderOutcome::Success
}

/// `ac:placeholder`: instructional text kept as a comment.
pub fn render_placeholder(
    _: &mut Renderer<'_>,
    element: &Element,
    out: &mut String,
) -> RenderOutcome {
    let text = element.text_content();
    let text = text.trim();
    if !text.is_empty() {
        write!(out, "<!-- {text} -->").unwrap();
    }
    RenderOutcome::Success
}

/// `time`: the `datetime` attribute, then the element content.
pub fn render_time(_: &mut Renderer<'_>, element: &Element, out: &mut String) -> RenderOutcome {
    if let Some(datetime) = element.non_empty_attr("datetime") {
        write!(out, "{datetime} ").unwrap();
    }
    RenderOutcome::TryNext
}

/// `ac:task-list` outside tables: a GitHub task list.
pub fn render_task_list(
    renderer: &mut Renderer<'_>,
    element: &Element,
    out: &mut String,
) -> RenderOutcome {
    let mut items = Vec::new();
    for task in element.elements().filter(|child| child.is("ac:task")) {
        let marker = if is_complete(task) { "- [x] " } else { "- [ ] " };
        let body = task
            .child("ac:task-body")
            .map(|body| renderer.children_to_string(body))
            .unwrap_or_default();
        items.push(indent_item(marker, body.trim()).trim_end().to_owned());
    }
    out.push_str(&items.join("\n"));
    RenderOutcome::Success
}

pub(crate) fn is_complete(task: &Element) -> bool {
    task.child("ac:task-status")
        .is_some_and(|status| status.text_content().trim() == "complete")
}
