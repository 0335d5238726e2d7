//! Priority-ordered element dispatch.
//!
//! Handlers are registered per tag name. When an element is rendered, its
//! handlers run in priority order until one returns [`RenderOutcome::Success`].
//! If every handler returns [`RenderOutcome::TryNext`] (or none is
//! registered), the generic HTML conversion in [`crate::default`] runs.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::dom::{Element, Node};
use crate::users::UserCache;
use crate::{default, inline, macros, table};

/// Result of a handler invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The element is fully rendered.
    Success,
    /// Output (if any) is kept and the next handler runs.
    TryNext,
}

/// Structural kind of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Inline,
    /// Separated from surrounding content by a blank line.
    Block,
}

/// Handler priority. Lower values run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Priority(pub u16);

impl Priority {
    pub const EARLY: Self = Self(100);
    pub const STANDARD: Self = Self(500);
    pub const LATE: Self = Self(1000);
}

/// Element handler. Writes to the output buffer and reports whether dispatch is done.
pub type HandlerFn = fn(&mut Renderer<'_>, &Element, &mut String) -> RenderOutcome;

#[derive(Clone, Copy)]
struct Registration {
    kind: TagKind,
    priority: Priority,
    handler: HandlerFn,
}

/// Tag name to handler table.
#[derive(Default)]
pub struct Registry {
    handlers: HashMap<String, Vec<Registration>>,
}

impl Registry {
    /// Create an empty registry. Every element renders with the default conversion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with all Confluence storage format handlers.
    pub fn confluence() -> Self {
        let inline_handlers: [(&str, HandlerFn); 7] = [
            ("ac:structured-macro", macros::render_macro),
            ("ac:image", inline::render_image),
            ("ac:emoticon", inline::render_emoticon),
            ("ac:link", inline::render_link),
            ("ac:inline-comment-marker", inline::render_inline_comment),
            ("ac:placeholder", inline::render_placeholder),
            ("time", inline::render_time),
        ];

        let mut registry = Self::new();
        registry.register("table", TagKind::Block, table::render_table, Priority::EARLY);
        for (tag, handler) in inline_handlers {
            registry.register(tag, TagKind::Inline, handler, Priority::STANDARD);
        }
        registry.register(
            "ac:task-list",
            TagKind::Block,
            inline::render_task_list,
            Priority::STANDARD,
        );
        registry
    }

    /// Register a handler. Handlers with equal priority keep registration order.
    pub fn register(
        &mut self,
        tag: &str,
        kind: TagKind,
        handler: HandlerFn,
        priority: Priority,
    ) -> &mut Self {
        let registrations = self.handlers.entry(tag.to_owned()).or_default();
        registrations.push(Registration {
            kind,
            priority,
            handler,
        });
        registrations.sort_by_key(|registration| registration.priority);
        self
    }

    fn handlers_for(&self, tag: &str) -> &[Registration] {
        self.handlers.get(tag).map_or(&[], Vec::as_slice)
    }
}

pub(crate) static CONFLUENCE_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::confluence);

/// Per-conversion render state.
pub struct Renderer<'a> {
    registry: &'a Registry,
    pub(crate) image_folder: &'a str,
    pub(crate) base_url: Option<&'a str>,
    pub(crate) users: UserCache<'a>,
}

impl<'a> Renderer<'a> {
    pub fn new(
        registry: &'a Registry,
        image_folder: &'a str,
        base_url: Option<&'a str>,
        users: UserCache<'a>,
    ) -> Self {
        Self {
            registry,
            image_folder,
            base_url,
            users,
        }
    }

    /// Render a whole tree to raw (not yet normalized) Markdown.
    pub fn render_document(&mut self, root: &Element) -> String {
        let mut out = String::with_capacity(4096);
        self.render_children(root, &mut out);
        out
    }

    pub fn render_node(&mut self, node: &Node, out: &mut String) {
        match node {
            Node::Text(text) => default::render_text(text, out),
            Node::Element(element) => self.render_element(element, out),
        }
    }

    /// Dispatch an element through its registered handlers.
    pub fn render_element(&mut self, element: &Element, out: &mut String) {
        let registry = self.registry;
        for registration in registry.handlers_for(&element.tag) {
            if registration.kind == TagKind::Block {
                default::ensure_blank_line(out);
            }
            if (registration.handler)(self, element, out) == RenderOutcome::Success {
                if registration.kind == TagKind::Block {
                    default::ensure_blank_line(out);
                }
                return;
            }
        }
        default::render_element(self, element, out);
    }

    pub fn render_children(&mut self, element: &Element, out: &mut String) {
        for child in &element.children {
            self.render_node(child, out);
        }
    }

    /// Render an element's children into a fresh buffer.
    pub fn children_to_string(&mut self, element: &Element) -> String {
        let mut out = String::new();
        self.render_children(element, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dom::parse;

    fn render(registry: &Registry, markup: &str) -> String {
        let root = parse(markup);
        let mut renderer = Renderer::new(registry, "assets", None, UserCache::new(None));
        renderer.render_document(&root)
    }

    fn shout(_: &mut Renderer<'_>, element: &Element, out: &mut String) -> RenderOutcome {
        out.push_str(&element.text_content().to_uppercase());
        RenderOutcome::Success
    }

    fn prefix(_: &mut Renderer<'_>, _: &Element, out: &mut String) -> RenderOutcome {
        out.push_str(">>");
        RenderOutcome::TryNext
    }

    fn never(_: &mut Renderer<'_>, _: &Element, out: &mut String) -> RenderOutcome {
        out.push_str("unreachable");
        RenderOutcome::Success
    }

    #[test]
    fn test_unregistered_tag_uses_default() {
        let registry = Registry::new();

        assert_eq!(render(&registry, "<p>a <em>b</em></p>"), "a *b*\n\n");
    }

    #[test]
    fn test_success_stops_dispatch() {
        let mut registry = Registry::new();
        registry
            .register("x", TagKind::Inline, shout, Priority::STANDARD)
            .register("x", TagKind::Inline, never, Priority::LATE);

        assert_eq!(render(&registry, "<x>hi</x>"), "HI");
    }

    #[test]
    fn test_try_next_falls_through_to_default() {
        let mut registry = Registry::new();
        registry.register("x", TagKind::Inline, prefix, Priority::STANDARD);

        assert_eq!(render(&registry, "<x>hi</x>"), ">>hi");
    }

    #[test]
    fn test_priority_order_independent_of_registration_order() {
        let mut registry = Registry::new();
        registry
            .register("x", TagKind::Inline, shout, Priority::LATE)
            .register("x", TagKind::Inline, prefix, Priority::EARLY);

        assert_eq!(render(&registry, "<x>hi</x>"), ">>HI");
    }

    #[test]
    fn test_block_registration_separated_by_blank_line() {
        let mut registry = Registry::new();
        registry.register("x", TagKind::Block, shout, Priority::STANDARD);

        assert_eq!(render(&registry, "before<x>hi</x>after"), "before\n\nHI\n\nafter");
    }
}
