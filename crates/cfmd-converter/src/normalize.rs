//! Post-processing of rendered Markdown.

use std::sync::LazyLock;

use regex::Regex;

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("invalid newline regex"));

/// Blank line between a list item and a following item indented by two or more spaces.
static NESTED_LIST_GAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\n\s*(?:[-*+]\s|\d+\.\s)[^\n]*)\n\s*\n(\s{2,}(?:[-*+]\s|\d+\.\s))")
        .expect("invalid nested list regex")
});

static CONFLUENCE_PAGE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(/wiki/spaces/([^/]+)/pages/(\d+)/[^)]+\)")
        .expect("invalid page link regex")
});

/// Normalize rendered Markdown. Idempotent.
///
/// 1. Collapse runs of three or more newlines to one blank line.
/// 2. Remove blank lines between a list item and its nested items, to a fixed point.
/// 3. Rewrite `/wiki/spaces/<KEY>/pages/<ID>/<title>` links to `confluence://pageId/<ID>`.
/// 4. Trim.
pub fn normalize(markdown: &str) -> String {
    let markdown = EXCESS_NEWLINES.replace_all(markdown, "\n\n");
    let markdown = fix_nested_list_spacing(&markdown);
    let markdown = CONFLUENCE_PAGE_LINK.replace_all(&markdown, "[${1}](confluence://pageId/${3})");
    markdown.trim().to_owned()
}

fn fix_nested_list_spacing(markdown: &str) -> String {
    // Leading newline so a list at the very start is matched too.
    let mut current = format!("\n{markdown}");
    loop {
        let next = NESTED_LIST_GAP.replace_all(&current, "${1}\n${2}").into_owned();
        if next == current {
            break;
        }
        current = next;
    }
    current.split_off(1)
}
