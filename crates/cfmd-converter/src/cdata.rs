//! CDATA preservation pre-pass.
//!
//! Macro bodies such as code blocks arrive as CDATA sections. They are turned
//! into `<pre data-cdata="true">` elements with escaped text before parsing so
//! the literal body survives the tree walk unchanged.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::dom::escape_text;

static CDATA_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("invalid CDATA regex"));

/// Replace every CDATA section with an escaped `<pre data-cdata="true">` element.
pub fn preserve_cdata(markup: &str) -> String {
    CDATA_PATTERN
        .replace_all(markup, |caps: &Captures| {
            format!(r#"<pre data-cdata="true">{}</pre>"#, escape_text(&caps[1]))
        })
        .into_owned()
}
