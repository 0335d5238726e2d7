//! Conversion entry points.

use tracing::debug;

use crate::cdata::preserve_cdata;
use crate::dispatch::{CONFLUENCE_REGISTRY, Renderer};
use crate::document::{ConvertError, Document};
use crate::dom::parse;
use crate::images::{ImageRef, extract_image_refs};
use crate::normalize::normalize;
use crate::users::{UserCache, UserResolver};

/// Default folder for downloaded attachments, relative to the Markdown file.
pub const DEFAULT_IMAGE_FOLDER: &str = "assets";

/// Conversion options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Folder that image and file links point into.
    pub image_folder: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            image_folder: DEFAULT_IMAGE_FOLDER.to_owned(),
        }
    }
}

/// Result of converting a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedDocument {
    pub markdown: String,
    /// Attachment images referenced by the page, to be downloaded by the caller.
    pub images: Vec<ImageRef>,
}

/// Storage format to Markdown converter.
///
/// # Example
///
/// ```
/// use cfmd_converter::{ConvertOptions, Converter};
///
/// let converter = Converter::new(ConvertOptions::default());
/// let markdown = converter.convert_html("<h1>Hello</h1><p>World</p>");
/// assert_eq!(markdown, "# Hello\n\nWorld");
/// ```
pub struct Converter<'r> {
    options: ConvertOptions,
    resolver: Option<&'r dyn UserResolver>,
}

impl Converter<'static> {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            resolver: None,
        }
    }
}

impl<'r> Converter<'r> {
    /// Resolve user mentions missing from page metadata through `resolver`.
    pub fn with_user_resolver<'b>(self, resolver: &'b dyn UserResolver) -> Converter<'b> {
        Converter {
            options: self.options,
            resolver: Some(resolver),
        }
    }

    /// Convert raw storage format markup without page metadata.
    ///
    /// User mentions are never resolved and render as `@user(<id>)`.
    pub fn convert_html(&self, markup: &str) -> String {
        self.render(markup, None, UserCache::new(None))
    }

    /// Convert a page.
    ///
    /// Fails only if the page metadata is invalid.
    pub fn convert_document(
        &self,
        document: &Document,
        base_url: &str,
    ) -> Result<ConvertedDocument, ConvertError> {
        document.validate()?;

        let mut users = UserCache::new(self.resolver);
        for user in [&document.created_by, &document.updated_by].into_iter().flatten() {
            users.seed(&user.account_id, &user.display_name);
        }

        let markdown = self.render(&document.content, Some(base_url), users);
        let images = extract_image_refs(&document.content, &document.id, base_url);
        debug!(
            page_id = %document.id,
            bytes = markdown.len(),
            images = images.len(),
            "Converted page"
        );

        Ok(ConvertedDocument { markdown, images })
    }

    fn render(&self, markup: &str, base_url: Option<&str>, users: UserCache<'_>) -> String {
        let root = parse(&preserve_cdata(markup));
        let mut renderer = Renderer::new(
            &CONFLUENCE_REGISTRY,
            &self.options.image_folder,
            base_url,
            users,
        );
        normalize(&renderer.render_document(&root))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::document::UserRef;
    use crate::users::LookupError;

    struct CountingResolver {
        calls: Cell<usize>,
    }

    impl UserResolver for CountingResolver {
        fn display_name(&self, _: &str) -> Result<String, LookupError> {
            self.calls.set(self.calls.get() + 1);
            Ok("Resolved Person".to_owned())
        }
    }

    fn page(content: &str) -> Document {
        Document {
            id: "1001".to_owned(),
            title: "Runbook".to_owned(),
            space_key: "OPS".to_owned(),
            version: 3,
            content: content.to_owned(),
            created_by: Some(UserRef {
                account_id: "author".to_owned(),
                display_name: "Ada Author".to_owned(),
            }),
            ..Document::default()
        }
    }

    #[test]
    fn test_convert_html_full_page() {
        let converter = Converter::new(ConvertOptions::default());
        let markup = concat!(
            "<h2>Steps</h2>",
            "<ul><li>one<ul><li>nested</li></ul></li><li>two</li></ul>",
            r#"<ac:structured-macro ac:name="warning"><ac:rich-text-body><p>Disk full</p></ac:rich-text-body></ac:structured-macro>"#,
            "<p>See <a href=\"/wiki/spaces/OPS/pages/77/Other+Page\">other</a></p>",
            "<p/><p/><p/>",
        );

        assert_eq!(
            converter.convert_html(markup),
            "## Steps\n\n- one\n  - nested\n- two\n\n> ⚠️ **Warning:** Disk full\n\nSee [other](confluence://pageId/77)"
        );
    }

    #[test]
    fn test_convert_html_never_resolves_users() {
        let resolver = CountingResolver {
            calls: Cell::new(0),
        };
        let converter = Converter::new(ConvertOptions::default()).with_user_resolver(&resolver);

        let markdown =
            converter.convert_html(r#"<p><ac:link><ri:user ri:account-id="x1"/></ac:link></p>"#);
        assert_eq!(markdown, "@user(x1)");
        assert_eq!(resolver.calls.get(), 0);
    }

    #[test]
    fn test_convert_document_seeds_and_resolves_users() {
        let resolver = CountingResolver {
            calls: Cell::new(0),
        };
        let converter = Converter::new(ConvertOptions::default()).with_user_resolver(&resolver);
        let doc = page(concat!(
            r#"<p><ac:link><ri:user ri:account-id="author"/></ac:link>and"#,
            r#"<ac:link><ri:user ri:account-id="other"/></ac:link>and"#,
            r#"<ac:link><ri:user ri:account-id="other"/></ac:link></p>"#,
        ));

        let converted = converter.convert_document(&doc, "https://wiki.example.com").unwrap();
        assert_eq!(
            converted.markdown,
            "@Ada Author and @Resolved Person and @Resolved Person"
        );
        assert_eq!(resolver.calls.get(), 1);
    }

    #[test]
    fn test_convert_document_collects_images() {
        let converter = Converter::new(ConvertOptions {
            image_folder: "img".to_owned(),
        });
        let doc = page(r#"<p><ac:image><ri:attachment ri:filename="flow chart.png"/></ac:image></p>"#);

        let converted = converter.convert_document(&doc, "https://wiki.example.com/").unwrap();
        assert_eq!(converted.markdown, "![flow chart.png](img/flow chart.png)");
        assert_eq!(converted.images.len(), 1);
        assert_eq!(
            converted.images[0].original_url,
            "https://wiki.example.com/download/attachments/1001/flow+chart.png"
        );
    }

    #[test]
    fn test_convert_document_rejects_invalid_page() {
        let converter = Converter::new(ConvertOptions::default());
        let mut doc = page("<p>x</p>");
        doc.space_key.clear();

        assert_eq!(
            converter.convert_document(&doc, "https://w"),
            Err(ConvertError::EmptySpaceKey)
        );
    }

    #[test]
    fn test_unparseable_tail_kept_as_text() {
        let converter = Converter::new(ConvertOptions::default());

        let markdown = converter.convert_html("<p>ok</p><p>broken <");
        assert!(markdown.starts_with("ok"));
        assert!(markdown.contains("broken"));
    }
}
