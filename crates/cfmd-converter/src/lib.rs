//! Confluence storage format to Markdown conversion.
//!
//! The pipeline:
//!
//! 1. CDATA sections are rewritten to escaped `<pre data-cdata="true">` elements.
//! 2. The markup is parsed into a [`dom::Element`] tree with a lenient quick-xml parser.
//! 3. A [`Renderer`] walks the tree. Each element is dispatched through the
//!    handlers registered for its tag ([`Registry`]): macros, images, links,
//!    emoticons, task lists and tables have dedicated handlers, everything else
//!    falls back to a generic HTML to Markdown conversion.
//! 4. The output is normalized (blank lines, nested list spacing, page links).
//!
//! Attachment images are collected separately from the raw markup so callers
//! can download them.
//!
//! # Example
//!
//! ```
//! use cfmd_converter::{ConvertOptions, Converter};
//!
//! let converter = Converter::new(ConvertOptions::default());
//! let markdown = converter.convert_html(
//!     r#"<ac:structured-macro ac:name="info"><ac:rich-text-body><p>Read me</p></ac:rich-text-body></ac:structured-macro>"#,
//! );
//! assert_eq!(markdown, "> ℹ️ **Info:** Read me");
//! ```

mod cdata;
mod converter;
mod default;
mod dispatch;
mod document;
pub mod dom;
mod extract;
mod images;
mod inline;
mod macros;
mod normalize;
mod slug;
mod table;
mod users;

pub use converter::{ConvertOptions, ConvertedDocument, Converter, DEFAULT_IMAGE_FOLDER};
pub use dispatch::{HandlerFn, Priority, Registry, RenderOutcome, Renderer, TagKind};
pub use document::{AttachmentInfo, ConvertError, Document, UserRef};
pub use images::{ImageRef, extract_image_refs};
pub use macros::{Admonition, MacroKind};
pub use normalize::normalize;
pub use slug::slugify;
pub use users::{LookupError, UserCache, UserResolver};
