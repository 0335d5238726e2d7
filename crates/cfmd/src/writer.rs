//! Markdown file output.
//!
//! Converts a page, downloads its attachment images and writes the
//! Markdown file with optional YAML front matter.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use cfmd_config::OutputConfig;
use cfmd_confluence::{AttachmentContent, ConfluenceClient, ConfluenceError};
use cfmd_converter::{ConvertOptions, Converter, Document, ImageRef, UserResolver, slugify};

use crate::error::CliError;

/// Source of attachment bytes.
pub(crate) trait AttachmentSource {
    fn attachment(
        &self,
        document: &Document,
        file_name: &str,
    ) -> Result<AttachmentContent, ConfluenceError>;
}

impl AttachmentSource for ConfluenceClient {
    fn attachment(
        &self,
        document: &Document,
        file_name: &str,
    ) -> Result<AttachmentContent, ConfluenceError> {
        self.download_attachment(document, file_name)
    }
}

/// Result of exporting one page.
#[derive(Debug)]
pub(crate) struct ExportedPage {
    pub(crate) path: PathBuf,
    pub(crate) images: Vec<ImageRef>,
}

/// Converts pages and writes them below an output directory.
pub(crate) struct PageExporter<'a, S> {
    source: &'a S,
    base_url: &'a str,
    output: &'a OutputConfig,
}

impl<'a, S: AttachmentSource + UserResolver> PageExporter<'a, S> {
    pub(crate) fn new(source: &'a S, base_url: &'a str, output: &'a OutputConfig) -> Self {
        Self {
            source,
            base_url,
            output,
        }
    }

    /// Convert `document` and write it into `dir`.
    ///
    /// A failed image download fails the whole page.
    pub(crate) fn export(&self, document: &Document, dir: &Path) -> Result<ExportedPage, CliError> {
        let converter = Converter::new(ConvertOptions {
            image_folder: self.output.image_folder.clone(),
        })
        .with_user_resolver(self.source);
        let mut converted = converter.convert_document(document, self.base_url)?;

        std::fs::create_dir_all(dir)?;
        if self.output.download_images {
            self.download_images(document, dir, &mut converted.images)?;
        }

        let mut content = String::new();
        if self.output.include_metadata {
            content.push_str(&front_matter(document)?);
        }
        content.push_str(&converted.markdown);
        content.push('\n');

        let path = dir.join(file_name(&document.title));
        std::fs::write(&path, content)?;
        info!("Wrote {}", path.display());

        Ok(ExportedPage {
            path,
            images: converted.images,
        })
    }

    fn download_images(
        &self,
        document: &Document,
        dir: &Path,
        images: &mut Vec<ImageRef>,
    ) -> Result<(), CliError> {
        let mut seen = HashSet::new();
        images.retain(|image| seen.insert(image.file_name.clone()));
        if images.is_empty() {
            return Ok(());
        }

        let image_dir = dir.join(&self.output.image_folder);
        std::fs::create_dir_all(&image_dir)?;

        for image in images {
            let content = self.source.attachment(document, &image.file_name)?;
            std::fs::write(image_dir.join(&image.file_name), &content.data)?;
            image.size = Some(content.data.len() as u64);
            image.content_type = content.content_type;
        }
        Ok(())
    }
}

/// Markdown file name for a page title.
pub(crate) fn file_name(title: &str) -> String {
    format!("{}.md", dir_name(title))
}

/// Directory name for a page title.
pub(crate) fn dir_name(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        "untitled".to_owned()
    } else {
        slug
    }
}

#[derive(Serialize)]
struct FrontMatter<'a> {
    title: &'a str,
    confluence: PageMetadata<'a>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    labels: &'a [String],
}

#[derive(Serialize)]
struct PageMetadata<'a> {
    page_id: &'a str,
    space_key: &'a str,
    version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_by: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_by: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<&'a str>,
}

/// YAML front matter block including the `---` fences and a blank line.
fn front_matter(document: &Document) -> Result<String, serde_yaml::Error> {
    let meta = FrontMatter {
        title: &document.title,
        confluence: PageMetadata {
            page_id: &document.id,
            space_key: &document.space_key,
            version: document.version,
            url: document.web_url.as_deref(),
            created_by: document.created_by.as_ref().map(|u| u.display_name.as_str()),
            updated_by: document.updated_by.as_ref().map(|u| u.display_name.as_str()),
            created_at: document.created_at.as_deref(),
            updated_at: document.updated_at.as_deref(),
        },
        labels: &document.labels,
    };
    Ok(format!("---\n{}---\n\n", serde_yaml::to_string(&meta)?))
}
