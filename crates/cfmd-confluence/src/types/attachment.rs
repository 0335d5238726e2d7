//! Confluence attachment types.

use serde::Deserialize;

use cfmd_converter::AttachmentInfo;

/// Confluence attachment.
///
/// Serde ignores unknown fields from the API response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiAttachment {
    pub id: String,
    /// Attachment file name.
    pub title: String,
    pub extensions: Extensions,
    #[serde(rename = "_links")]
    pub links: AttachmentLinks,
}

/// Attachment metadata.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Extensions {
    pub media_type: String,
    pub file_size: u64,
}

/// Attachment hypermedia links.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttachmentLinks {
    /// Download path, usually relative to the base URL.
    pub download: String,
}

/// Attachments API response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttachmentsResponse {
    pub results: Vec<ApiAttachment>,
}

impl From<ApiAttachment> for AttachmentInfo {
    fn from(attachment: ApiAttachment) -> Self {
        Self {
            id: attachment.id,
            title: attachment.title,
            media_type: attachment.extensions.media_type,
            file_size: attachment.extensions.file_size,
            download_link: attachment.links.download,
        }
    }
}
