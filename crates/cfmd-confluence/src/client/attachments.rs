//! Attachment listing and download.

use std::io::Read;

use tracing::info;
use ureq::http::Uri;

use cfmd_converter::{AttachmentInfo, Document};

use super::{ConfluenceClient, check_status};
use crate::error::ConfluenceError;
use crate::types::AttachmentsResponse;

/// Largest attachment that will be downloaded (50 MiB).
pub const MAX_ATTACHMENT_SIZE: u64 = 50 * 1024 * 1024;

/// Downloaded attachment bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentContent {
    pub data: Vec<u8>,
    /// Media type from the response, or from the attachment inventory.
    pub content_type: Option<String>,
}

impl ConfluenceClient {
    /// List attachments on a page.
    pub fn get_attachments(&self, page_id: &str) -> Result<Vec<AttachmentInfo>, ConfluenceError> {
        let url = format!("{}/content/{}/child/attachment", self.api_url(), page_id);

        info!("Getting attachments for page {}", page_id);

        let response: AttachmentsResponse = self.get_json(self.get(&url).query("limit", "100"))?;
        Ok(response
            .results
            .into_iter()
            .map(AttachmentInfo::from)
            .collect())
    }

    /// Download an attachment of `document` by file name.
    ///
    /// The attachment is looked up in the document's inventory first and
    /// in the attachments endpoint otherwise. Attachments larger than
    /// [`MAX_ATTACHMENT_SIZE`] are rejected before and after the transfer.
    pub fn download_attachment(
        &self,
        document: &Document,
        file_name: &str,
    ) -> Result<AttachmentContent, ConfluenceError> {
        let attachment = match document.attachment(file_name) {
            Some(attachment) => attachment.clone(),
            None => self
                .get_attachments(&document.id)?
                .into_iter()
                .find(|a| a.title == file_name)
                .ok_or_else(|| {
                    ConfluenceError::NotFound(format!(
                        "attachment '{file_name}' on page {}",
                        document.id
                    ))
                })?,
        };

        check_size(file_name, attachment.file_size)?;
        if attachment.download_link.is_empty() {
            return Err(ConfluenceError::NotFound(format!(
                "download link for attachment '{file_name}'"
            )));
        }

        let url = normalize_download_link(&self.base_url, &attachment.download_link)?;

        info!("Downloading attachment '{}' from {}", file_name, url);

        let response = check_status(self.get(&url).header("Accept", "*/*").call()?)?;
        let content_type = response
            .headers()
            .get("Content-Type")
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned)
            .or_else(|| Some(attachment.media_type.clone()).filter(|t| !t.is_empty()));

        let mut data = Vec::new();
        response
            .into_body()
            .into_reader()
            .take(MAX_ATTACHMENT_SIZE + 1)
            .read_to_end(&mut data)?;
        check_size(file_name, data.len() as u64)?;

        Ok(AttachmentContent { data, content_type })
    }
}

fn check_size(file_name: &str, size: u64) -> Result<(), ConfluenceError> {
    if size > MAX_ATTACHMENT_SIZE {
        return Err(ConfluenceError::AttachmentTooLarge {
            name: file_name.to_owned(),
            size,
            max: MAX_ATTACHMENT_SIZE,
        });
    }
    Ok(())
}

/// Resolve a download link against the instance base URL.
///
/// Absolute links are returned unchanged. Relative links get a leading
/// slash and have spaces encoded.
fn normalize_download_link(base_url: &str, link: &str) -> Result<String, ConfluenceError> {
    if link.starts_with("http://") || link.starts_with("https://") {
        return Ok(link.to_owned());
    }

    let path = link.replace(' ', "%20");
    let full = if path.starts_with('/') {
        format!("{base_url}{path}")
    } else {
        format!("{base_url}/{path}")
    };

    full.parse::<Uri>()
        .map_err(|_| ConfluenceError::InvalidUrl(full.clone()))?;
    Ok(full)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_normalize_relative_links() {
        let base = "https://acme.atlassian.net/wiki";

        assert_eq!(
            normalize_download_link(base, "/download/attachments/1/a.png?api=v2").unwrap(),
            "https://acme.atlassian.net/wiki/download/attachments/1/a.png?api=v2"
        );
        assert_eq!(
            normalize_download_link(base, "download/attachments/1/my file.png").unwrap(),
            "https://acme.atlassian.net/wiki/download/attachments/1/my%20file.png"
        );
    }

    #[test]
    fn test_normalize_keeps_absolute_links() {
        let link = "https://cdn.example.com/files/a.png";

        assert_eq!(normalize_download_link("https://w", link).unwrap(), link);
    }

    #[test]
    fn test_normalize_rejects_invalid_link() {
        assert!(matches!(
            normalize_download_link("https://w", "/download/<bad>"),
            Err(ConfluenceError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_oversized_attachment_rejected_before_download() {
        let client = ConfluenceClient::new("http://127.0.0.1:9", "token");
        let document = Document {
            id: "1".to_owned(),
            attachments: vec![AttachmentInfo {
                id: "att1".to_owned(),
                title: "huge.bin".to_owned(),
                media_type: "application/octet-stream".to_owned(),
                file_size: MAX_ATTACHMENT_SIZE + 1,
                download_link: "/download/attachments/1/huge.bin".to_owned(),
            }],
            ..Document::default()
        };

        let err = client.download_attachment(&document, "huge.bin").unwrap_err();
        assert!(matches!(
            err,
            ConfluenceError::AttachmentTooLarge { size, max, .. }
                if size == MAX_ATTACHMENT_SIZE + 1 && max == MAX_ATTACHMENT_SIZE
        ));
    }

    #[test]
    fn test_attachment_at_limit_passes_size_check() {
        assert!(check_size("a", MAX_ATTACHMENT_SIZE).is_ok());
        assert!(check_size("a", MAX_ATTACHMENT_SIZE + 1).is_err());
    }
}
