//! Page model consumed by the converter.

/// A Confluence page with its storage format body and metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub space_key: String,
    pub version: u32,
    /// Storage format markup.
    pub content: String,
    pub labels: Vec<String>,
    pub created_by: Option<UserRef>,
    pub updated_by: Option<UserRef>,
    /// ISO 8601 timestamp as reported by the API.
    pub created_at: Option<String>,
    /// ISO 8601 timestamp as reported by the API.
    pub updated_at: Option<String>,
    /// Browser URL of the page.
    pub web_url: Option<String>,
    pub attachments: Vec<AttachmentInfo>,
}

/// Author or editor identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRef {
    pub account_id: String,
    pub display_name: String,
}

/// Attachment inventory entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentInfo {
    pub id: String,
    pub title: String,
    pub media_type: String,
    pub file_size: u64,
    /// Absolute or base-relative download path.
    pub download_link: String,
}

/// Invalid document or attachment metadata.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("page ID cannot be empty")]
    EmptyId,

    #[error("page title cannot be empty")]
    EmptyTitle,

    #[error("page content cannot be empty")]
    EmptyContent,

    #[error("space key cannot be empty")]
    EmptySpaceKey,

    #[error("invalid attachment at index {index}: {reason}")]
    InvalidAttachment {
        index: usize,
        reason: &'static str,
    },
}

impl Document {
    /// Check the fields conversion depends on.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.id.is_empty() {
            return Err(ConvertError::EmptyId);
        }
        if self.title.is_empty() {
            return Err(ConvertError::EmptyTitle);
        }
        if self.content.is_empty() {
            return Err(ConvertError::EmptyContent);
        }
        if self.space_key.is_empty() {
            return Err(ConvertError::EmptySpaceKey);
        }
        for (index, attachment) in self.attachments.iter().enumerate() {
            attachment
                .validate()
                .map_err(|reason| ConvertError::InvalidAttachment { index, reason })?;
        }
        Ok(())
    }

    /// Find an attachment by file name.
    pub fn attachment(&self, file_name: &str) -> Option<&AttachmentInfo> {
        self.attachments
            .iter()
            .find(|attachment| attachment.title == file_name)
    }
}

impl AttachmentInfo {
    fn validate(&self) -> Result<(), &'static str> {
        if self.id.is_empty() {
            return Err("attachment ID cannot be empty");
        }
        if self.title.is_empty() {
            return Err("attachment title cannot be empty");
        }
        if self.media_type.is_empty() {
            return Err("attachment media type cannot be empty");
        }
        if self.file_size == 0 {
            return Err("attachment file size must be greater than 0");
        }
        if self.download_link.is_empty() {
            return Err("attachment download link cannot be empty");
        }
        if self.download_link.chars().any(char::is_whitespace) {
            return Err("attachment download link is not a valid URL");
        }
        Ok(())
    }
}
