//! Confluence page types.

use serde::Deserialize;

use cfmd_converter::{AttachmentInfo, Document};

use super::attachment::AttachmentsResponse;
use super::user::ApiUser;

/// Confluence page as returned by the content endpoints.
///
/// Every expansion is optional: child listings and searches return
/// less than a full page fetch.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiPage {
    pub id: String,
    pub title: String,
    pub space: Space,
    pub version: Version,
    pub body: Body,
    pub history: History,
    pub metadata: Metadata,
    pub children: Children,
    #[serde(rename = "_links")]
    pub links: Links,
}

/// Space the page belongs to.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Space {
    pub key: String,
}

/// Page version.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Version {
    pub number: u32,
    /// Editor of this version.
    pub by: Option<ApiUser>,
    /// ISO 8601 timestamp.
    pub when: Option<String>,
}

/// Page body content.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Body {
    pub storage: Storage,
}

/// Storage format representation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Storage {
    /// Markup in Confluence storage format.
    pub value: String,
}

/// Creation and last update history.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct History {
    pub created_by: Option<ApiUser>,
    pub created_date: Option<String>,
    pub last_updated: Option<Version>,
}

/// Page metadata.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub labels: Labels,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub results: Vec<Label>,
}

/// Page label.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Label {
    pub name: String,
}

/// Expanded children.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Children {
    pub attachment: AttachmentsResponse,
}

/// Hypermedia links.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Links {
    /// Web UI path relative to the base URL.
    pub webui: Option<String>,
}

/// Paginated content listing (child pages, search).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct ContentResults<T> {
    pub results: Vec<T>,
    pub limit: usize,
}

impl<T> Default for ContentResults<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            limit: 0,
        }
    }
}

impl ApiPage {
    /// Convert to a converter document.
    ///
    /// `base_url` is the instance base URL used to build the page URL.
    pub fn into_document(self, base_url: &str) -> Document {
        let web_url = format!(
            "{}/pages/viewpage.action?pageId={}",
            base_url.trim_end_matches('/'),
            self.id
        );

        let created_by = self.history.created_by.as_ref().and_then(ApiUser::to_user_ref);
        let last_updated = self.history.last_updated.as_ref().unwrap_or(&self.version);
        let updated_by = last_updated
            .by
            .as_ref()
            .or(self.version.by.as_ref())
            .and_then(ApiUser::to_user_ref);
        let updated_at = last_updated.when.clone().or_else(|| self.version.when.clone());

        Document {
            id: self.id,
            title: self.title,
            space_key: self.space.key,
            version: self.version.number,
            content: self.body.storage.value,
            labels: self
                .metadata
                .labels
                .results
                .into_iter()
                .map(|label| label.name)
                .collect(),
            created_by,
            updated_by,
            created_at: self.history.created_date,
            updated_at,
            web_url: Some(web_url),
            attachments: self
                .children
                .attachment
                .results
                .into_iter()
                .map(AttachmentInfo::from)
                .collect(),
        }
    }
}
