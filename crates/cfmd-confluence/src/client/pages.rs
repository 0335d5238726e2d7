//! Page operations.

use tracing::info;

use cfmd_converter::Document;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{ApiPage, ContentResults};

/// Expansions needed to convert a page and write its front matter.
const PAGE_EXPAND: &str =
    "body.storage,metadata.labels,version,space,history,history.lastUpdated,children.attachment";

/// Expansions for child listings. Attachments are fetched lazily.
const CHILD_EXPAND: &str = "body.storage,metadata.labels,version,space,history,history.lastUpdated";

/// Page size for child page listings.
const CHILD_PAGE_LIMIT: usize = 100;

impl ConfluenceClient {
    /// Fetch a page with body, labels, history and attachment inventory.
    ///
    /// Returns [`ConfluenceError::NotFound`] if the page does not exist.
    pub fn get_page(&self, page_id: &str) -> Result<Document, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), page_id);

        info!("Getting page {}", page_id);

        let page: ApiPage = self
            .get_json(self.get(&url).query("expand", PAGE_EXPAND))
            .map_err(|e| match e {
                ConfluenceError::HttpResponse { status: 404, .. } => {
                    ConfluenceError::NotFound(format!("page {page_id}"))
                }
                other => other,
            })?;

        Ok(page.into_document(&self.base_url))
    }

    /// Fetch all direct children of a page, following pagination.
    pub fn get_child_pages(&self, page_id: &str) -> Result<Vec<Document>, ConfluenceError> {
        let url = format!("{}/content/{}/child/page", self.api_url(), page_id);
        let limit = CHILD_PAGE_LIMIT.to_string();

        info!("Getting child pages of {}", page_id);

        let mut children = Vec::new();
        let mut start = 0;
        loop {
            let request = self
                .get(&url)
                .query("expand", CHILD_EXPAND)
                .query("limit", &limit)
                .query("start", start.to_string());
            let batch: ContentResults<ApiPage> = self.get_json(request)?;

            let count = batch.results.len();
            children.extend(
                batch
                    .results
                    .into_iter()
                    .map(|page| page.into_document(&self.base_url)),
            );

            let page_size = if batch.limit == 0 {
                CHILD_PAGE_LIMIT
            } else {
                batch.limit
            };
            if count == 0 || count < page_size {
                break;
            }
            start += page_size;
        }

        Ok(children)
    }

    /// Look up a page ID by space key and exact title.
    pub fn find_page_id(&self, space_key: &str, title: &str) -> Result<String, ConfluenceError> {
        let url = format!("{}/content", self.api_url());

        info!("Searching page '{}' in space {}", title, space_key);

        let request = self
            .get(&url)
            .query("spaceKey", space_key)
            .query("title", title)
            .query("limit", "1");
        let found: ContentResults<ApiPage> = self.get_json(request)?;

        found
            .results
            .into_iter()
            .next()
            .map(|page| page.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ConfluenceError::NotFound(format!("page '{title}' in space {space_key}"))
            })
    }
}
