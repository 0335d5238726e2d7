//! Confluence page URL parsing.

use percent_encoding::percent_decode_str;
use ureq::http::Uri;

use crate::error::ConfluenceError;

/// Location of a page extracted from a browser URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUrl {
    /// Instance base URL: scheme, host and any context path such as `/wiki`.
    pub base_url: String,
    pub space_key: Option<String>,
    pub page_id: Option<String>,
    /// Decoded page title.
    pub title: Option<String>,
}

impl PageUrl {
    /// Parse a page URL.
    ///
    /// Supported forms:
    /// - `<base>/spaces/<KEY>/pages/<ID>[/<Title>]` (Cloud, base usually ends in `/wiki`)
    /// - `<base>/display/<KEY>/<Title>`
    /// - `<base>/pages/viewpage.action?pageId=<ID>`
    ///
    /// # Example
    ///
    /// ```
    /// use cfmd_confluence::PageUrl;
    ///
    /// let url = PageUrl::parse("https://acme.atlassian.net/wiki/spaces/OPS/pages/42/Runbook").unwrap();
    /// assert_eq!(url.base_url, "https://acme.atlassian.net/wiki");
    /// assert_eq!(url.page_id.as_deref(), Some("42"));
    /// ```
    pub fn parse(url: &str) -> Result<Self, ConfluenceError> {
        let uri: Uri = url
            .trim()
            .parse()
            .map_err(|_| ConfluenceError::InvalidUrl(url.to_owned()))?;
        let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) else {
            return Err(ConfluenceError::InvalidUrl(url.to_owned()));
        };
        let origin = format!("{scheme}://{authority}");
        let path = uri.path();

        if let Some(index) = path.find("/pages/viewpage.action") {
            let page_id = uri
                .query()
                .and_then(|query| query_param(query, "pageId"))
                .filter(|id| !id.is_empty())
                .ok_or_else(|| ConfluenceError::InvalidUrl(url.to_owned()))?;
            return Ok(Self {
                base_url: format!("{origin}{}", &path[..index]),
                space_key: None,
                page_id: Some(page_id),
                title: None,
            });
        }

        if let Some(index) = path.find("/spaces/") {
            let rest = &path[index + "/spaces/".len()..];
            let mut segments = rest.split('/');
            let space_key = segments.next().filter(|key| !key.is_empty());
            let is_pages = segments.next() == Some("pages");
            let page_id = segments.next().filter(|id| is_numeric(id));
            if let (Some(space_key), true, Some(page_id)) = (space_key, is_pages, page_id) {
                return Ok(Self {
                    base_url: format!("{origin}{}", &path[..index]),
                    space_key: Some(space_key.to_owned()),
                    page_id: Some(page_id.to_owned()),
                    title: segments.next().map(decode).filter(|t| !t.is_empty()),
                });
            }
        }

        if let Some(index) = path.find("/display/") {
            let rest = &path[index + "/display/".len()..];
            if let Some((space_key, title)) = rest.split_once('/')
                && !space_key.is_empty()
                && !title.is_empty()
            {
                return Ok(Self {
                    base_url: format!("{origin}{}", &path[..index]),
                    space_key: Some(space_key.to_owned()),
                    page_id: None,
                    title: Some(decode(title)),
                });
            }
        }

        Err(ConfluenceError::InvalidUrl(url.to_owned()))
    }
}

fn query_param(query: &str, name: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| decode(value))
}

/// Decode a form-encoded path or query segment (`+` is a space).
fn decode(value: &str) -> String {
    percent_decode_str(&value.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
