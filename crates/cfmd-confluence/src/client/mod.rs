//! Confluence REST API client.
//!
//! Provides a sync HTTP client for the Confluence Cloud and
//! Server/Data Center REST API with Bearer token authentication.

mod attachments;
mod pages;
mod users;

use std::time::Duration;

use serde::de::DeserializeOwned;
use ureq::http::Response;
use ureq::{Agent, Body, RequestBuilder, typestate::WithoutBody};

use crate::error::ConfluenceError;

pub use attachments::{AttachmentContent, MAX_ATTACHMENT_SIZE};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

const USER_AGENT: &str = concat!("cfmd/", env!("CARGO_PKG_VERSION"));

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    api_token: String,
}

impl ConfluenceClient {
    /// Create a client for the instance at `base_url`.
    ///
    /// # Arguments
    /// * `base_url` - Confluence base URL including any context path (e.g. `https://acme.atlassian.net/wiki`)
    /// * `api_token` - personal access token sent as a Bearer token
    pub fn new(base_url: &str, api_token: &str) -> Self {
        Self::with_timeout(base_url, api_token, Duration::from_secs(DEFAULT_TIMEOUT))
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(base_url: &str, api_token: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_token: api_token.to_owned(),
        }
    }

    /// Instance base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/rest/api", self.base_url)
    }

    /// Authenticated GET request builder.
    fn get(&self, url: &str) -> RequestBuilder<WithoutBody> {
        self.agent
            .get(url)
            .header("Authorization", &format!("Bearer {}", self.api_token))
            .header("User-Agent", USER_AGENT)
    }

    /// Send a JSON GET request and decode the response.
    fn get_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder<WithoutBody>,
    ) -> Result<T, ConfluenceError> {
        let response = request.header("Accept", "application/json").call()?;
        Ok(check_status(response)?.into_body().read_json()?)
    }
}

/// Turn error statuses into [`ConfluenceError::HttpResponse`].
fn check_status(response: Response<Body>) -> Result<Response<Body>, ConfluenceError> {
    let status = response.status().as_u16();
    if status < 400 {
        return Ok(response);
    }

    let error_body = response
        .into_body()
        .read_to_string()
        .unwrap_or_else(|_| "(unable to read error body)".to_owned());
    Err(ConfluenceError::HttpResponse {
        status,
        body: error_body,
    })
}
