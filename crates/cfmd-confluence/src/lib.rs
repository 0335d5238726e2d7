//! Confluence integration for cfmd.
//!
//! Blocking REST client for Confluence Cloud and Server/Data Center with
//! Bearer token authentication. Pages are returned as converter
//! [`Document`](cfmd_converter::Document)s.

mod client;
mod error;
mod types;
mod url;

pub use client::{AttachmentContent, ConfluenceClient, MAX_ATTACHMENT_SIZE};
pub use error::ConfluenceError;
pub use types::{ApiAttachment, ApiPage, ApiUser};
pub use url::PageUrl;
