//! Confluence REST API response types.

mod attachment;
mod page;
mod user;

pub use attachment::{ApiAttachment, AttachmentsResponse};
pub(crate) use page::ContentResults;
pub use page::ApiPage;
pub use user::ApiUser;
