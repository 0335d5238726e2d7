//! User lookups.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::info;

use cfmd_converter::{LookupError, UserResolver};

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::ApiUser;

impl ConfluenceClient {
    /// Fetch a user by account ID.
    pub fn get_user(&self, account_id: &str) -> Result<ApiUser, ConfluenceError> {
        let url = format!(
            "{}/user?accountId={}",
            self.api_url(),
            utf8_percent_encode(account_id, NON_ALPHANUMERIC)
        );

        info!("Getting user {}", account_id);

        self.get_json(self.get(&url))
    }
}

impl UserResolver for ConfluenceClient {
    fn display_name(&self, account_id: &str) -> Result<String, LookupError> {
        let user = self.get_user(account_id)?;
        let name = user.name();
        if name.is_empty() {
            return Err(format!("user {account_id} has no display name").into());
        }
        Ok(name.to_owned())
    }
}
