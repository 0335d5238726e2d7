//! Confluence user types.

use serde::Deserialize;

use cfmd_converter::UserRef;

/// Confluence user as embedded in page history or returned by the user endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiUser {
    /// Cloud account ID. Server instances may only report `userKey`.
    pub account_id: String,
    pub user_key: String,
    pub display_name: String,
    pub public_name: String,
}

impl ApiUser {
    /// Display name, falling back to the public name.
    pub fn name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.public_name
        } else {
            &self.display_name
        }
    }

    fn id(&self) -> &str {
        if self.account_id.is_empty() {
            &self.user_key
        } else {
            &self.account_id
        }
    }

    /// Convert to a converter user reference. `None` when the user has no ID.
    pub(crate) fn to_user_ref(&self) -> Option<UserRef> {
        if self.id().is_empty() {
            return None;
        }
        Some(UserRef {
            account_id: self.id().to_owned(),
            display_name: self.name().to_owned(),
        })
    }
}
