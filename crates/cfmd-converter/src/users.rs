//! User mention resolution.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

/// Error returned by a [`UserResolver`].
pub type LookupError = Box<dyn std::error::Error + Send + Sync>;

/// Resolves an account identifier to a display name.
///
/// Implemented by the Confluence client. Lookups block the conversion.
pub trait UserResolver {
    fn display_name(&self, account_id: &str) -> Result<String, LookupError>;
}

/// Account identifier to display name cache owned by one conversion.
///
/// Each identifier is looked up at most once; failures are remembered.
pub struct UserCache<'a> {
    names: HashMap<String, String>,
    failed: HashSet<String>,
    resolver: Option<&'a dyn UserResolver>,
}

impl<'a> UserCache<'a> {
    pub fn new(resolver: Option<&'a dyn UserResolver>) -> Self {
        Self {
            names: HashMap::new(),
            failed: HashSet::new(),
            resolver,
        }
    }

    /// Add a known user. Empty identifiers or names are ignored.
    pub fn seed(&mut self, account_id: &str, display_name: &str) {
        if account_id.is_empty() || display_name.is_empty() {
            return;
        }
        self.names
            .insert(account_id.to_owned(), display_name.to_owned());
    }

    /// Display name for an account, querying the resolver on the first miss.
    pub fn resolve(&mut self, account_id: &str) -> Option<&str> {
        if !self.names.contains_key(account_id) && !self.failed.contains(account_id) {
            self.lookup(account_id);
        }
        self.names.get(account_id).map(String::as_str)
    }

    /// Mention text: ` @Name ` when resolved, ` @user(<id>) ` otherwise.
    pub fn mention(&mut self, account_id: &str) -> String {
        match self.resolve(account_id) {
            Some(name) => format!(" @{name} "),
            None => format!(" @user({account_id}) "),
        }
    }

    fn lookup(&mut self, account_id: &str) {
        let Some(resolver) = self.resolver else {
            debug!(account_id, "No user resolver, mention left unresolved");
            self.failed.insert(account_id.to_owned());
            return;
        };
        match resolver.display_name(account_id) {
            Ok(name) if !name.is_empty() => {
                self.names.insert(account_id.to_owned(), name);
            }
            Ok(_) => {
                debug!(account_id, "User has no display name");
                self.failed.insert(account_id.to_owned());
            }
            Err(err) => {
                warn!(account_id, error = %err, "User lookup failed");
                self.failed.insert(account_id.to_owned());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;

    use super::*;

    struct FakeResolver {
        calls: RefCell<Vec<String>>,
    }

    impl FakeResolver {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl UserResolver for FakeResolver {
        fn display_name(&self, account_id: &str) -> Result<String, LookupError> {
            self.calls.borrow_mut().push(account_id.to_owned());
            if account_id == "known" {
                Ok("Known User".to_owned())
            } else {
                Err("user not found".into())
            }
        }
    }

    #[test]
    fn test_seeded_user_needs_no_lookup() {
        let resolver = FakeResolver::new();
        let mut cache = UserCache::new(Some(&resolver));
        cache.seed("abc", "Alice");

        assert_eq!(cache.mention("abc"), " @Alice ");
        assert!(resolver.calls.borrow().is_empty());
    }

    #[test]
    fn test_miss_resolved_once() {
        let resolver = FakeResolver::new();
        let mut cache = UserCache::new(Some(&resolver));

        assert_eq!(cache.mention("known"), " @Known User ");
        assert_eq!(cache.mention("known"), " @Known User ");
        assert_eq!(resolver.calls.borrow().len(), 1);
    }

    #[test]
    fn test_failed_lookup_not_retried() {
        let resolver = FakeResolver::new();
        let mut cache = UserCache::new(Some(&resolver));

        assert_eq!(cache.mention("ghost"), " @user(ghost) ");
        assert_eq!(cache.mention("ghost"), " @user(ghost) ");
        assert_eq!(resolver.calls.borrow().len(), 1);
    }

    #[test]
    fn test_without_resolver_falls_back_to_id() {
        let mut cache = UserCache::new(None);

        assert_eq!(cache.mention("abc123"), " @user(abc123) ");
    }

    #[test]
    fn test_seed_ignores_empty_values() {
        let mut cache = UserCache::new(None);
        cache.seed("", "Nobody");
        cache.seed("abc", "");

        assert_eq!(cache.resolve("abc"), None);
    }
}
