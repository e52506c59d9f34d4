//! Workspace people lookup

use mail2do_domain::StoreUser;
use std::collections::HashMap;

/// Maps user display names and email addresses to store user ids.
///
/// Lookups are exact. When two users share a name the later one wins.
#[derive(Debug, Clone, Default)]
pub struct PeopleDirectory {
    ids: HashMap<String, String>,
}

impl PeopleDirectory {
    /// Build the directory from listed users
    pub fn from_users(users: &[StoreUser]) -> Self {
        let mut ids = HashMap::new();
        for user in users {
            if let Some(name) = user.name.as_deref().filter(|n| !n.is_empty()) {
                ids.insert(name.to_string(), user.id.clone());
            }
            if let Some(email) = user.email.as_deref().filter(|e| !e.is_empty()) {
                ids.insert(email.to_string(), user.id.clone());
            }
        }
        Self { ids }
    }

    /// User id for a name or email address
    pub fn resolve(&self, name_or_email: &str) -> Option<&str> {
        self.ids.get(name_or_email).map(String::as_str)
    }

    /// Number of known names and addresses
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no user is known
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
