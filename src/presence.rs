//! In-memory live-user tracking.
//!
//! Maps connection id -> LiveUser, backed by DashMap keyed on the connection
//! id so join/leave are O(1) and a connection can never hold two entries.
//! Nothing here is persisted; the registry starts empty on every boot.

use dashmap::DashMap;
use serde::Serialize;

/// A connection currently subscribed to presence broadcasts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveUser {
    pub connection_id: String,
    pub email: String,
    pub display_name: String,
}

/// Registry of joined connections. Owned by AppState and injected into
/// request/event handlers; process-lifetime only.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    entries: DashMap<String, LiveUser>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the entry for a connection. A join with an empty email or
    /// display name is silently ignored; returns whether the entry was
    /// recorded. Repeat joins from the same connection overwrite the prior
    /// entry, they never duplicate it.
    pub fn join(&self, connection_id: &str, email: &str, display_name: &str) -> bool {
        let email = email.trim();
        let display_name = display_name.trim();
        if email.is_empty() || display_name.is_empty() {
            return false;
        }
        self.entries.insert(
            connection_id.to_string(),
            LiveUser {
                connection_id: connection_id.to_string(),
                email: email.to_string(),
                display_name: display_name.to_string(),
            },
        );
        true
    }

    /// Remove the entry for a connection, if any. Returns whether an entry
    /// was removed — a connection that never joined produces no broadcast.
    pub fn leave(&self, connection_id: &str) -> bool {
        self.entries.remove(connection_id).is_some()
    }

    /// Current membership. Order is unspecified.
    pub fn snapshot(&self) -> Vec<LiveUser> {
        self.entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_then_snapshot_has_one_entry() {
        let registry = PresenceRegistry::new();
        assert!(registry.join("conn-a", "a@x.com", "A"));

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].email, "a@x.com");
        assert_eq!(snapshot[0].display_name, "A");
    }

    #[test]
    fn leave_removes_entry() {
        let registry = PresenceRegistry::new();
        registry.join("conn-a", "a@x.com", "A");
        assert!(registry.leave("conn-a"));
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn leave_without_join_is_noop() {
        let registry = PresenceRegistry::new();
        assert!(!registry.leave("conn-a"));
    }

    #[test]
    fn empty_email_or_name_is_ignored() {
        let registry = PresenceRegistry::new();
        assert!(!registry.join("conn-a", "", "A"));
        assert!(!registry.join("conn-a", "a@x.com", ""));
        assert!(!registry.join("conn-a", "   ", "A"));
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn repeat_join_overwrites_instead_of_duplicating() {
        let registry = PresenceRegistry::new();
        registry.join("conn-a", "a@x.com", "First Name");
        registry.join("conn-a", "a@x.com", "Second Name");

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].display_name, "Second Name");
    }

    #[test]
    fn independent_connections_coexist() {
        let registry = PresenceRegistry::new();
        registry.join("conn-a", "a@x.com", "A");
        registry.join("conn-b", "b@x.com", "B");

        let mut emails: Vec<String> = registry
            .snapshot()
            .into_iter()
            .map(|u| u.email)
            .collect();
        emails.sort();
        assert_eq!(emails, vec!["a@x.com", "b@x.com"]);

        registry.leave("conn-a");
        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].email, "b@x.com");
    }
}
