//! The account-to-tag binding entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tag::{AccountId, IdentityTag};

/// Record linking one account to its registered identity tag.
///
/// At most one binding exists per account and at most one per tag value;
/// both constraints live in the store, not here. Bindings are created by
/// registration, mutated only through an explicit tag change, and removed
/// only by explicit deletion - never silently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityBinding {
    pub account_id: AccountId,
    pub tag: IdentityTag,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IdentityBinding {
    /// Create a fresh binding stamped with the current time.
    pub fn new(account_id: AccountId, tag: IdentityTag) -> Self {
        let now = Utc::now();
        Self {
            account_id,
            tag,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the tag and bump `updated_at`, keeping `created_at`.
    pub fn with_tag(mut self, tag: IdentityTag) -> Self {
        self.tag = tag;
        self.updated_at = Utc::now();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(s: &str) -> IdentityTag {
        IdentityTag::parse(s).unwrap()
    }

    #[test]
    fn test_new_stamps_matching_timestamps() {
        let binding = IdentityBinding::new(AccountId::new(1), tag("RC463713"));
        assert_eq!(binding.created_at, binding.updated_at);
    }

    #[test]
    fn test_with_tag_preserves_created_at() {
        let binding = IdentityBinding::new(AccountId::new(1), tag("RC463713"));
        let created_at = binding.created_at;
        std::thread::sleep(std::time::Duration::from_millis(2));
        let changed = binding.with_tag(tag("AB123456"));
        assert_eq!(changed.created_at, created_at);
        assert_eq!(changed.tag.as_str(), "AB123456");
        assert!(changed.updated_at > created_at);
    }
}
