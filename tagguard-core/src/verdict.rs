//! Verdicts produced by message inspection.

use serde::{Deserialize, Serialize};

use crate::tag::IdentityTag;

/// Outcome of inspecting one message for identity-tag misuse.
///
/// Produced per message and handed to the caller; never stored by this
/// core. The `found` lists keep every distinct candidate in order of
/// first appearance so callers can log the full picture, with the first
/// element serving as the representative value for alert rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// No tag-shaped token anywhere in the message.
    NoTagsPresent,
    /// The sender's registered tag appears among the candidates.
    Match,
    /// The sender is registered but presented only foreign tags.
    Mismatch {
        expected: IdentityTag,
        found: Vec<IdentityTag>,
    },
    /// The sender presented tags without holding any registration.
    UnregisteredSender { found: Vec<IdentityTag> },
}

impl Verdict {
    /// True when the verdict warrants an alert from the caller.
    pub fn is_suspicious(&self) -> bool {
        matches!(
            self,
            Self::Mismatch { .. } | Self::UnregisteredSender { .. }
        )
    }

    /// Representative offending tag, when there is one.
    pub fn reported(&self) -> Option<&IdentityTag> {
        match self {
            Self::Mismatch { found, .. } | Self::UnregisteredSender { found } => found.first(),
            Self::NoTagsPresent | Self::Match => None,
        }
    }
}
