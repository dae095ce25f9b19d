//! Message inspection against the registry.

use std::sync::Arc;

use tagguard_core::{AccountId, RegistryResult, Verdict};
use tagguard_registry::IdentityRegistry;
use tagguard_storage::BindingStore;
use tracing::warn;

use crate::scanner::scan;

/// Inspects inbound negotiation-channel messages for identity-tag misuse.
///
/// Read-only over the registry: the only side effect of `inspect` is the
/// ordinary read-through caching of the sender lookup. Invoked once per
/// inbound message, concurrently across any number of channels; handles
/// are cheap to clone and share.
pub struct MismatchDetector<S: BindingStore> {
    registry: Arc<IdentityRegistry<S>>,
}

impl<S: BindingStore> Clone for MismatchDetector<S> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<S: BindingStore> MismatchDetector<S> {
    pub fn new(registry: Arc<IdentityRegistry<S>>) -> Self {
        Self { registry }
    }

    /// Classify one message from `sender`.
    ///
    /// Message text is uppercased before scanning, mirroring the
    /// registration path, so `rc463713` and `RC463713` are the same
    /// candidate. Deterministic for a fixed (sender, text, registry
    /// state); errors only on store failure during the sender lookup.
    pub async fn inspect(
        &self,
        sender: AccountId,
        message_text: &str,
    ) -> RegistryResult<Verdict> {
        let found = scan(&message_text.to_ascii_uppercase());
        if found.is_empty() {
            return Ok(Verdict::NoTagsPresent);
        }

        let verdict = match self.registry.lookup(sender).await? {
            None => {
                warn!(
                    %sender,
                    candidates = found.len(),
                    "unregistered sender presenting identity tags"
                );
                Verdict::UnregisteredSender { found }
            }
            Some(binding) if found.contains(&binding.tag) => Verdict::Match,
            Some(binding) => {
                warn!(
                    %sender,
                    expected = %binding.tag,
                    presented = %found[0],
                    "identity tag mismatch"
                );
                Verdict::Mismatch {
                    expected: binding.tag,
                    found,
                }
            }
        };
        Ok(verdict)
    }
}

// ============================================================================
// TESTS
// ============================================================================
