//! Error types for TAGGUARD operations

use thiserror::Error;

use crate::tag::{AccountId, IdentityTag};

/// Persistent-store failures.
///
/// Infrastructure only: domain outcomes such as "tag already taken" are
/// modeled as operation outcomes at the store layer and surface as
/// [`RegistryError`] variants above it, never as store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Registry operation errors.
///
/// Every mutating failure leaves registry state unchanged; conflicts are
/// surfaced verbatim and never silently retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid identity tag format: {candidate:?}")]
    FormatInvalid { candidate: String },

    #[error("account {account_id} already holds a registered tag")]
    AlreadyRegistered { account_id: AccountId },

    #[error("account {account_id} has no registered tag")]
    NotRegistered { account_id: AccountId },

    #[error("identity tag {tag} is already bound to another account")]
    TagTaken { tag: IdentityTag },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

// ============================================================================
// TESTS
// ============================================================================
