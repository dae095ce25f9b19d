//! TAGGUARD Core - Entity Types
//!
//! Identity bindings, the tag format rule, verdicts, and the error
//! taxonomy shared by every other crate. This crate contains data types
//! and the pure leaf logic on them - no storage, no I/O.

pub mod binding;
pub mod error;
pub mod tag;
pub mod verdict;

pub use binding::IdentityBinding;
pub use error::{RegistryError, RegistryResult, StoreError, StoreResult};
pub use tag::{AccountId, IdentityTag};
pub use verdict::Verdict;

/// Timestamp type using UTC timezone.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
