//! TAGGUARD Registry - Account-to-Tag Service
//!
//! Owns the authoritative mapping from platform accounts to identity
//! tags. Registration, tag changes, and deletion all route through the
//! persistent store's uniqueness constraints; the cache in front of
//! lookups is an optimization that can never weaken them.

pub mod registry;

pub use registry::IdentityRegistry;
