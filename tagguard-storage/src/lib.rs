//! TAGGUARD Storage - Binding Store and Cache
//!
//! Defines the persistent-store abstraction for identity bindings, the
//! in-memory and PostgreSQL implementations, and the TTL read-through
//! cache that fronts account lookups.

pub mod cache;
pub mod cached;
pub mod memory;
pub mod postgres;
pub mod store;

pub use cache::{BindingCache, CacheConfig, CacheProbe, CacheStats};
pub use cached::CachedStore;
pub use memory::MemoryBindingStore;
pub use postgres::{DbConfig, PgBindingStore};
pub use store::{BindingStore, CreateOutcome, DeleteOutcome, UpdateOutcome};
