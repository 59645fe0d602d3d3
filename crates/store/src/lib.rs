//! Persistent store adapter: sessions and cache rows, behind a trait so the
//! embedded (in-memory) and networked (ScyllaDB) backends are
//! interchangeable. There is no migration path between the two backends —
//! an operator switching starts from an empty store.

pub mod cache_store;
pub mod error;
pub mod session_store;

#[cfg(feature = "scylla-backend")]
pub mod schema;
#[cfg(feature = "scylla-backend")]
pub mod scylla_client;

pub use cache_store::{CacheRow, CacheStats, CacheStore, InMemoryCacheStore};
pub use error::{Result, StoreError};
pub use session_store::{InMemorySessionStore, SessionStore};

#[cfg(feature = "scylla-backend")]
pub use scylla_client::{ScyllaClient, ScyllaConfig};
#[cfg(feature = "scylla-backend")]
pub use session_store::ScyllaSessionStore;
