//! Transactional, tenant-scoped persistence boundary.
//!
//! A request opens one `UnitOfWork` via `Store::begin`, performs all of its
//! reads and writes through it, and then commits or rolls back. Nothing a unit
//! of work writes is visible to anyone else until `commit` succeeds.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use r#trait::{OwnerCounts, Store, StoreError, StoreResult, UnitOfWork};
