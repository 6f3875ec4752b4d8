//! SQLite backend for the aula canonical store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! connection thread without blocking the async runtime. Because that
//! thread executes calls strictly in order, the per-unit
//! BEGIN/COMMIT/ROLLBACK bracket issued by the single-threaded orchestrator
//! is sound even though it spans multiple calls.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
