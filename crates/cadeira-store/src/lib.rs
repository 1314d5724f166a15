//! cadeira-store — storage layer for the cadeiras catalog.
//!
//! The HTTP layer never talks to a database driver directly. It holds a
//! [`CadeiraStore`], which issues one parameterized statement per call
//! through a [`QueryExecutor`] and decodes the returned rows into
//! [`Cadeira`] values.
//!
//! # Architecture
//!
//! ```text
//! CadeiraStore
//!   └── Arc<dyn QueryExecutor>
//!         ├── PgExecutor      (sqlx PgPool, per-query deadline)
//!         └── MemoryExecutor  (process-local table, tests + --in-memory)
//! ```
//!
//! Executors speak SQL with `$1, $2, ...` placeholders and return rows as
//! column-name → JSON value maps plus the affected-row count.

pub mod error;
pub mod executor;
pub mod memory;
pub mod postgres;
pub mod statements;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use executor::{ExecuteFuture, QueryExecutor, QueryOutcome, Row, SqlValue};
pub use memory::MemoryExecutor;
pub use postgres::{PgExecutor, PgSettings};
pub use store::CadeiraStore;
pub use types::*;
