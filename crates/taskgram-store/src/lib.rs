//! Persistence layer for Taskgram.
//!
//! Exposes the [`Store`] trait consumed by the extraction pipeline, a
//! Postgres implementation ([`PgStore`]) with embedded migrations, and an
//! in-memory fake ([`MemoryStore`]) for tests.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::Store;
