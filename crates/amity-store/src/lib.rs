//! # amity-store
//!
//! Channel-scoped object storage for Amity.
//!
//! Everything the client persists goes through the [`ObjectStore`] trait:
//! discover objects by channel and schema, put (create or replace) and delete
//! them under an authenticated [`Session`](amity_shared::Session). Two
//! backends are provided: [`MemoryStore`] for a single process and tests, and
//! the SQLite-backed [`Database`] for data that should survive restarts.

pub mod database;
pub mod memory;
pub mod migrations;
pub mod objects;
pub mod store;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use store::{ObjectStore, ObjectStream};
