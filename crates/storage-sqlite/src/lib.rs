//! SQLite portfolio store for casfolio.
//!
//! This crate is the only place where Diesel dependencies exist. It implements
//! the repository traits defined in `casfolio-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The single-writer actor that serialises write transactions
//! - Repository implementations and their Diesel model types
//!
//! ```text
//!   casfolio-core (domain, traits)
//!            │
//!            ▼
//!   storage-sqlite (this crate)
//!            │
//!            ▼
//!        SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod holdings;
pub mod schema;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use holdings::HoldingRepository;

// Re-export from casfolio-core for convenience
pub use casfolio_core::errors::{DatabaseError, Error, Result};
