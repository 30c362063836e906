//! Persistent Symbol & Reference Store (C3, spec §4.3).

pub mod schema;
pub mod sqlite;
pub mod writer;

pub use sqlite::SqliteStore;
pub use writer::{StoreWriter, WriteCommand};
