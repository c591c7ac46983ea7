//! WellSync Store: SQLite persistence for assets, faults and fault embeddings,
//! plus the cosine similarity search over stored embeddings.

pub mod embedding;
pub mod schema;
pub mod sqlite;
pub mod types;

pub use sqlite::SqliteStore;
pub use types::*;
