//! Persistence: the `Database` trait and its libSQL backend.

mod libsql_backend;
pub mod migrations;
mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{Database, StoredLead, StoredMessage};
