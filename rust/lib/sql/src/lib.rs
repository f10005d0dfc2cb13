//! Embedded SQL access for the user and permission tables.

pub mod error;
pub mod sqlite;
pub mod traits;

pub use error::SQLError;
pub use sqlite::SqliteStore;
pub use traits::{Row, SQLStore, Value};
