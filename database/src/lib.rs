pub mod catalog;
pub mod config;
pub mod error;
pub mod retry;
pub mod schema;
pub mod store;


pub use catalog::{CardCatalog, CardFilter, MemoryCatalog, SqliteCatalog};
pub use config::DatabaseConfig;
pub use error::DatabaseError;
pub use retry::retry_with_backoff;
pub use store::{GameStore, MemoryGameStore, SqliteGameStore};
