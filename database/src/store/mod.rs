pub mod memory_store;
pub mod sqlite_store;
pub mod traits;

pub use memory_store::MemoryGameStore;
pub use sqlite_store::SqliteGameStore;
pub use traits::GameStore;
