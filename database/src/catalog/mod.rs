pub mod memory_catalog;
pub mod sqlite_catalog;
pub mod traits;

pub use memory_catalog::MemoryCatalog;
pub use sqlite_catalog::SqliteCatalog;
pub use traits::{CardCatalog, CardFilter};
