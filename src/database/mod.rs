pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager, StoreKind};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{CatalogStore, FeedbackStore, LedgerStore, Store, UserStore};
