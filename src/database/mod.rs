pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::{MemoryBondStore, MemoryUserStore};
pub use postgres::{PgBondStore, PgUserStore};
pub use store::{BondStore, UserStore};
