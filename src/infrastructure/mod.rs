//! Infrastructure layer: SeaORM persistence and in-process stores

pub mod database;
pub mod storage;

pub use database::repositories::SeaOrmRepositoryProvider;
pub use database::{init_database, DatabaseConfig};
pub use storage::{InMemoryCarRates, InMemoryRepositoryProvider, InMemoryReservationStore};
