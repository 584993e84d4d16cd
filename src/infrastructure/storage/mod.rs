//! In-memory implementations of the domain repositories

mod memory;

pub use memory::{InMemoryCarRates, InMemoryRepositoryProvider, InMemoryReservationStore};
