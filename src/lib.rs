//! # Rent API
//!
//! Vehicle rental backend core: reservation lifecycle and booking-conflict
//! engine.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Reservation entity, status machine, store contracts, clock
//! - **application**: Validation, availability, pricing, lifecycle service
//!   and the background lifecycle scheduler
//! - **infrastructure**: SeaORM persistence and in-memory stores
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: Errors, shutdown signalling, keyed locks

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

pub use interfaces::http::create_api_router;
