//! Reservation, car availability and per-user booking routes

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
