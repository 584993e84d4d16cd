//! Car catalog boundary
//!
//! The catalog itself lives elsewhere; reservations only need a car's
//! current daily rate.

pub mod repository;

pub use repository::CarRateLookup;
