//! Reservation aggregate
//!
//! Contains the Reservation entity, its status machine, and the repository
//! interface.

pub mod lifecycle;
pub mod model;
pub mod repository;

pub use lifecycle::ReservationEvent;
pub use model::{intervals_overlap, Reservation, ReservationStatus};
pub use repository::ReservationRepository;
