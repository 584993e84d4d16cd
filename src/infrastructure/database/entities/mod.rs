//! Database entities module

pub mod car;
pub mod reservation;

pub use car::Entity as Car;
pub use reservation::Entity as Reservation;
