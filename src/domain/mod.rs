//! Domain layer: reservation entity, status machine and the contracts of
//! the collaborators it depends on.

pub mod car;
pub mod clock;
pub mod repositories;
pub mod reservation;

pub use car::CarRateLookup;
pub use clock::{Clock, ManualClock, SystemClock};
pub use repositories::{DomainResult, RepositoryProvider};
pub use reservation::{Reservation, ReservationEvent, ReservationRepository, ReservationStatus};

pub use crate::shared::errors::{DomainError, ValidationError};
