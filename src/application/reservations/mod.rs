//! Reservation use cases
//!
//! - `validation`: stateless request checks
//! - `availability`: overlap detection against a car's active bookings
//! - `pricing`: per-started-day price
//! - `service`: lifecycle manager tying the above to the store
//! - `scheduler`: time-driven lifecycle events

pub mod availability;
pub mod pricing;
pub mod scheduler;
pub mod service;
pub mod validation;

pub use availability::AvailabilityChecker;
pub use pricing::{billable_days, compute_price};
pub use scheduler::{LifecycleScheduler, SchedulerSettings, SweepReport};
pub use service::{ReservationService, ReservationSettings};
pub use validation::{validate, BookingRequest, ReservationRequest, ValidatedBooking};
