//! Application layer: reservation use cases on top of the domain contracts.

pub mod reservations;

pub use reservations::{
    LifecycleScheduler, ReservationService, ReservationSettings, SchedulerSettings,
};
