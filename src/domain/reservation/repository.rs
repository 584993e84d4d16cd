//! Reservation repository interface

use async_trait::async_trait;

use super::model::{Reservation, ReservationStatus};
use crate::domain::DomainResult;

/// Persistence contract for reservations.
///
/// No delete: cancellation is a status write.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Persist a new reservation. The store assigns `id`; the value passed
    /// in is ignored. Returns the stored record.
    async fn insert(&self, reservation: Reservation) -> DomainResult<Reservation>;

    /// Find reservation by ID
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Reservation>>;

    /// All reservations for a car, any status
    async fn find_by_car(&self, car_id: i32) -> DomainResult<Vec<Reservation>>;

    /// All reservations made by a user, any status
    async fn find_by_user(&self, user_id: uuid::Uuid) -> DomainResult<Vec<Reservation>>;

    /// Find all reservations (any status)
    async fn find_all(&self) -> DomainResult<Vec<Reservation>>;

    /// Reservations whose status is one of `statuses`
    async fn find_by_status(
        &self,
        statuses: &[ReservationStatus],
    ) -> DomainResult<Vec<Reservation>>;

    /// Overwrite the record with `id` in a single conditional write.
    /// `Ok(None)` when no such record exists.
    async fn update(&self, id: i32, reservation: Reservation)
        -> DomainResult<Option<Reservation>>;
}
