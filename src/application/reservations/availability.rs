//! Availability checks against existing bookings of the same car.

use chrono::{DateTime, Utc};

use crate::domain::reservation::{Reservation, ReservationRepository};
use crate::domain::DomainResult;

/// First active reservation in `existing` overlapping `[start, end)`,
/// ignoring `exclude_id`.
pub fn first_conflict<'a>(
    existing: &'a [Reservation],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_id: Option<i32>,
) -> Option<&'a Reservation> {
    existing.iter().find(|r| {
        r.is_active() && Some(r.id) != exclude_id && r.overlaps(start, end)
    })
}

pub struct AvailabilityChecker<'a> {
    store: &'a dyn ReservationRepository,
}

impl<'a> AvailabilityChecker<'a> {
    pub fn new(store: &'a dyn ReservationRepository) -> Self {
        Self { store }
    }

    /// Active reservation of `car_id` that would collide with `[start, end)`.
    pub async fn find_conflict(
        &self,
        car_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<i32>,
    ) -> DomainResult<Option<Reservation>> {
        let booked = self.store.find_by_car(car_id).await?;
        Ok(first_conflict(&booked, start, end, exclude_id).cloned())
    }

    pub async fn is_available(
        &self,
        car_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<i32>,
    ) -> DomainResult<bool> {
        Ok(self
            .find_conflict(car_id, start, end, exclude_id)
            .await?
            .is_none())
    }
}
