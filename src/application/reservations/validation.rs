//! Request validation
//!
//! Stateless checks run before anything touches the store. The first
//! violated rule wins.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ValidationError;

/// Car and period a caller wants to book (or move a booking to).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingRequest {
    pub car_id: i32,
    pub reservation_start: DateTime<Utc>,
    pub reservation_end: DateTime<Utc>,
}

/// A new reservation as submitted by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationRequest {
    pub car_id: i32,
    pub user_id: Uuid,
    pub reservation_start: DateTime<Utc>,
    pub reservation_end: DateTime<Utc>,
}

impl ReservationRequest {
    pub fn booking(&self) -> BookingRequest {
        BookingRequest {
            car_id: self.car_id,
            reservation_start: self.reservation_start,
            reservation_end: self.reservation_end,
        }
    }
}

/// A [`BookingRequest`] that passed [`validate`]. Only this module can
/// build one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedBooking(BookingRequest);

impl ValidatedBooking {
    pub fn car_id(&self) -> i32 {
        self.0.car_id
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.0.reservation_start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.0.reservation_end
    }
}

pub fn validate(
    request: &BookingRequest,
    now: DateTime<Utc>,
) -> Result<ValidatedBooking, ValidationError> {
    if request.reservation_start < now {
        return Err(ValidationError::PastDate {
            field: "reservation_start",
        });
    }
    if request.reservation_end < now {
        return Err(ValidationError::PastDate {
            field: "reservation_end",
        });
    }
    if request.reservation_end <= request.reservation_start {
        return Err(ValidationError::InvalidRange);
    }
    if request.car_id <= 0 {
        return Err(ValidationError::InvalidCarId(request.car_id));
    }
    Ok(ValidatedBooking(*request))
}
