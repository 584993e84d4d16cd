//! Reservation DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::application::reservations::{BookingRequest, ReservationRequest};
use crate::domain::{Reservation, ReservationEvent, ValidationError};

/// Request to book a car for a period
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReservationRequest {
    pub car_id: i32,
    /// Customer making the booking
    pub user_id: Uuid,
    /// Pickup time (RFC 3339), inclusive
    pub reservation_start: DateTime<Utc>,
    /// Return time (RFC 3339), exclusive
    pub reservation_end: DateTime<Utc>,
}

impl From<CreateReservationRequest> for ReservationRequest {
    fn from(r: CreateReservationRequest) -> Self {
        Self {
            car_id: r.car_id,
            user_id: r.user_id,
            reservation_start: r.reservation_start,
            reservation_end: r.reservation_end,
        }
    }
}

/// Request to move a reservation to another car and/or period
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateReservationRequest {
    pub car_id: i32,
    pub reservation_start: DateTime<Utc>,
    pub reservation_end: DateTime<Utc>,
}

impl From<UpdateReservationRequest> for BookingRequest {
    fn from(r: UpdateReservationRequest) -> Self {
        Self {
            car_id: r.car_id,
            reservation_start: r.reservation_start,
            reservation_end: r.reservation_end,
        }
    }
}

/// Lifecycle event name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransitionEvent {
    PaymentConfirmed,
    Cancel,
    PaymentTimeout,
    RentalStarted,
    RentalEnded,
}

/// Request to apply a lifecycle event
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TransitionRequest {
    pub event: TransitionEvent,
    /// Required for `payment_confirmed`
    #[validate(length(min = 1, max = 128))]
    pub payment_reference: Option<String>,
}

impl TryFrom<TransitionRequest> for ReservationEvent {
    type Error = ValidationError;

    fn try_from(r: TransitionRequest) -> Result<Self, Self::Error> {
        Ok(match r.event {
            TransitionEvent::PaymentConfirmed => {
                let payment_reference = r
                    .payment_reference
                    .filter(|p| !p.trim().is_empty())
                    .ok_or(ValidationError::MissingPaymentReference)?;
                ReservationEvent::PaymentConfirmed { payment_reference }
            }
            TransitionEvent::Cancel => ReservationEvent::Cancel,
            TransitionEvent::PaymentTimeout => ReservationEvent::PaymentTimeout,
            TransitionEvent::RentalStarted => ReservationEvent::RentalStarted,
            TransitionEvent::RentalEnded => ReservationEvent::RentalEnded,
        })
    }
}

/// Optional filter for `GET /api/v1/reservations`
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListReservationsQuery {
    /// Only reservations in this status (e.g. `Confirmed`)
    pub status: Option<String>,
}

/// Reservation details in API responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReservationDto {
    pub id: i32,
    pub car_id: i32,
    pub user_id: Uuid,
    pub reservation_start: DateTime<Utc>,
    pub reservation_end: DateTime<Utc>,
    /// PendingPayment, Confirmed, InProgress, Completed or Cancelled
    pub status: String,
    pub total_price: f64,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationDto {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            car_id: r.car_id,
            user_id: r.user_id,
            reservation_start: r.reservation_start,
            reservation_end: r.reservation_end,
            status: r.status.as_str().to_string(),
            total_price: r.total_price,
            payment_reference: r.payment_reference,
            created_at: r.created_at,
        }
    }
}

/// Period query for availability and quotes
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PeriodQuery {
    /// Period start (RFC 3339)
    pub start: DateTime<Utc>,
    /// Period end (RFC 3339), exclusive
    pub end: DateTime<Utc>,
    /// Reservation to ignore, e.g. the one being rescheduled
    pub exclude: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityDto {
    pub car_id: i32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuoteDto {
    pub car_id: i32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Started 24-hour periods
    pub billable_days: i64,
    pub total_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_confirmation_requires_reference() {
        let missing = TransitionRequest {
            event: TransitionEvent::PaymentConfirmed,
            payment_reference: None,
        };
        assert_eq!(
            ReservationEvent::try_from(missing).unwrap_err(),
            ValidationError::MissingPaymentReference
        );

        let blank = TransitionRequest {
            event: TransitionEvent::PaymentConfirmed,
            payment_reference: Some("   ".into()),
        };
        assert!(ReservationEvent::try_from(blank).is_err());
    }

    #[test]
    fn events_parse_from_snake_case() {
        let req: TransitionRequest =
            serde_json::from_str(r#"{"event":"rental_started"}"#).unwrap();
        assert_eq!(
            ReservationEvent::try_from(req).unwrap(),
            ReservationEvent::RentalStarted
        );

        let req: TransitionRequest =
            serde_json::from_str(r#"{"event":"payment_confirmed","payment_reference":"PAY-9"}"#)
                .unwrap();
        assert_eq!(
            ReservationEvent::try_from(req).unwrap(),
            ReservationEvent::PaymentConfirmed {
                payment_reference: "PAY-9".into()
            }
        );
    }
}
