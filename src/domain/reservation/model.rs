//! Reservation domain entity

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::DomainError;

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservationStatus {
    /// Created, waiting for the renter to pay
    PendingPayment,
    /// Paid, car not yet picked up
    Confirmed,
    /// Car picked up, rental running
    InProgress,
    /// Car returned
    Completed,
    /// Cancelled by user or by payment timeout
    Cancelled,
}

impl ReservationStatus {
    /// Statuses that hold the car for their interval.
    pub const ACTIVE: [ReservationStatus; 3] =
        [Self::PendingPayment, Self::Confirmed, Self::InProgress];

    pub const ALL: [ReservationStatus; 5] = [
        Self::PendingPayment,
        Self::Confirmed,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingPayment => "PendingPayment",
            Self::Confirmed => "Confirmed",
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl TryFrom<&str> for ReservationStatus {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                DomainError::StoreUnavailable(format!("unknown reservation status '{}'", s))
            })
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A booking of one car by one user over `[reservation_start, reservation_end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    /// Assigned by the store on insert; `0` until then
    pub id: i32,
    /// Car in the catalog
    pub car_id: i32,
    /// Renter (opaque identity reference)
    pub user_id: Uuid,
    pub reservation_start: DateTime<Utc>,
    pub reservation_end: DateTime<Utc>,
    pub status: ReservationStatus,
    /// Daily rate times billed days
    pub total_price: f64,
    /// External payment record, set when the payment is confirmed
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// Build a not-yet-persisted reservation in `PendingPayment`.
    pub fn new(
        car_id: i32,
        user_id: Uuid,
        reservation_start: DateTime<Utc>,
        reservation_end: DateTime<Utc>,
        total_price: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            car_id,
            user_id,
            reservation_start,
            reservation_end,
            status: ReservationStatus::PendingPayment,
            total_price,
            payment_reference: None,
            created_at,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Half-open overlap with `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        intervals_overlap(self.reservation_start, self.reservation_end, start, end)
    }
}

/// `[a_start, a_end)` and `[b_start, b_end)` share at least one instant.
/// Touching endpoints do not overlap.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

// ── Tests ──────────────────────────────────────────────────────
