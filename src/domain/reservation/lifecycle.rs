//! Reservation status machine
//!
//! | From           | Event                          | To         | Guard                    |
//! |----------------|--------------------------------|------------|--------------------------|
//! | PendingPayment | PaymentConfirmed               | Confirmed  | payment reference given  |
//! | PendingPayment | Cancel / PaymentTimeout        | Cancelled  |                          |
//! | Confirmed      | RentalStarted                  | InProgress | `now >= start`           |
//! | Confirmed      | Cancel                         | Cancelled  | `now < start`            |
//! | InProgress     | RentalEnded                    | Completed  | `now >= end`             |
//!
//! Any other pair is an `InvalidTransition`, including repeating an event
//! that already moved the reservation on.

use chrono::{DateTime, Utc};

use super::model::{Reservation, ReservationStatus};
use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationEvent {
    PaymentConfirmed { payment_reference: String },
    Cancel,
    PaymentTimeout,
    RentalStarted,
    RentalEnded,
}

impl ReservationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PaymentConfirmed { .. } => "PaymentConfirmed",
            Self::Cancel => "Cancel",
            Self::PaymentTimeout => "PaymentTimeout",
            Self::RentalStarted => "RentalStarted",
            Self::RentalEnded => "RentalEnded",
        }
    }
}

impl std::fmt::Display for ReservationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Reservation {
    /// Apply `event` at instant `now`.
    ///
    /// Only `status` changes, plus `payment_reference` on confirmation. On
    /// error the reservation is left untouched.
    pub fn apply(&mut self, event: &ReservationEvent, now: DateTime<Utc>) -> DomainResult<()> {
        use ReservationEvent as E;
        use ReservationStatus as S;

        let next = match (self.status, event) {
            (S::PendingPayment, E::PaymentConfirmed { payment_reference })
                if !payment_reference.trim().is_empty() =>
            {
                self.payment_reference = Some(payment_reference.trim().to_string());
                S::Confirmed
            }
            (S::PendingPayment, E::Cancel | E::PaymentTimeout) => S::Cancelled,
            (S::Confirmed, E::RentalStarted) if now >= self.reservation_start => S::InProgress,
            (S::Confirmed, E::Cancel) if now < self.reservation_start => S::Cancelled,
            (S::InProgress, E::RentalEnded) if now >= self.reservation_end => S::Completed,
            _ => {
                return Err(DomainError::InvalidTransition {
                    id: self.id,
                    from: self.status.to_string(),
                    event: event.name(),
                })
            }
        };

        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap()
    }

    fn reservation(status: ReservationStatus) -> Reservation {
        let mut r = Reservation::new(
            7,
            Uuid::new_v4(),
            now() + Duration::days(1),
            now() + Duration::days(3),
            80.0,
            now(),
        );
        r.id = 1;
        r.status = status;
        r
    }

    fn paid() -> ReservationEvent {
        ReservationEvent::PaymentConfirmed {
            payment_reference: "PAY-1".into(),
        }
    }

    fn is_invalid_transition(result: DomainResult<()>) -> bool {
        matches!(result, Err(DomainError::InvalidTransition { .. }))
    }

    #[test]
    fn payment_confirms_and_attaches_reference() {
        let mut r = reservation(ReservationStatus::PendingPayment);
        r.apply(&paid(), now()).unwrap();
        assert_eq!(r.status, ReservationStatus::Confirmed);
        assert_eq!(r.payment_reference.as_deref(), Some("PAY-1"));
    }

    #[test]
    fn blank_payment_reference_is_rejected() {
        let mut r = reservation(ReservationStatus::PendingPayment);
        let event = ReservationEvent::PaymentConfirmed {
            payment_reference: "   ".into(),
        };
        assert!(is_invalid_transition(r.apply(&event, now())));
        assert_eq!(r.status, ReservationStatus::PendingPayment);
        assert!(r.payment_reference.is_none());
    }

    #[test]
    fn pending_can_be_cancelled_or_timed_out() {
        for event in [ReservationEvent::Cancel, ReservationEvent::PaymentTimeout] {
            let mut r = reservation(ReservationStatus::PendingPayment);
            r.apply(&event, now()).unwrap();
            assert_eq!(r.status, ReservationStatus::Cancelled);
        }
    }

    #[test]
    fn confirmed_starts_only_once_start_reached() {
        let mut r = reservation(ReservationStatus::Confirmed);
        assert!(is_invalid_transition(
            r.apply(&ReservationEvent::RentalStarted, now())
        ));
        r.apply(&ReservationEvent::RentalStarted, r.reservation_start)
            .unwrap();
        assert_eq!(r.status, ReservationStatus::InProgress);
    }

    #[test]
    fn confirmed_cancel_only_before_pickup() {
        let mut r = reservation(ReservationStatus::Confirmed);
        let start = r.reservation_start;
        assert!(is_invalid_transition(
            r.apply(&ReservationEvent::Cancel, start)
        ));
        assert_eq!(r.status, ReservationStatus::Confirmed);

        r.apply(&ReservationEvent::Cancel, start - Duration::seconds(1))
            .unwrap();
        assert_eq!(r.status, ReservationStatus::Cancelled);
    }

    #[test]
    fn in_progress_completes_at_end() {
        let mut r = reservation(ReservationStatus::InProgress);
        let end = r.reservation_end;
        assert!(is_invalid_transition(
            r.apply(&ReservationEvent::RentalEnded, end - Duration::minutes(1))
        ));
        r.apply(&ReservationEvent::RentalEnded, end).unwrap();
        assert_eq!(r.status, ReservationStatus::Completed);
    }

    #[test]
    fn in_progress_cannot_go_back_to_confirmed() {
        let mut r = reservation(ReservationStatus::InProgress);
        assert!(is_invalid_transition(r.apply(&paid(), now())));
        assert!(is_invalid_transition(
            r.apply(&ReservationEvent::Cancel, now())
        ));
    }

    #[test]
    fn pending_cannot_complete() {
        let mut r = reservation(ReservationStatus::PendingPayment);
        let far_future = r.reservation_end + Duration::days(1);
        assert!(is_invalid_transition(
            r.apply(&ReservationEvent::RentalEnded, far_future)
        ));
    }

    #[test]
    fn repeated_event_is_rejected() {
        let mut r = reservation(ReservationStatus::PendingPayment);
        r.apply(&paid(), now()).unwrap();
        assert!(is_invalid_transition(r.apply(&paid(), now())));
    }

    #[test]
    fn terminals_accept_nothing() {
        let events = [
            paid(),
            ReservationEvent::Cancel,
            ReservationEvent::PaymentTimeout,
            ReservationEvent::RentalStarted,
            ReservationEvent::RentalEnded,
        ];
        for status in [ReservationStatus::Completed, ReservationStatus::Cancelled] {
            for event in &events {
                let mut r = reservation(status);
                let late = r.reservation_end + Duration::days(1);
                assert!(is_invalid_transition(r.apply(event, late)));
                assert_eq!(r.status, status);
            }
        }
    }
}
