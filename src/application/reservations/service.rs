//! Reservation lifecycle service
//!
//! Orchestrates validation, availability, pricing and status transitions on
//! top of the store contract. Writes that depend on a prior availability
//! check run under a per-car lock; writes to one reservation run under a
//! per-reservation lock. Lock order is always reservation, then cars in
//! ascending id.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::availability::AvailabilityChecker;
use super::pricing::compute_price;
use super::validation::{validate, BookingRequest, ReservationRequest, ValidatedBooking};
use crate::domain::{
    Clock, DomainError, DomainResult, RepositoryProvider, Reservation, ReservationEvent,
    ReservationStatus, ValidationError,
};
use crate::shared::KeyedLocks;

#[derive(Debug, Clone)]
pub struct ReservationSettings {
    /// Upper bound for any single store call
    pub store_timeout: Duration,
}

impl Default for ReservationSettings {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(5),
        }
    }
}

pub struct ReservationService {
    repos: Arc<dyn RepositoryProvider>,
    clock: Arc<dyn Clock>,
    settings: ReservationSettings,
    car_locks: KeyedLocks<i32>,
    reservation_locks: KeyedLocks<i32>,
}

impl ReservationService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        clock: Arc<dyn Clock>,
        settings: ReservationSettings,
    ) -> Self {
        Self {
            repos,
            clock,
            settings,
            car_locks: KeyedLocks::new(),
            reservation_locks: KeyedLocks::new(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ── Commands ───────────────────────────────────────────────

    /// Validate, check availability, price and persist a new reservation in
    /// `PendingPayment`.
    pub async fn create(&self, request: ReservationRequest) -> DomainResult<Reservation> {
        self.create_inner(request)
            .await
            .inspect_err(|e| record_rejection("create", e))
    }

    async fn create_inner(&self, request: ReservationRequest) -> DomainResult<Reservation> {
        let now = self.clock.now();
        let booking = validate(&request.booking(), now)?;

        let _car = self.car_locks.lock(booking.car_id()).await;

        self.ensure_available(&booking, None).await?;
        let total_price = self.price(&booking).await?;

        let draft = Reservation::new(
            booking.car_id(),
            request.user_id,
            booking.start(),
            booking.end(),
            total_price,
            now,
        );
        let stored = self
            .store("insert", self.repos.reservations().insert(draft))
            .await?;

        metrics::counter!("reservations_created_total").increment(1);
        info!(
            reservation_id = stored.id,
            car_id = stored.car_id,
            user_id = %stored.user_id,
            total_price = stored.total_price,
            "Reservation created"
        );
        Ok(stored)
    }

    /// Move an existing, non-terminal reservation to a new car and/or period.
    /// Status, owner, payment reference and creation time are kept.
    pub async fn update(&self, id: i32, change: BookingRequest) -> DomainResult<Reservation> {
        self.update_inner(id, change)
            .await
            .inspect_err(|e| record_rejection("update", e))
    }

    async fn update_inner(&self, id: i32, change: BookingRequest) -> DomainResult<Reservation> {
        let _reservation = self.reservation_locks.lock(id).await;

        let existing = self.load(id).await?;
        if existing.status.is_terminal() {
            return Err(DomainError::Immutable {
                id,
                status: existing.status.to_string(),
            });
        }

        let booking = validate(&change, self.clock.now())?;

        let _cars = self
            .car_locks
            .lock_many(vec![existing.car_id, booking.car_id()])
            .await;

        self.ensure_available(&booking, Some(id)).await?;
        let total_price = self.price(&booking).await?;

        let mut changed = existing;
        changed.car_id = booking.car_id();
        changed.reservation_start = booking.start();
        changed.reservation_end = booking.end();
        changed.total_price = total_price;

        let stored = self
            .store("update", self.repos.reservations().update(id, changed))
            .await?
            .ok_or_else(|| DomainError::reservation_not_found(id))?;

        info!(
            reservation_id = id,
            car_id = stored.car_id,
            total_price = stored.total_price,
            "Reservation updated"
        );
        Ok(stored)
    }

    /// Apply a lifecycle event. Only the status (and, on payment, the
    /// payment reference) is written.
    pub async fn transition(&self, id: i32, event: ReservationEvent) -> DomainResult<Reservation> {
        self.transition_inner(id, event)
            .await
            .inspect_err(|e| record_rejection("transition", e))
    }

    async fn transition_inner(&self, id: i32, event: ReservationEvent) -> DomainResult<Reservation> {
        let _reservation = self.reservation_locks.lock(id).await;

        let mut reservation = self.load(id).await?;
        let from = reservation.status;
        reservation.apply(&event, self.clock.now())?;

        let stored = self
            .store("update", self.repos.reservations().update(id, reservation))
            .await?
            .ok_or_else(|| DomainError::reservation_not_found(id))?;

        metrics::counter!(
            "reservation_transitions_total",
            "from" => from.as_str(),
            "to" => stored.status.as_str()
        )
        .increment(1);
        info!(
            reservation_id = id,
            event = event.name(),
            from = %from,
            to = %stored.status,
            "Reservation status changed"
        );
        Ok(stored)
    }

    /// Cancel a pending reservation, or a confirmed one before pickup.
    pub async fn cancel(&self, id: i32) -> DomainResult<Reservation> {
        self.transition(id, ReservationEvent::Cancel).await
    }

    // ── Queries ────────────────────────────────────────────────

    pub async fn by_id(&self, id: i32) -> DomainResult<Option<Reservation>> {
        self.store("find_by_id", self.repos.reservations().find_by_id(id))
            .await
    }

    pub async fn by_car(&self, car_id: i32) -> DomainResult<Vec<Reservation>> {
        self.store("find_by_car", self.repos.reservations().find_by_car(car_id))
            .await
    }

    pub async fn by_user(&self, user_id: Uuid) -> DomainResult<Vec<Reservation>> {
        self.store("find_by_user", self.repos.reservations().find_by_user(user_id))
            .await
    }

    pub async fn all(&self) -> DomainResult<Vec<Reservation>> {
        self.store("find_all", self.repos.reservations().find_all())
            .await
    }

    pub async fn by_status(&self, statuses: &[ReservationStatus]) -> DomainResult<Vec<Reservation>> {
        self.store(
            "find_by_status",
            self.repos.reservations().find_by_status(statuses),
        )
        .await
    }

    /// Whether `[start, end)` is free for `car_id`. This is a point-in-time
    /// answer; `create`/`update` re-check under the car lock.
    pub async fn is_available(
        &self,
        car_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<i32>,
    ) -> DomainResult<bool> {
        if end <= start {
            return Err(ValidationError::InvalidRange.into());
        }
        let checker = AvailabilityChecker::new(self.repos.reservations());
        self.store(
            "find_by_car",
            checker.is_available(car_id, start, end, exclude_id),
        )
        .await
    }

    /// Price a prospective booking without persisting anything.
    pub async fn quote(
        &self,
        car_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<f64> {
        let booking = validate(
            &BookingRequest {
                car_id,
                reservation_start: start,
                reservation_end: end,
            },
            self.clock.now(),
        )?;
        self.price(&booking).await
    }

    // ── Internals ──────────────────────────────────────────────

    async fn load(&self, id: i32) -> DomainResult<Reservation> {
        self.by_id(id)
            .await?
            .ok_or_else(|| DomainError::reservation_not_found(id))
    }

    async fn ensure_available(
        &self,
        booking: &ValidatedBooking,
        exclude_id: Option<i32>,
    ) -> DomainResult<()> {
        let checker = AvailabilityChecker::new(self.repos.reservations());
        let conflict = self
            .store(
                "find_by_car",
                checker.find_conflict(booking.car_id(), booking.start(), booking.end(), exclude_id),
            )
            .await?;

        match conflict {
            Some(existing) => {
                debug!(
                    car_id = booking.car_id(),
                    conflicting_id = existing.id,
                    "Requested period overlaps an active reservation"
                );
                Err(DomainError::Overlap {
                    car_id: booking.car_id(),
                    conflicting_id: existing.id,
                })
            }
            None => Ok(()),
        }
    }

    async fn price(&self, booking: &ValidatedBooking) -> DomainResult<f64> {
        let rate = self
            .store("daily_rate", self.repos.cars().daily_rate(booking.car_id()))
            .await?;
        Ok(compute_price(rate, booking.start(), booking.end())?)
    }

    /// Run a store call under the configured timeout.
    async fn store<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = DomainResult<T>>,
    ) -> DomainResult<T> {
        match tokio::time::timeout(self.settings.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.settings.store_timeout.as_millis() as u64,
                    "Store call timed out"
                );
                Err(DomainError::StoreUnavailable(format!(
                    "{} timed out after {:?}",
                    operation, self.settings.store_timeout
                )))
            }
        }
    }
}

fn record_rejection(operation: &'static str, error: &DomainError) {
    metrics::counter!(
        "reservations_rejected_total",
        "operation" => operation,
        "reason" => error.kind()
    )
    .increment(1);
    if error.is_transient() {
        warn!(operation, error = %error, "Reservation request failed");
    } else {
        debug!(operation, error = %error, "Reservation request rejected");
    }
}

// ── Tests ──────────────────────────────────────────────────────
