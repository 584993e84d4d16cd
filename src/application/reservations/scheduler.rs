//! Background task that fires time-driven lifecycle events.
//!
//! On every tick it cancels reservations whose payment window elapsed and,
//! when auto-advance is on, starts rentals whose start time was reached and
//! completes rentals whose end time was reached. Every event goes through
//! [`ReservationService::transition`], so guards and locking are shared with
//! user-driven changes.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use super::service::ReservationService;
use crate::domain::{DomainError, DomainResult, Reservation, ReservationEvent, ReservationStatus};
use crate::shared::shutdown::ShutdownSignal;

#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// How long a reservation may stay in `PendingPayment`
    pub payment_timeout: Duration,
    /// Fire `RentalStarted` / `RentalEnded` automatically
    pub auto_advance: bool,
    pub interval: std::time::Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            payment_timeout: Duration::minutes(30),
            auto_advance: true,
            interval: std::time::Duration::from_secs(60),
        }
    }
}

/// Outcome of one sweep
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub timed_out: usize,
    pub started: usize,
    pub completed: usize,
    /// Events refused because the reservation changed in the meantime
    pub skipped: usize,
    pub failed: usize,
}

pub struct LifecycleScheduler {
    service: Arc<ReservationService>,
    settings: SchedulerSettings,
}

impl LifecycleScheduler {
    pub fn new(service: Arc<ReservationService>, settings: SchedulerSettings) -> Self {
        Self { service, settings }
    }

    /// Event due for `reservation` at `now`, if any.
    fn due_event(&self, reservation: &Reservation, now: DateTime<Utc>) -> Option<ReservationEvent> {
        match reservation.status {
            ReservationStatus::PendingPayment
                if reservation.created_at + self.settings.payment_timeout <= now =>
            {
                Some(ReservationEvent::PaymentTimeout)
            }
            ReservationStatus::Confirmed
                if self.settings.auto_advance && now >= reservation.reservation_start =>
            {
                Some(ReservationEvent::RentalStarted)
            }
            ReservationStatus::InProgress
                if self.settings.auto_advance && now >= reservation.reservation_end =>
            {
                Some(ReservationEvent::RentalEnded)
            }
            _ => None,
        }
    }

    /// Fire every event that is due now.
    pub async fn sweep(&self) -> DomainResult<SweepReport> {
        let now = self.service.now();
        let candidates = self.service.by_status(&ReservationStatus::ACTIVE).await?;

        let mut report = SweepReport::default();
        for reservation in candidates {
            let Some(event) = self.due_event(&reservation, now) else {
                continue;
            };

            match self.service.transition(reservation.id, event.clone()).await {
                Ok(_) => match event {
                    ReservationEvent::PaymentTimeout => report.timed_out += 1,
                    ReservationEvent::RentalStarted => report.started += 1,
                    ReservationEvent::RentalEnded => report.completed += 1,
                    _ => {}
                },
                Err(DomainError::InvalidTransition { .. }) => {
                    debug!(
                        reservation_id = reservation.id,
                        event = event.name(),
                        "Reservation changed before scheduled event fired"
                    );
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!(
                        reservation_id = reservation.id,
                        event = event.name(),
                        error = %e,
                        "Scheduled lifecycle event failed"
                    );
                    report.failed += 1;
                }
            }
        }

        if report != SweepReport::default() {
            info!(
                timed_out = report.timed_out,
                started = report.started,
                completed = report.completed,
                skipped = report.skipped,
                failed = report.failed,
                "Lifecycle sweep finished"
            );
        }
        Ok(report)
    }

    /// Run [`sweep`](Self::sweep) every `interval` until shutdown.
    pub fn start(self: Arc<Self>, shutdown: ShutdownSignal) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                interval_secs = self.settings.interval.as_secs(),
                payment_timeout_min = self.settings.payment_timeout.num_minutes(),
                auto_advance = self.settings.auto_advance,
                "Reservation lifecycle scheduler started"
            );

            let mut interval = tokio::time::interval(self.settings.interval);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let Err(e) = self.sweep().await {
                            warn!(error = %e, "Lifecycle sweep error");
                        }
                    }
                    _ = shutdown.wait() => {
                        info!("Reservation lifecycle scheduler shutting down");
                        break;
                    }
                }
            }
        })
    }
}
