//! In-memory storage implementation

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::{
    CarRateLookup, DomainError, DomainResult, RepositoryProvider, Reservation,
    ReservationRepository, ReservationStatus,
};

/// In-memory reservation store for development and testing
pub struct InMemoryReservationStore {
    reservations: DashMap<i32, Reservation>,
    counter: AtomicI32,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self {
            reservations: DashMap::new(),
            counter: AtomicI32::new(1),
        }
    }

    fn collect(&self, keep: impl Fn(&Reservation) -> bool) -> Vec<Reservation> {
        let mut found: Vec<Reservation> = self
            .reservations
            .iter()
            .filter(|e| keep(e.value()))
            .map(|e| e.value().clone())
            .collect();
        found.sort_by_key(|r| r.id);
        found
    }
}

impl Default for InMemoryReservationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationStore {
    async fn insert(&self, mut reservation: Reservation) -> DomainResult<Reservation> {
        reservation.id = self.counter.fetch_add(1, Ordering::SeqCst);
        self.reservations.insert(reservation.id, reservation.clone());
        Ok(reservation)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Reservation>> {
        Ok(self.reservations.get(&id).map(|r| r.clone()))
    }

    async fn find_by_car(&self, car_id: i32) -> DomainResult<Vec<Reservation>> {
        Ok(self.collect(|r| r.car_id == car_id))
    }

    async fn find_by_user(&self, user_id: Uuid) -> DomainResult<Vec<Reservation>> {
        Ok(self.collect(|r| r.user_id == user_id))
    }

    async fn find_all(&self) -> DomainResult<Vec<Reservation>> {
        Ok(self.collect(|_| true))
    }

    async fn find_by_status(
        &self,
        statuses: &[ReservationStatus],
    ) -> DomainResult<Vec<Reservation>> {
        Ok(self.collect(|r| statuses.contains(&r.status)))
    }

    async fn update(
        &self,
        id: i32,
        mut reservation: Reservation,
    ) -> DomainResult<Option<Reservation>> {
        let Some(mut slot) = self.reservations.get_mut(&id) else {
            return Ok(None);
        };
        reservation.id = id;
        reservation.created_at = slot.created_at;
        *slot = reservation.clone();
        Ok(Some(reservation))
    }
}

/// Daily rates keyed by car id
#[derive(Default)]
pub struct InMemoryCarRates {
    rates: DashMap<i32, f64>,
}

impl InMemoryCarRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rate(&self, car_id: i32, daily_rate: f64) {
        self.rates.insert(car_id, daily_rate);
    }
}

#[async_trait]
impl CarRateLookup for InMemoryCarRates {
    async fn daily_rate(&self, car_id: i32) -> DomainResult<f64> {
        self.rates
            .get(&car_id)
            .map(|r| *r)
            .ok_or_else(|| DomainError::car_not_found(car_id))
    }
}

/// [`RepositoryProvider`] over the in-memory stores
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    pub reservations: InMemoryReservationStore,
    pub cars: InMemoryCarRates,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn reservations(&self) -> &dyn ReservationRepository {
        &self.reservations
    }

    fn cars(&self) -> &dyn CarRateLookup {
        &self.cars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn draft(car_id: i32, user_id: Uuid) -> Reservation {
        let now = Utc::now();
        Reservation::new(car_id, user_id, now, now + Duration::days(1), 40.0, now)
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = InMemoryReservationStore::new();
        let a = store.insert(draft(1, Uuid::new_v4())).await.unwrap();
        let b = store.insert(draft(1, Uuid::new_v4())).await.unwrap();
        assert!(a.id > 0);
        assert!(b.id > a.id);
        assert_eq!(store.find_by_id(b.id).await.unwrap(), Some(b));
    }

    #[tokio::test]
    async fn filters_by_car_user_and_status() {
        let store = InMemoryReservationStore::new();
        let user = Uuid::new_v4();
        store.insert(draft(1, user)).await.unwrap();
        store.insert(draft(2, user)).await.unwrap();
        let mut other = draft(1, Uuid::new_v4());
        other.status = ReservationStatus::Cancelled;
        store.insert(other).await.unwrap();

        assert_eq!(store.find_by_car(1).await.unwrap().len(), 2);
        assert_eq!(store.find_by_user(user).await.unwrap().len(), 2);
        assert_eq!(store.find_all().await.unwrap().len(), 3);
        assert_eq!(
            store
                .find_by_status(&[ReservationStatus::Cancelled])
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn update_keeps_id_and_creation_time() {
        let store = InMemoryReservationStore::new();
        let stored = store.insert(draft(1, Uuid::new_v4())).await.unwrap();
        let mut changed = stored.clone();
        changed.id = 999;
        changed.created_at = stored.created_at + Duration::days(3);
        changed.status = ReservationStatus::Confirmed;

        let updated = store.update(stored.id, changed).await.unwrap().unwrap();
        assert_eq!(updated.id, stored.id);
        assert_eq!(updated.created_at, stored.created_at);
        assert_eq!(updated.status, ReservationStatus::Confirmed);
    }

    #[tokio::test]
    async fn update_of_missing_record_returns_none() {
        let store = InMemoryReservationStore::new();
        assert!(store.update(5, draft(1, Uuid::new_v4())).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_car_has_no_rate() {
        let cars = InMemoryCarRates::new();
        cars.set_rate(7, 40.0);
        assert_eq!(cars.daily_rate(7).await.unwrap(), 40.0);
        assert!(matches!(
            cars.daily_rate(8).await,
            Err(DomainError::NotFound { entity: "Car", .. })
        ));
    }
}
