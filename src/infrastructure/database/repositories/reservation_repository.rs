//! SeaORM implementation of ReservationRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::domain::reservation::{Reservation, ReservationRepository, ReservationStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::reservation;

pub struct SeaOrmReservationRepository {
    db: DatabaseConnection,
}

impl SeaOrmReservationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: reservation::Model) -> DomainResult<Reservation> {
    Ok(Reservation {
        id: m.id,
        car_id: m.car_id,
        user_id: m.user_id,
        reservation_start: m.reservation_start,
        reservation_end: m.reservation_end,
        status: ReservationStatus::try_from(m.status.as_str())?,
        total_price: m.total_price,
        payment_reference: m.payment_reference,
        created_at: m.created_at,
    })
}

fn models_to_domain(models: Vec<reservation::Model>) -> DomainResult<Vec<Reservation>> {
    models.into_iter().map(model_to_domain).collect()
}

/// Writable columns. `id` and `created_at` are never rewritten.
fn to_active(r: &Reservation) -> reservation::ActiveModel {
    reservation::ActiveModel {
        id: NotSet,
        car_id: Set(r.car_id),
        user_id: Set(r.user_id),
        reservation_start: Set(r.reservation_start),
        reservation_end: Set(r.reservation_end),
        status: Set(r.status.as_str().to_string()),
        total_price: Set(r.total_price),
        payment_reference: Set(r.payment_reference.clone()),
        created_at: NotSet,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::StoreUnavailable(format!("Database error: {}", e))
}

// ── ReservationRepository impl ──────────────────────────────────

#[async_trait]
impl ReservationRepository for SeaOrmReservationRepository {
    async fn insert(&self, r: Reservation) -> DomainResult<Reservation> {
        debug!("Inserting reservation for car {}", r.car_id);

        let mut model = to_active(&r);
        model.created_at = Set(r.created_at);
        let stored = model.insert(&self.db).await.map_err(db_err)?;
        model_to_domain(stored)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Reservation>> {
        let model = reservation::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    async fn find_by_car(&self, car_id: i32) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::CarId.eq(car_id))
            .order_by_asc(reservation::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_by_user(&self, user_id: Uuid) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::UserId.eq(user_id))
            .order_by_asc(reservation::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_all(&self) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .order_by_asc(reservation::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_by_status(
        &self,
        statuses: &[ReservationStatus],
    ) -> DomainResult<Vec<Reservation>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        let models = reservation::Entity::find()
            .filter(reservation::Column::Status.is_in(statuses.iter().map(|s| s.as_str())))
            .order_by_asc(reservation::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn update(&self, id: i32, r: Reservation) -> DomainResult<Option<Reservation>> {
        debug!("Updating reservation: {}", id);

        let result = reservation::Entity::update_many()
            .set(to_active(&r))
            .filter(reservation::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }
}
