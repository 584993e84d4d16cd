//! SeaORM implementation of CarRateLookup

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::domain::car::CarRateLookup;
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::car;

pub struct SeaOrmCarRepository {
    db: DatabaseConnection,
}

impl SeaOrmCarRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CarRateLookup for SeaOrmCarRepository {
    async fn daily_rate(&self, car_id: i32) -> DomainResult<f64> {
        let model = car::Entity::find_by_id(car_id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::StoreUnavailable(format!("Database error: {}", e)))?;
        model
            .map(|c| c.price_per_day)
            .ok_or_else(|| DomainError::car_not_found(car_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::tests::{memory_db, seed_car};

    #[tokio::test]
    async fn reads_rate_or_reports_missing_car() {
        let db = memory_db().await;
        let id = seed_car(&db, 55.5).await;
        let repo = SeaOrmCarRepository::new(db);

        assert_eq!(repo.daily_rate(id).await.unwrap(), 55.5);
        let err = repo.daily_rate(id + 100).await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }
}
