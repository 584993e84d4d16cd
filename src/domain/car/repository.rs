//! Car rate lookup interface

use async_trait::async_trait;

use crate::domain::DomainResult;

#[async_trait]
pub trait CarRateLookup: Send + Sync {
    /// Current price per day for `car_id`.
    ///
    /// Fails with `DomainError::NotFound { entity: "Car", .. }` when the
    /// catalog has no such car.
    async fn daily_rate(&self, car_id: i32) -> DomainResult<f64>;
}
