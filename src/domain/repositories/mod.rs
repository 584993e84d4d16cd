//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to the collaborators the
//!   reservation core depends on
//! - `DomainResult`: standard result type for domain operations

use super::car::CarRateLookup;
use super::reservation::ReservationRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let rate = repos.cars().daily_rate(7).await?;
///     let booked = repos.reservations().find_by_car(7).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn reservations(&self) -> &dyn ReservationRepository;
    fn cars(&self) -> &dyn CarRateLookup;
}
