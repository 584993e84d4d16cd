use thiserror::Error;

/// Rejections raised before a reservation request reaches the store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} cannot be in the past")]
    PastDate { field: &'static str },

    #[error("reservation_end must be after reservation_start")]
    InvalidRange,

    #[error("car_id must be a positive identifier, got {0}")]
    InvalidCarId(i32),

    #[error("reservation must last at least one billable day")]
    InvalidDuration,

    #[error("daily rate must be a finite non-negative amount, got {0}")]
    InvalidRate(f64),

    #[error("payment reference must not be empty")]
    MissingPaymentReference,

    #[error("unknown reservation status {0:?}")]
    UnknownStatus(String),
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("Car {car_id} is already booked for an overlapping period (reservation {conflicting_id})")]
    Overlap { car_id: i32, conflicting_id: i32 },

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Reservation {id}: event {event} is not allowed in status {from}")]
    InvalidTransition {
        id: i32,
        from: String,
        event: &'static str,
    },

    #[error("Reservation {id} is {status} and can no longer be modified")]
    Immutable { id: i32, status: String },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl DomainError {
    pub fn reservation_not_found(id: i32) -> Self {
        Self::NotFound {
            entity: "Reservation",
            field: "id",
            value: id.to_string(),
        }
    }

    pub fn car_not_found(car_id: i32) -> Self {
        Self::NotFound {
            entity: "Car",
            field: "id",
            value: car_id.to_string(),
        }
    }

    /// Stable machine-readable code for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Overlap { .. } => "overlap",
            Self::NotFound { .. } => "not_found",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Immutable { .. } => "immutable",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }

    /// Whether this error is transient and the caller may retry later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metrics error: {0}")]
    Metrics(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinguishable() {
        let errors = [
            DomainError::from(ValidationError::InvalidRange),
            DomainError::Overlap {
                car_id: 7,
                conflicting_id: 1,
            },
            DomainError::reservation_not_found(3),
            DomainError::InvalidTransition {
                id: 1,
                from: "Completed".into(),
                event: "Cancel",
            },
            DomainError::Immutable {
                id: 1,
                status: "Completed".into(),
            },
            DomainError::StoreUnavailable("timeout".into()),
        ];
        let kinds: std::collections::HashSet<_> = errors.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn only_store_failures_are_transient() {
        assert!(DomainError::StoreUnavailable("down".into()).is_transient());
        assert!(!DomainError::car_not_found(9).is_transient());
    }

    #[test]
    fn car_not_found_message() {
        let e = DomainError::car_not_found(42);
        assert_eq!(e.to_string(), "Not found: Car with id=42");
    }
}
