pub mod reservation;
pub mod repository;
pub mod identity;
pub mod flight;
pub mod customer;

pub use customer::{CustomerLookupClient, CustomerProjection};
pub use flight::{FlightCapacityClient, FlightSnapshot};
pub use identity::{CallerIdentity, Role};
pub use repository::ReservationRepository;
pub use reservation::{NewReservation, Reservation, ReservationState};

/// Remote record kinds the reservation service depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteEntity {
    Flight,
    Customer,
}

impl std::fmt::Display for RemoteEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteEntity::Flight => write!(f, "flight"),
            RemoteEntity::Customer => write!(f, "customer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("No reservation exists with id: {0}")]
    NotFound(i64),
    #[error("No {entity} exists with id: {id}")]
    RemoteNotFound { entity: RemoteEntity, id: i64 },
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("Flight {flight_id} has reached its total capacity of {total_seats} seats")]
    CapacityExceeded { flight_id: i64, total_seats: i32 },
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Remote {entity} service rejected the request: {message}")]
    RemoteRejected { entity: RemoteEntity, message: String },
    #[error("Remote {entity} service unavailable: {message}")]
    RemoteUnavailable { entity: RemoteEntity, message: String },
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CoreError {
    /// True when a remote lookup answered that the record does not exist.
    pub fn is_remote_not_found(&self) -> bool {
        matches!(self, CoreError::RemoteNotFound { .. })
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
