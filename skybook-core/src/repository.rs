use async_trait::async_trait;

use crate::reservation::{NewReservation, Reservation, ReservationState};
use crate::CoreResult;

/// Repository trait for reservation records.
///
/// Implementations enforce code uniqueness themselves: `insert` fails with
/// `CoreError::Conflict` when the code is already taken, even if the caller
/// checked `find_by_code` beforehand.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn insert(&self, reservation: NewReservation) -> CoreResult<Reservation>;

    async fn find_by_id(&self, id: i64) -> CoreResult<Option<Reservation>>;

    async fn find_by_code(&self, code: &str) -> CoreResult<Option<Reservation>>;

    /// Persist a state change for an existing reservation.
    async fn update_state(&self, id: i64, state: ReservationState) -> CoreResult<Reservation>;

    /// All reservations, newest id first.
    async fn list_all(&self) -> CoreResult<Vec<Reservation>>;

    /// Reservations of one customer, newest id first.
    async fn list_by_customer(&self, customer_id: i64) -> CoreResult<Vec<Reservation>>;
}
