use serde::Deserialize;
use skybook_core::customer::CustomerLookupClient;
use skybook_core::flight::FlightCapacityClient;
use skybook_core::identity::CallerIdentity;
use skybook_core::repository::ReservationRepository;
use skybook_core::reservation::{NewReservation, Reservation, ReservationState, MAX_CODE_LEN};
use skybook_core::{CoreError, CoreResult};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Booking data supplied by the caller. The customer comes either from the
/// request (admin) or from the caller identity.
#[derive(Debug, Clone, Deserialize)]
pub struct ReservationRequest {
    pub code: String,
    pub flight_id: i64,
    pub notes: Option<String>,
}

/// Drives the reservation lifecycle across the local store and the flight
/// and customer services.
///
/// There is no transaction spanning the remote calls and the local write.
/// `confirm` and `cancel` always run check, then remote mutation, then local
/// persist, and abort on the first failure without retrying.
pub struct ReservationOrchestrator {
    repo: Arc<dyn ReservationRepository>,
    flights: Arc<dyn FlightCapacityClient>,
    customers: Arc<dyn CustomerLookupClient>,
}

impl ReservationOrchestrator {
    pub fn new(
        repo: Arc<dyn ReservationRepository>,
        flights: Arc<dyn FlightCapacityClient>,
        customers: Arc<dyn CustomerLookupClient>,
    ) -> Self {
        Self { repo, flights, customers }
    }

    /// Create a GENERATED reservation for an explicit customer.
    ///
    /// No seat is taken here; capacity is only touched on confirmation.
    pub async fn create(&self, request: ReservationRequest, customer_id: i64) -> CoreResult<Reservation> {
        let code = request.code;
        if code.trim().is_empty() {
            return Err(CoreError::Validation("Reservation code must not be blank".to_string()));
        }
        if code.chars().count() > MAX_CODE_LEN {
            return Err(CoreError::Validation(format!(
                "Reservation code must be at most {} characters",
                MAX_CODE_LEN
            )));
        }

        if self.repo.find_by_code(&code).await?.is_some() {
            return Err(CoreError::Conflict(format!("Reservation code {} already exists", code)));
        }

        self.flights.fetch(request.flight_id).await?;
        self.customers.fetch(customer_id).await?;

        let reservation = self
            .repo
            .insert(NewReservation::new(code, request.flight_id, customer_id, request.notes))
            .await?;

        info!(
            "Reservation {} ({}) created for customer {} on flight {}",
            reservation.id, reservation.code, reservation.customer_id, reservation.flight_id
        );
        Ok(reservation)
    }

    /// Create a reservation owned by the caller.
    pub async fn create_for_caller(
        &self,
        caller: &CallerIdentity,
        request: ReservationRequest,
    ) -> CoreResult<Reservation> {
        self.create(request, caller.customer_id).await
    }

    /// Transition: GENERATED → CONFIRMED (takes one seat on the flight)
    pub async fn confirm(&self, id: i64) -> CoreResult<Reservation> {
        let reservation = self.get(id).await?;

        if !reservation.state.can_transition_to(ReservationState::Confirmed) {
            return Err(CoreError::InvalidState(format!(
                "Reservation {} cannot be CONFIRMED from state {}",
                id, reservation.state
            )));
        }

        let flight = self.flights.fetch(reservation.flight_id).await?;
        if !flight.has_room_for_one() {
            warn!(
                "Reservation {} rejected: flight {} is full ({}/{})",
                id, flight.flight_id, flight.reserved_seats, flight.total_seats
            );
            return Err(CoreError::CapacityExceeded {
                flight_id: flight.flight_id,
                total_seats: flight.total_seats,
            });
        }

        self.flights.increment_reserved(reservation.flight_id).await?;

        let confirmed = self
            .repo
            .update_state(id, ReservationState::Confirmed)
            .await
            .map_err(|e| {
                error!(
                    "Seat taken on flight {} but reservation {} was not persisted as CONFIRMED: {}",
                    reservation.flight_id, id, e
                );
                e
            })?;

        info!("Reservation {} confirmed on flight {}", id, confirmed.flight_id);
        Ok(confirmed)
    }

    /// Transition: GENERATED | CONFIRMED → CANCELLED
    ///
    /// Only a confirmed reservation holds a seat, so only that case calls the
    /// flight service.
    pub async fn cancel(&self, id: i64) -> CoreResult<Reservation> {
        let reservation = self.get(id).await?;

        if !reservation.state.can_transition_to(ReservationState::Cancelled) {
            return Err(CoreError::InvalidState(format!(
                "Reservation {} is already CANCELLED",
                id
            )));
        }

        if reservation.state.holds_seat() {
            self.flights.decrement_reserved(reservation.flight_id).await?;
        }

        let cancelled = self
            .repo
            .update_state(id, ReservationState::Cancelled)
            .await
            .map_err(|e| {
                if reservation.state.holds_seat() {
                    error!(
                        "Seat released on flight {} but reservation {} was not persisted as CANCELLED: {}",
                        reservation.flight_id, id, e
                    );
                }
                e
            })?;

        info!("Reservation {} cancelled (was {})", id, reservation.state);
        Ok(cancelled)
    }

    pub async fn get(&self, id: i64) -> CoreResult<Reservation> {
        self.repo.find_by_id(id).await?.ok_or(CoreError::NotFound(id))
    }

    /// All reservations, newest first.
    pub async fn list_all(&self) -> CoreResult<Vec<Reservation>> {
        self.repo.list_all().await
    }

    pub async fn list_for_customer(&self, customer_id: i64) -> CoreResult<Vec<Reservation>> {
        self.repo.list_by_customer(customer_id).await
    }

    pub async fn list_for_caller(&self, caller: &CallerIdentity) -> CoreResult<Vec<Reservation>> {
        self.list_for_customer(caller.customer_id).await
    }
}
