use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skybook_core::flight::FlightSnapshot;
use skybook_core::reservation::{Reservation, ReservationState};

/// Placeholder for route fields when the flight no longer exists upstream.
pub const FLIGHT_DELETED: &str = "[flight deleted]";
/// Placeholder for the customer name when the customer no longer exists upstream.
pub const CUSTOMER_DELETED: &str = "[customer deleted]";

/// Outward-facing reservation enriched with flight and customer data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReservationView {
    pub id: i64,
    pub code: String,
    pub state: ReservationState,
    pub customer_id: i64,
    pub customer: String,
    pub flight_id: i64,
    pub flight_code: String,
    pub origin: String,
    pub destination: String,
    pub created_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl ReservationView {
    pub fn new(reservation: &Reservation, flight: Option<&FlightSnapshot>, customer_name: Option<&str>) -> Self {
        let (flight_code, origin, destination) = match flight {
            Some(f) => (f.code.clone(), f.origin.clone(), f.destination.clone()),
            None => (
                FLIGHT_DELETED.to_string(),
                FLIGHT_DELETED.to_string(),
                FLIGHT_DELETED.to_string(),
            ),
        };

        Self {
            id: reservation.id,
            code: reservation.code.clone(),
            state: reservation.state,
            customer_id: reservation.customer_id,
            customer: customer_name.unwrap_or(CUSTOMER_DELETED).to_string(),
            flight_id: reservation.flight_id,
            flight_code,
            origin,
            destination,
            created_at: reservation.created_at,
            notes: reservation.notes.clone(),
        }
    }
}
