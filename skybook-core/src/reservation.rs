use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a booking code, mirrored by the `reservations.code` column.
pub const MAX_CODE_LEN: usize = 30;

/// Reservation lifecycle. `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationState {
    Generated,
    Confirmed,
    Cancelled,
}

impl ReservationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationState::Generated => "GENERATED",
            ReservationState::Confirmed => "CONFIRMED",
            ReservationState::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "GENERATED" => Some(ReservationState::Generated),
            "CONFIRMED" => Some(ReservationState::Confirmed),
            "CANCELLED" => Some(ReservationState::Cancelled),
            _ => None,
        }
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: ReservationState) -> bool {
        matches!(
            (self, next),
            (ReservationState::Generated, ReservationState::Confirmed)
                | (ReservationState::Generated, ReservationState::Cancelled)
                | (ReservationState::Confirmed, ReservationState::Cancelled)
        )
    }

    /// A confirmed reservation holds one seat on its flight.
    pub fn holds_seat(&self) -> bool {
        *self == ReservationState::Confirmed
    }
}

impl std::fmt::Display for ReservationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A booking linking a customer to a flight. Never physically deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reservation {
    pub id: i64,
    pub code: String,
    pub state: ReservationState,
    pub customer_id: i64,
    pub flight_id: i64,
    pub created_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// A reservation that has not been persisted yet; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReservation {
    pub code: String,
    pub customer_id: i64,
    pub flight_id: i64,
    pub created_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl NewReservation {
    pub fn new(code: String, flight_id: i64, customer_id: i64, notes: Option<String>) -> Self {
        Self {
            code,
            customer_id,
            flight_id,
            created_at: Utc::now(),
            notes,
        }
    }

    /// Every new reservation starts out `Generated`.
    pub fn into_reservation(self, id: i64) -> Reservation {
        Reservation {
            id,
            code: self.code,
            state: ReservationState::Generated,
            customer_id: self.customer_id,
            flight_id: self.flight_id,
            created_at: self.created_at,
            notes: self.notes,
        }
    }
}
