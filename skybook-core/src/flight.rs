use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::{CoreError, CoreResult, RemoteEntity};

/// Read-only copy of a flight as reported by the flight service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlightSnapshot {
    pub flight_id: i64,
    pub code: String,
    pub origin: String,
    pub destination: String,
    pub departure: Option<NaiveDateTime>,
    pub arrival: Option<NaiveDateTime>,
    pub total_seats: i32,
    pub reserved_seats: i32,
}

impl FlightSnapshot {
    /// Optimistic check: would one more confirmed seat still fit?
    ///
    /// The flight service repeats this check when it is asked to increment and
    /// its answer wins.
    pub fn has_room_for_one(&self) -> bool {
        self.reserved_seats + 1 <= self.total_seats
    }
}

/// Port to the service that owns flight capacity.
#[async_trait]
pub trait FlightCapacityClient: Send + Sync {
    async fn fetch(&self, flight_id: i64) -> CoreResult<FlightSnapshot>;

    /// Ask the flight service to take one more seat.
    async fn increment_reserved(&self, flight_id: i64) -> CoreResult<FlightSnapshot>;

    /// Ask the flight service to release one seat. Never goes below zero.
    async fn decrement_reserved(&self, flight_id: i64) -> CoreResult<FlightSnapshot>;
}

/// Deterministic stand-in for the flight service.
///
/// Applies the same rules as the real service (authoritative capacity check on
/// increment, floor of zero on decrement) and counts every call so tests can
/// assert which remote operations an orchestrator step performed.
#[derive(Default)]
pub struct InMemoryFlightCapacity {
    flights: RwLock<HashMap<i64, FlightSnapshot>>,
    unavailable: AtomicBool,
    rejecting: AtomicBool,
    fetches: AtomicUsize,
    increments: AtomicUsize,
    decrements: AtomicUsize,
}

impl InMemoryFlightCapacity {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, snapshot: FlightSnapshot) {
        self.flights.write().await.insert(snapshot.flight_id, snapshot);
    }

    /// Simulates the flight being deleted upstream.
    pub async fn remove(&self, flight_id: i64) {
        self.flights.write().await.remove(&flight_id);
    }

    pub async fn snapshot(&self, flight_id: i64) -> Option<FlightSnapshot> {
        self.flights.read().await.get(&flight_id).cloned()
    }

    /// While set, every call fails as if the service could not be reached.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// While set, increments and decrements are refused; reads still work.
    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn increment_calls(&self) -> usize {
        self.increments.load(Ordering::SeqCst)
    }

    pub fn decrement_calls(&self) -> usize {
        self.decrements.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> CoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CoreError::RemoteUnavailable {
                entity: RemoteEntity::Flight,
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }

    fn check_accepting(&self) -> CoreResult<()> {
        if self.rejecting.load(Ordering::SeqCst) {
            return Err(CoreError::RemoteRejected {
                entity: RemoteEntity::Flight,
                message: "The flight is closed for changes".to_string(),
            });
        }
        Ok(())
    }

    fn not_found(flight_id: i64) -> CoreError {
        CoreError::RemoteNotFound { entity: RemoteEntity::Flight, id: flight_id }
    }
}

#[async_trait]
impl FlightCapacityClient for InMemoryFlightCapacity {
    async fn fetch(&self, flight_id: i64) -> CoreResult<FlightSnapshot> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.snapshot(flight_id).await.ok_or_else(|| Self::not_found(flight_id))
    }

    async fn increment_reserved(&self, flight_id: i64) -> CoreResult<FlightSnapshot> {
        self.increments.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.check_accepting()?;
        let mut flights = self.flights.write().await;
        let flight = flights.get_mut(&flight_id).ok_or_else(|| Self::not_found(flight_id))?;
        if !flight.has_room_for_one() {
            return Err(CoreError::RemoteRejected {
                entity: RemoteEntity::Flight,
                message: "The flight has reached its total capacity".to_string(),
            });
        }
        flight.reserved_seats += 1;
        Ok(flight.clone())
    }

    async fn decrement_reserved(&self, flight_id: i64) -> CoreResult<FlightSnapshot> {
        self.decrements.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.check_accepting()?;
        let mut flights = self.flights.write().await;
        let flight = flights.get_mut(&flight_id).ok_or_else(|| Self::not_found(flight_id))?;
        if flight.reserved_seats > 0 {
            flight.reserved_seats -= 1;
        }
        Ok(flight.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight(total: i32, reserved: i32) -> FlightSnapshot {
        FlightSnapshot {
            flight_id: 7,
            code: "AA-101".to_string(),
            origin: "Jujuy".to_string(),
            destination: "Lima".to_string(),
            departure: None,
            arrival: None,
            total_seats: total,
            reserved_seats: reserved,
        }
    }

    #[test]
    fn test_has_room_for_one() {
        assert!(flight(10, 9).has_room_for_one());
        assert!(!flight(10, 10).has_room_for_one());
    }

    #[tokio::test]
    async fn test_fake_enforces_capacity_and_floor() {
        let flights = InMemoryFlightCapacity::new();
        flights.insert(flight(1, 0)).await;

        assert_eq!(flights.increment_reserved(7).await.unwrap().reserved_seats, 1);
        let rejected = flights.increment_reserved(7).await.unwrap_err();
        assert!(matches!(rejected, CoreError::RemoteRejected { .. }));

        assert_eq!(flights.decrement_reserved(7).await.unwrap().reserved_seats, 0);
        assert_eq!(flights.decrement_reserved(7).await.unwrap().reserved_seats, 0);

        assert_eq!(flights.increment_calls(), 2);
        assert_eq!(flights.decrement_calls(), 2);
    }

    #[tokio::test]
    async fn test_fake_missing_and_unavailable() {
        let flights = InMemoryFlightCapacity::new();
        assert!(flights.fetch(99).await.unwrap_err().is_remote_not_found());

        flights.insert(flight(5, 0)).await;
        flights.set_unavailable(true);
        let err = flights.fetch(7).await.unwrap_err();
        assert!(matches!(err, CoreError::RemoteUnavailable { entity: RemoteEntity::Flight, .. }));
        assert_eq!(flights.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn test_fake_rejecting_refuses_only_mutations() {
        let flights = InMemoryFlightCapacity::new();
        flights.insert(flight(5, 2)).await;
        flights.set_rejecting(true);

        assert_eq!(flights.fetch(7).await.unwrap().reserved_seats, 2);
        let err = flights.increment_reserved(7).await.unwrap_err();
        assert!(matches!(err, CoreError::RemoteRejected { entity: RemoteEntity::Flight, .. }));
        assert!(flights.decrement_reserved(7).await.is_err());
        assert_eq!(flights.snapshot(7).await.unwrap().reserved_seats, 2);
    }
}
