use skybook_core::customer::CustomerLookupClient;
use skybook_core::flight::{FlightCapacityClient, FlightSnapshot};
use skybook_core::reservation::Reservation;
use skybook_core::CoreResult;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::view::ReservationView;

/// Joins reservations with remote flight and customer data.
///
/// A flight or customer that no longer exists upstream is rendered with a
/// sentinel instead of failing the response. Other remote failures still
/// propagate.
pub struct ResponseAssembler {
    flights: Arc<dyn FlightCapacityClient>,
    customers: Arc<dyn CustomerLookupClient>,
}

/// Lookups already made during one assembly pass. `None` records a miss.
#[derive(Default)]
struct PassCache {
    flights: HashMap<i64, Option<FlightSnapshot>>,
    customers: HashMap<i64, Option<String>>,
}

impl ResponseAssembler {
    pub fn new(flights: Arc<dyn FlightCapacityClient>, customers: Arc<dyn CustomerLookupClient>) -> Self {
        Self { flights, customers }
    }

    pub async fn assemble(&self, reservation: &Reservation) -> CoreResult<ReservationView> {
        let mut cache = PassCache::default();
        self.assemble_with(reservation, &mut cache).await
    }

    /// Each item is enriched independently; a flight or customer id is only
    /// looked up once per call.
    pub async fn assemble_many(&self, reservations: &[Reservation]) -> CoreResult<Vec<ReservationView>> {
        let mut cache = PassCache::default();
        let mut views = Vec::with_capacity(reservations.len());
        for reservation in reservations {
            views.push(self.assemble_with(reservation, &mut cache).await?);
        }
        Ok(views)
    }

    async fn assemble_with(&self, reservation: &Reservation, cache: &mut PassCache) -> CoreResult<ReservationView> {
        let flight = match cache.flights.get(&reservation.flight_id) {
            Some(hit) => hit.clone(),
            None => {
                let fetched = tolerate_missing(self.flights.fetch(reservation.flight_id).await)?;
                if fetched.is_none() {
                    warn!("Flight {} of reservation {} not found", reservation.flight_id, reservation.id);
                }
                cache.flights.insert(reservation.flight_id, fetched.clone());
                fetched
            }
        };

        let customer = match cache.customers.get(&reservation.customer_id) {
            Some(hit) => hit.clone(),
            None => {
                let fetched = tolerate_missing(self.customers.fetch(reservation.customer_id).await)?
                    .map(|c| c.full_name);
                if fetched.is_none() {
                    warn!("Customer {} of reservation {} not found", reservation.customer_id, reservation.id);
                }
                cache.customers.insert(reservation.customer_id, fetched.clone());
                fetched
            }
        };

        Ok(ReservationView::new(reservation, flight.as_ref(), customer.as_deref()))
    }
}

fn tolerate_missing<T>(result: CoreResult<T>) -> CoreResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_remote_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{CUSTOMER_DELETED, FLIGHT_DELETED};
    use chrono::Utc;
    use skybook_core::customer::{CustomerProjection, InMemoryCustomerDirectory};
    use skybook_core::flight::InMemoryFlightCapacity;
    use skybook_core::reservation::ReservationState;
    use skybook_core::CoreError;
    use skybook_shared::Masked;

    fn reservation(id: i64, flight_id: i64, customer_id: i64) -> Reservation {
        Reservation {
            id,
            code: format!("RSV{:02}", id),
            state: ReservationState::Generated,
            customer_id,
            flight_id,
            created_at: Utc::now(),
            notes: Some("aisle".to_string()),
        }
    }

    async fn setup() -> (Arc<InMemoryFlightCapacity>, Arc<InMemoryCustomerDirectory>, ResponseAssembler) {
        let flights = Arc::new(InMemoryFlightCapacity::new());
        let customers = Arc::new(InMemoryCustomerDirectory::new());
        flights
            .insert(FlightSnapshot {
                flight_id: 2,
                code: "AR-1302".to_string(),
                origin: "Jujuy".to_string(),
                destination: "Buenos Aires".to_string(),
                departure: None,
                arrival: None,
                total_seats: 10,
                reserved_seats: 3,
            })
            .await;
        customers
            .insert(CustomerProjection {
                id: 10,
                full_name: "Lionel Messi".to_string(),
                email: Masked("leo.messi@mail.com".to_string()),
                document_id: Masked("30000000".to_string()),
            })
            .await;
        let assembler = ResponseAssembler::new(flights.clone(), customers.clone());
        (flights, customers, assembler)
    }

    #[tokio::test]
    async fn test_assemble_joins_remote_data() {
        let (_, _, assembler) = setup().await;

        let view = assembler.assemble(&reservation(1, 2, 10)).await.unwrap();

        assert_eq!(view.code, "RSV01");
        assert_eq!(view.customer, "Lionel Messi");
        assert_eq!(view.flight_code, "AR-1302");
        assert_eq!(view.origin, "Jujuy");
        assert_eq!(view.destination, "Buenos Aires");
        assert_eq!(view.notes.as_deref(), Some("aisle"));
    }

    #[tokio::test]
    async fn test_deleted_flight_and_customer_become_sentinels() {
        let (flights, customers, assembler) = setup().await;
        flights.remove(2).await;
        customers.remove(10).await;

        let view = assembler.assemble(&reservation(1, 2, 10)).await.unwrap();

        assert_eq!(view.flight_code, FLIGHT_DELETED);
        assert_eq!(view.origin, FLIGHT_DELETED);
        assert_eq!(view.destination, FLIGHT_DELETED);
        assert_eq!(view.customer, CUSTOMER_DELETED);
        assert_eq!(view.state, ReservationState::Generated);
    }

    #[tokio::test]
    async fn test_batch_tolerates_per_item_and_memoizes() {
        let (flights, customers, assembler) = setup().await;
        let batch = vec![
            reservation(3, 2, 10),
            reservation(2, 404, 10),
            reservation(1, 2, 55),
        ];

        let views = assembler.assemble_many(&batch).await.unwrap();

        assert_eq!(views.len(), 3);
        assert_eq!(views[0].flight_code, "AR-1302");
        assert_eq!(views[0].customer, "Lionel Messi");
        assert_eq!(views[1].flight_code, FLIGHT_DELETED);
        assert_eq!(views[1].customer, "Lionel Messi");
        assert_eq!(views[2].flight_code, "AR-1302");
        assert_eq!(views[2].customer, CUSTOMER_DELETED);

        // flights 2 and 404, customers 10 and 55
        assert_eq!(flights.fetch_calls(), 2);
        assert_eq!(customers.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_not_masked() {
        let (flights, _, assembler) = setup().await;
        flights.set_unavailable(true);

        let err = assembler.assemble(&reservation(1, 2, 10)).await.unwrap_err();
        assert!(matches!(err, CoreError::RemoteUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_repeated_reads_are_identical() {
        let (_, _, assembler) = setup().await;
        let r = reservation(1, 2, 10);

        let first = assembler.assemble(&r).await.unwrap();
        let second = assembler.assemble(&r).await.unwrap();
        assert_eq!(first, second);
    }
}
