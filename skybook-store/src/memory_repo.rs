use async_trait::async_trait;
use skybook_core::reservation::{NewReservation, Reservation, ReservationState};
use skybook_core::repository::ReservationRepository;
use skybook_core::{CoreError, CoreResult};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct Rows {
    next_id: i64,
    by_id: BTreeMap<i64, Reservation>,
}

/// Reservation store kept in process memory.
///
/// Used when no database is configured and by the test suites. `writes()`
/// counts successful inserts and state updates.
#[derive(Default)]
pub struct InMemoryReservationRepository {
    rows: RwLock<Rows>,
    writes: AtomicUsize,
}

impl InMemoryReservationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn insert(&self, reservation: NewReservation) -> CoreResult<Reservation> {
        let mut rows = self.rows.write().await;
        if rows.by_id.values().any(|r| r.code == reservation.code) {
            return Err(CoreError::Conflict(format!(
                "Reservation code {} already exists",
                reservation.code
            )));
        }

        rows.next_id += 1;
        let stored = reservation.into_reservation(rows.next_id);
        rows.by_id.insert(stored.id, stored.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> CoreResult<Option<Reservation>> {
        Ok(self.rows.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> CoreResult<Option<Reservation>> {
        Ok(self.rows.read().await.by_id.values().find(|r| r.code == code).cloned())
    }

    async fn update_state(&self, id: i64, state: ReservationState) -> CoreResult<Reservation> {
        let mut rows = self.rows.write().await;
        let reservation = rows.by_id.get_mut(&id).ok_or(CoreError::NotFound(id))?;
        reservation.state = state;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(reservation.clone())
    }

    async fn list_all(&self) -> CoreResult<Vec<Reservation>> {
        Ok(self.rows.read().await.by_id.values().rev().cloned().collect())
    }

    async fn list_by_customer(&self, customer_id: i64) -> CoreResult<Vec<Reservation>> {
        Ok(self
            .rows
            .read()
            .await
            .by_id
            .values()
            .rev()
            .filter(|r| r.customer_id == customer_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_reservation(code: &str, customer_id: i64) -> NewReservation {
        NewReservation::new(code.to_string(), 2, customer_id, None)
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_generated_state() {
        let repo = InMemoryReservationRepository::new();

        let first = repo.insert(new_reservation("RSV01", 10)).await.unwrap();
        let second = repo.insert(new_reservation("RSV02", 10)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.state, ReservationState::Generated);
        assert_eq!(repo.writes(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_code_is_rejected() {
        let repo = InMemoryReservationRepository::new();
        repo.insert(new_reservation("RSV01", 10)).await.unwrap();

        let err = repo.insert(new_reservation("RSV01", 11)).await.unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
        assert_eq!(repo.writes(), 1);
    }

    #[tokio::test]
    async fn test_listing_is_newest_first() {
        let repo = InMemoryReservationRepository::new();
        for (code, customer) in [("A", 10), ("B", 20), ("C", 10)] {
            repo.insert(new_reservation(code, customer)).await.unwrap();
        }

        let all: Vec<i64> = repo.list_all().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(all, vec![3, 2, 1]);

        let mine: Vec<String> = repo
            .list_by_customer(10)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.code)
            .collect();
        assert_eq!(mine, vec!["C".to_string(), "A".to_string()]);
    }

    #[tokio::test]
    async fn test_update_state_of_missing_reservation() {
        let repo = InMemoryReservationRepository::new();
        let err = repo.update_state(42, ReservationState::Confirmed).await.unwrap_err();
        assert_eq!(err, CoreError::NotFound(42));
        assert_eq!(repo.writes(), 0);
    }
}
