use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use skybook_core::reservation::{NewReservation, Reservation, ReservationState};
use skybook_core::repository::ReservationRepository;
use skybook_core::{CoreError, CoreResult};

const COLUMNS: &str = "id, code, state, customer_id, flight_id, created_at, notes";

pub struct PostgresReservationRepository {
    pool: PgPool,
}

impl PostgresReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: i64,
    code: String,
    state: String,
    customer_id: i64,
    flight_id: i64,
    created_at: DateTime<Utc>,
    notes: Option<String>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = CoreError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let state = ReservationState::parse(&row.state).ok_or_else(|| {
            CoreError::Storage(format!("reservation {} has unknown state {}", row.id, row.state))
        })?;
        Ok(Reservation {
            id: row.id,
            code: row.code,
            state,
            customer_id: row.customer_id,
            flight_id: row.flight_id,
            created_at: row.created_at,
            notes: row.notes,
        })
    }
}

fn storage_error(err: sqlx::Error) -> CoreError {
    tracing::error!("Reservation store error: {}", err);
    CoreError::Storage(err.to_string())
}

fn collect(rows: Vec<ReservationRow>) -> CoreResult<Vec<Reservation>> {
    rows.into_iter().map(Reservation::try_from).collect()
}

#[async_trait]
impl ReservationRepository for PostgresReservationRepository {
    async fn insert(&self, reservation: NewReservation) -> CoreResult<Reservation> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let sql = format!(
            "INSERT INTO reservations (code, state, customer_id, flight_id, created_at, notes) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            COLUMNS
        );
        let row = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(&reservation.code)
            .bind(ReservationState::Generated.as_str())
            .bind(reservation.customer_id)
            .bind(reservation.flight_id)
            .bind(reservation.created_at)
            .bind(&reservation.notes)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    CoreError::Conflict(format!("Reservation code {} already exists", reservation.code))
                }
                other => storage_error(other),
            })?;

        tx.commit().await.map_err(storage_error)?;

        Reservation::try_from(row)
    }

    async fn find_by_id(&self, id: i64) -> CoreResult<Option<Reservation>> {
        let sql = format!("SELECT {} FROM reservations WHERE id = $1", COLUMNS);
        let row = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.map(Reservation::try_from).transpose()
    }

    async fn find_by_code(&self, code: &str) -> CoreResult<Option<Reservation>> {
        let sql = format!("SELECT {} FROM reservations WHERE code = $1", COLUMNS);
        let row = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.map(Reservation::try_from).transpose()
    }

    async fn update_state(&self, id: i64, state: ReservationState) -> CoreResult<Reservation> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let sql = format!("UPDATE reservations SET state = $1 WHERE id = $2 RETURNING {}", COLUMNS);
        let row = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(state.as_str())
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_error)?
            .ok_or(CoreError::NotFound(id))?;

        tx.commit().await.map_err(storage_error)?;

        Reservation::try_from(row)
    }

    async fn list_all(&self) -> CoreResult<Vec<Reservation>> {
        let sql = format!("SELECT {} FROM reservations ORDER BY id DESC", COLUMNS);
        let rows = sqlx::query_as::<_, ReservationRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        collect(rows)
    }

    async fn list_by_customer(&self, customer_id: i64) -> CoreResult<Vec<Reservation>> {
        let sql = format!(
            "SELECT {} FROM reservations WHERE customer_id = $1 ORDER BY id DESC",
            COLUMNS
        );
        let rows = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        collect(rows)
    }
}
