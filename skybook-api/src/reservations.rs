use axum::{
    extract::State,
    http::{StatusCode, Uri},
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use skybook_core::identity::CallerIdentity;
use skybook_reservation::{ReservationRequest, ReservationView};

use crate::error::{ApiError, ResultExt};
use crate::extract::{AppJson, AppPath};
use crate::middleware::admin_only_middleware;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Admin booking on behalf of an explicit customer.
#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub code: String,
    pub flight_id: i64,
    pub customer_id: i64,
    pub notes: Option<String>,
}

/// Booking for the authenticated customer; the customer id comes from the token.
#[derive(Debug, Deserialize)]
pub struct CreateOwnReservationRequest {
    pub code: String,
    pub flight_id: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReservationResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation: Option<ReservationView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservations: Option<Vec<ReservationView>>,
}

impl ReservationResponse {
    fn one(message: &str, view: ReservationView) -> Self {
        Self { message: message.to_string(), reservation: Some(view), reservations: None }
    }

    fn many(message: &str, views: Vec<ReservationView>) -> Self {
        Self { message: message.to_string(), reservation: None, reservations: Some(views) }
    }
}

pub fn routes() -> Router<AppState> {
    let admin = Router::new()
        .route("/api/v1/reservations", get(list_reservations).post(create_reservation))
        .route_layer(axum::middleware::from_fn(admin_only_middleware));

    Router::new()
        .merge(admin)
        .route("/api/v1/reservations/mine", get(list_my_reservations).post(create_my_reservation))
        .route("/api/v1/reservations/{id}", get(get_reservation))
        .route("/api/v1/reservations/{id}/confirm", put(confirm_reservation))
        .route("/api/v1/reservations/{id}/cancel", put(cancel_reservation))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/reservations
async fn create_reservation(
    State(state): State<AppState>,
    uri: Uri,
    AppJson(req): AppJson<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), ApiError> {
    let request = ReservationRequest { code: req.code, flight_id: req.flight_id, notes: req.notes };
    let created = state.orchestrator.create(request, req.customer_id).await.at(&uri)?;
    let view = state.assembler.assemble(&created).await.at(&uri)?;

    Ok((StatusCode::CREATED, Json(ReservationResponse::one("Reservation created", view))))
}

/// POST /api/v1/reservations/mine
async fn create_my_reservation(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    uri: Uri,
    AppJson(req): AppJson<CreateOwnReservationRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), ApiError> {
    let request = ReservationRequest { code: req.code, flight_id: req.flight_id, notes: req.notes };
    let created = state.orchestrator.create_for_caller(&caller, request).await.at(&uri)?;
    let view = state.assembler.assemble(&created).await.at(&uri)?;

    Ok((StatusCode::CREATED, Json(ReservationResponse::one("Reservation created for customer", view))))
}

/// GET /api/v1/reservations
async fn list_reservations(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Json<ReservationResponse>, ApiError> {
    let reservations = state.orchestrator.list_all().await.at(&uri)?;
    let views = state.assembler.assemble_many(&reservations).await.at(&uri)?;

    Ok(Json(ReservationResponse::many("Reservations found", views)))
}

/// GET /api/v1/reservations/mine
async fn list_my_reservations(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    uri: Uri,
) -> Result<Json<ReservationResponse>, ApiError> {
    let reservations = state.orchestrator.list_for_caller(&caller).await.at(&uri)?;
    let views = state.assembler.assemble_many(&reservations).await.at(&uri)?;

    Ok(Json(ReservationResponse::many("Customer reservations found", views)))
}

/// GET /api/v1/reservations/:id
async fn get_reservation(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    uri: Uri,
) -> Result<Json<ReservationResponse>, ApiError> {
    let reservation = state.orchestrator.get(id).await.at(&uri)?;
    let view = state.assembler.assemble(&reservation).await.at(&uri)?;

    Ok(Json(ReservationResponse::one("Reservation found", view)))
}

/// PUT /api/v1/reservations/:id/confirm
async fn confirm_reservation(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    uri: Uri,
) -> Result<Json<ReservationResponse>, ApiError> {
    let confirmed = state.orchestrator.confirm(id).await.at(&uri)?;
    let view = state.assembler.assemble(&confirmed).await.at(&uri)?;

    Ok(Json(ReservationResponse::one("Reservation confirmed", view)))
}

/// PUT /api/v1/reservations/:id/cancel
async fn cancel_reservation(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    uri: Uri,
) -> Result<Json<ReservationResponse>, ApiError> {
    let cancelled = state.orchestrator.cancel(id).await.at(&uri)?;
    let view = state.assembler.assemble(&cancelled).await.at(&uri)?;

    Ok(Json(ReservationResponse::one("Reservation cancelled", view)))
}
