use axum::{extract::State, routing::get, Json, Router};
use skybook_store::app_config::ReservationProperties;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/reservations/properties", get(read_properties))
}

/// Service configuration, returned as configured.
async fn read_properties(State(state): State<AppState>) -> Json<ReservationProperties> {
    Json(state.properties.as_ref().clone())
}
