use std::sync::Arc;
use skybook_core::customer::CustomerLookupClient;
use skybook_core::flight::FlightCapacityClient;
use skybook_core::repository::ReservationRepository;
use skybook_reservation::{ReservationOrchestrator, ResponseAssembler};
use skybook_store::app_config::ReservationProperties;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ReservationOrchestrator>,
    pub assembler: Arc<ResponseAssembler>,
    pub auth: AuthConfig,
    pub properties: Arc<ReservationProperties>,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn ReservationRepository>,
        flights: Arc<dyn FlightCapacityClient>,
        customers: Arc<dyn CustomerLookupClient>,
        auth: AuthConfig,
        properties: ReservationProperties,
    ) -> Self {
        Self {
            orchestrator: Arc::new(ReservationOrchestrator::new(repo, flights.clone(), customers.clone())),
            assembler: Arc::new(ResponseAssembler::new(flights, customers)),
            auth,
            properties: Arc::new(properties),
        }
    }
}
