pub mod orchestrator;
pub mod assembler;
pub mod view;

pub use assembler::ResponseAssembler;
pub use orchestrator::{ReservationOrchestrator, ReservationRequest};
pub use view::{ReservationView, CUSTOMER_DELETED, FLIGHT_DELETED};
