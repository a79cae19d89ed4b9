pub mod app_config;
pub mod database;
pub mod reservation_repo;
pub mod memory_repo;
pub mod remote;
pub mod flight_client;
pub mod customer_client;

pub use customer_client::HttpCustomerLookupClient;
pub use database::DbClient;
pub use flight_client::HttpFlightCapacityClient;
pub use memory_repo::InMemoryReservationRepository;
pub use reservation_repo::PostgresReservationRepository;
