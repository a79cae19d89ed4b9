use anyhow::Context;
use skybook_api::{app, AppState, AuthConfig};
use skybook_core::repository::ReservationRepository;
use skybook_store::app_config::Config;
use skybook_store::{
    DbClient, HttpCustomerLookupClient, HttpFlightCapacityClient, InMemoryReservationRepository,
    PostgresReservationRepository,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skybook_api=debug,skybook_reservation=info,skybook_store=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Skybook reservation service on port {}", config.server.port);

    // Reservation store
    let repo: Arc<dyn ReservationRepository> = match &config.database.url {
        Some(url) => {
            let db = DbClient::new(url, config.database.max_connections)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;
            Arc::new(PostgresReservationRepository::new(db.pool.clone()))
        }
        None => {
            tracing::warn!("No database url configured, reservations are kept in memory");
            Arc::new(InMemoryReservationRepository::new())
        }
    };

    // Remote services
    let timeout = Duration::from_secs(config.services.timeout_seconds);
    let flights = HttpFlightCapacityClient::new(
        &config.services.flight,
        timeout,
        config.services.bearer_token.clone(),
    )
    .context("Failed to build flight service client")?;
    let customers = HttpCustomerLookupClient::new(
        &config.services.customer,
        timeout,
        config.services.bearer_token.clone(),
    )
    .context("Failed to build customer service client")?;

    let app_state = AppState::new(
        repo,
        Arc::new(flights),
        Arc::new(customers),
        AuthConfig { secret: config.auth.jwt_secret.clone() },
        config.reservation.clone(),
    );

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
