use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub services: ServicesConfig,
    pub reservation: ReservationProperties,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Without a `url` the service keeps reservations in memory.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub flight: FlightServiceConfig,
    pub customer: CustomerServiceConfig,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Sent as `Authorization: Bearer ...` on every outbound call when set.
    pub bearer_token: Option<String>,
}

fn default_timeout_seconds() -> u64 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct FlightServiceConfig {
    pub base_url: String,
    #[serde(default = "default_flight_fetch_path")]
    pub fetch_path: String,
    #[serde(default = "default_flight_confirm_path")]
    pub confirm_path: String,
    #[serde(default = "default_flight_cancel_path")]
    pub cancel_path: String,
}

fn default_flight_fetch_path() -> String { "api/v1_1/vuelos/{id}".to_string() }
fn default_flight_confirm_path() -> String { "api/v1_1/vuelo/confirmar/{id}".to_string() }
fn default_flight_cancel_path() -> String { "api/v1_1/vuelo/cancelar/{id}".to_string() }

#[derive(Debug, Deserialize, Clone)]
pub struct CustomerServiceConfig {
    pub base_url: String,
    #[serde(default = "default_customer_fetch_path")]
    pub fetch_path: String,
}

fn default_customer_fetch_path() -> String { "api/v1_1/clientes/{id}".to_string() }

/// Service properties exposed read-only through the properties endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReservationProperties {
    pub msg: String,
    pub build_version: String,
    #[serde(default)]
    pub mail_details: BTreeMap<String, String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `SKYBOOK__SERVER__PORT=9000` overrides `server.port`
            .add_source(config::Environment::with_prefix("SKYBOOK").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Parse a single TOML document, without environment overrides.
    pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
