use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use skybook_core::flight::{FlightCapacityClient, FlightSnapshot};
use skybook_core::{CoreError, CoreResult, RemoteEntity};
use std::time::Duration;

use crate::app_config::FlightServiceConfig;
use crate::remote::{lenient_datetime, RemoteService};

/// Envelope the flight service wraps every answer in.
#[derive(Debug, Deserialize)]
struct FlightEnvelope {
    #[serde(rename = "vuelo")]
    flight: Option<RemoteFlight>,
}

#[derive(Debug, Deserialize)]
struct RemoteFlight {
    id: i64,
    #[serde(rename = "codigo")]
    code: String,
    #[serde(rename = "origen", default)]
    origin: Option<String>,
    #[serde(rename = "destino", default)]
    destination: Option<String>,
    #[serde(rename = "fechaSalida", default, deserialize_with = "lenient_datetime")]
    departure: Option<chrono::NaiveDateTime>,
    #[serde(rename = "fechaLlegada", default, deserialize_with = "lenient_datetime")]
    arrival: Option<chrono::NaiveDateTime>,
    #[serde(rename = "cupoTotal")]
    total_seats: i32,
    #[serde(rename = "cupoReservado")]
    reserved_seats: i32,
}

impl From<RemoteFlight> for FlightSnapshot {
    fn from(f: RemoteFlight) -> Self {
        FlightSnapshot {
            flight_id: f.id,
            code: f.code,
            origin: f.origin.unwrap_or_default(),
            destination: f.destination.unwrap_or_default(),
            departure: f.departure,
            arrival: f.arrival,
            total_seats: f.total_seats,
            reserved_seats: f.reserved_seats,
        }
    }
}

pub struct HttpFlightCapacityClient {
    remote: RemoteService,
    routes: FlightServiceConfig,
}

impl HttpFlightCapacityClient {
    pub fn new(
        config: &FlightServiceConfig,
        timeout: Duration,
        bearer_token: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            remote: RemoteService::new(RemoteEntity::Flight, &config.base_url, timeout, bearer_token)?,
            routes: config.clone(),
        })
    }

    async fn call(&self, method: Method, template: &str, flight_id: i64) -> CoreResult<FlightSnapshot> {
        let envelope: FlightEnvelope = self.remote.send(method, template, flight_id).await?;
        envelope
            .flight
            .map(FlightSnapshot::from)
            .ok_or(CoreError::RemoteNotFound { entity: RemoteEntity::Flight, id: flight_id })
    }
}

#[async_trait]
impl FlightCapacityClient for HttpFlightCapacityClient {
    async fn fetch(&self, flight_id: i64) -> CoreResult<FlightSnapshot> {
        self.call(Method::GET, &self.routes.fetch_path, flight_id).await
    }

    async fn increment_reserved(&self, flight_id: i64) -> CoreResult<FlightSnapshot> {
        self.call(Method::PUT, &self.routes.confirm_path, flight_id).await
    }

    async fn decrement_reserved(&self, flight_id: i64) -> CoreResult<FlightSnapshot> {
        self.call(Method::PUT, &self.routes.cancel_path, flight_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> FlightServiceConfig {
        FlightServiceConfig {
            base_url: base_url.to_string(),
            fetch_path: "api/v1_1/vuelos/{id}".to_string(),
            confirm_path: "api/v1_1/vuelo/confirmar/{id}".to_string(),
            cancel_path: "api/v1_1/vuelo/cancelar/{id}".to_string(),
        }
    }

    fn flight_body(reserved: i32) -> serde_json::Value {
        json!({
            "mensaje": "Vuelo encontrado",
            "vuelo": {
                "id": 2,
                "codigo": "AR-1302",
                "origen": "Jujuy",
                "destino": "Buenos Aires",
                "fechaSalida": "2030-03-01T10:00:00",
                "fechaLlegada": "2030-03-01T12:05:00",
                "cupoTotal": 10,
                "cupoReservado": reserved
            }
        })
    }

    fn client(server: &MockServer, token: Option<&str>) -> HttpFlightCapacityClient {
        HttpFlightCapacityClient::new(
            &config(&server.uri()),
            Duration::from_secs(2),
            token.map(str::to_string),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_decodes_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1_1/vuelos/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(flight_body(9)))
            .mount(&server)
            .await;

        let snapshot = client(&server, None).fetch(2).await.unwrap();

        assert_eq!(snapshot.flight_id, 2);
        assert_eq!(snapshot.code, "AR-1302");
        assert_eq!(snapshot.origin, "Jujuy");
        assert_eq!(snapshot.total_seats, 10);
        assert_eq!(snapshot.reserved_seats, 9);
        assert!(snapshot.departure.is_some());
    }

    #[tokio::test]
    async fn test_increment_uses_confirm_route_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/v1_1/vuelo/confirmar/2"))
            .and(header("authorization", "Bearer service-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(flight_body(10)))
            .expect(1)
            .mount(&server)
            .await;

        let snapshot = client(&server, Some("service-token")).increment_reserved(2).await.unwrap();
        assert_eq!(snapshot.reserved_seats, 10);
    }

    #[tokio::test]
    async fn test_status_translation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1_1/vuelos/404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/v1_1/vuelo/confirmar/2"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "fecha": "2030-01-01T00:00:00.000+00:00",
                "message": "El vuelo ha alcanzado el cupo total.",
                "uri": "/api/v1_1/vuelo/confirmar/2"
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/v1_1/vuelo/cancelar/2"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let flights = client(&server, None);

        let missing = flights.fetch(404).await.unwrap_err();
        assert_eq!(missing, CoreError::RemoteNotFound { entity: RemoteEntity::Flight, id: 404 });

        match flights.increment_reserved(2).await.unwrap_err() {
            CoreError::RemoteRejected { message, .. } => {
                assert_eq!(message, "El vuelo ha alcanzado el cupo total.")
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let down = flights.decrement_reserved(2).await.unwrap_err();
        assert!(matches!(down, CoreError::RemoteUnavailable { entity: RemoteEntity::Flight, .. }));
    }

    #[tokio::test]
    async fn test_empty_envelope_means_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1_1/vuelos/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "mensaje": "sin datos" })))
            .mount(&server)
            .await;

        assert!(client(&server, None).fetch(3).await.unwrap_err().is_remote_not_found());
    }

    #[test]
    fn test_url_template_expansion() {
        let remote = RemoteService::new(
            RemoteEntity::Flight,
            "http://flights:8082/",
            Duration::from_secs(1),
            None,
        )
        .unwrap();
        assert_eq!(
            remote.url("/api/v1_1/vuelo/cancelar/{id}", 15),
            "http://flights:8082/api/v1_1/vuelo/cancelar/15"
        );
    }
}
