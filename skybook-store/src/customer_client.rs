use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use skybook_core::customer::{CustomerLookupClient, CustomerProjection};
use skybook_core::{CoreError, CoreResult, RemoteEntity};
use skybook_shared::Masked;
use std::time::Duration;

use crate::app_config::CustomerServiceConfig;
use crate::remote::RemoteService;

#[derive(Debug, Deserialize)]
struct CustomerEnvelope {
    #[serde(rename = "cliente")]
    customer: Option<RemoteCustomer>,
}

#[derive(Debug, Deserialize)]
struct RemoteCustomer {
    id: i64,
    #[serde(rename = "nombreCompleto")]
    full_name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(rename = "documento", default)]
    document: Option<String>,
}

impl From<RemoteCustomer> for CustomerProjection {
    fn from(c: RemoteCustomer) -> Self {
        CustomerProjection {
            id: c.id,
            full_name: c.full_name,
            email: Masked(c.email.unwrap_or_default()),
            document_id: Masked(c.document.unwrap_or_default()),
        }
    }
}

pub struct HttpCustomerLookupClient {
    remote: RemoteService,
    fetch_path: String,
}

impl HttpCustomerLookupClient {
    pub fn new(
        config: &CustomerServiceConfig,
        timeout: Duration,
        bearer_token: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            remote: RemoteService::new(RemoteEntity::Customer, &config.base_url, timeout, bearer_token)?,
            fetch_path: config.fetch_path.clone(),
        })
    }
}

#[async_trait]
impl CustomerLookupClient for HttpCustomerLookupClient {
    async fn fetch(&self, customer_id: i64) -> CoreResult<CustomerProjection> {
        let envelope: CustomerEnvelope = self.remote.send(Method::GET, &self.fetch_path, customer_id).await?;
        envelope
            .customer
            .map(CustomerProjection::from)
            .ok_or(CoreError::RemoteNotFound { entity: RemoteEntity::Customer, id: customer_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> HttpCustomerLookupClient {
        let config = CustomerServiceConfig {
            base_url: server.uri(),
            fetch_path: "api/v1_1/clientes/{id}".to_string(),
        };
        HttpCustomerLookupClient::new(&config, Duration::from_secs(2), None).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_customer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1_1/clientes/10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "mensaje": "Cliente encontrado",
                "cliente": {
                    "id": 10,
                    "nombreCompleto": "Lionel Messi",
                    "email": "leo.messi@mail.com",
                    "documento": "30000000"
                }
            })))
            .mount(&server)
            .await;

        let customer = client(&server).await.fetch(10).await.unwrap();
        assert_eq!(customer.full_name, "Lionel Messi");
        assert_eq!(customer.email.expose(), "leo.messi@mail.com");
        assert_eq!(format!("{:?}", customer.document_id), "********");
    }

    #[tokio::test]
    async fn test_missing_customer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1_1/clientes/11"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server).await.fetch(11).await.unwrap_err();
        assert_eq!(err, CoreError::RemoteNotFound { entity: RemoteEntity::Customer, id: 11 });
    }
}
