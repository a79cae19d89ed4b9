use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use skybook_core::{CoreError, CoreResult, RemoteEntity};
use std::time::Duration;

/// Shared plumbing for the outbound JSON clients.
///
/// One request per call, no retries. Status codes are translated into the
/// core error taxonomy so callers never see reqwest types.
#[derive(Clone)]
pub struct RemoteService {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
    entity: RemoteEntity,
}

/// Error body the upstream services return: `{ "fecha", "message", "uri" }`.
#[derive(Debug, Deserialize)]
struct UpstreamError {
    message: Option<String>,
}

impl RemoteService {
    pub fn new(
        entity: RemoteEntity,
        base_url: &str,
        timeout: Duration,
        bearer_token: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token,
            entity,
        })
    }

    /// Expand a `{id}` path template against the base URL.
    pub fn url(&self, template: &str, id: i64) -> String {
        format!(
            "{}/{}",
            self.base_url,
            template.trim_start_matches('/').replace("{id}", &id.to_string())
        )
    }

    pub async fn send<T: DeserializeOwned>(&self, method: Method, template: &str, id: i64) -> CoreResult<T> {
        let url = self.url(template, id);
        tracing::debug!("{} {} ({} {})", method, url, self.entity, id);

        let mut request = self
            .client
            .request(method, &url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| self.unavailable(e.to_string()))?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(CoreError::RemoteNotFound { entity: self.entity, id });
        }

        if matches!(status, StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY) {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UpstreamError>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(body);
            tracing::warn!("Remote {} service rejected {}: {}", self.entity, url, message);
            return Err(CoreError::RemoteRejected { entity: self.entity, message });
        }

        if !status.is_success() {
            return Err(self.unavailable(format!("unexpected status {}", status)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| self.unavailable(format!("invalid response body: {}", e)))
    }

    fn unavailable(&self, message: String) -> CoreError {
        tracing::error!("Remote {} service call failed: {}", self.entity, message);
        CoreError::RemoteUnavailable { entity: self.entity, message }
    }
}

/// Accepts ISO-8601 strings and ignores any other shape (null, arrays).
pub fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<chrono::NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<chrono::NaiveDateTime>().ok()))
}
