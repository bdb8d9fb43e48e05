use std::time::Duration;

use async_trait::async_trait;
use common::{
    AbsenceAction, AbsenceMap, AbsenceMutationRequest, AbsenceMutationResponse, AbsencesResponse,
    ErrorResponse,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, trace, warn};

use crate::error::{SyncError, TransportError};

/// Server calls the sync client depends on.
#[async_trait]
pub trait AbsenceTransport: Send + Sync {
    /// Full absence mapping of the current user.
    async fn fetch_absences(&self) -> Result<AbsenceMap, TransportError>;

    /// Applies one mutation and returns the refreshed full mapping.
    async fn mutate(
        &self,
        module_id: i32,
        action: AbsenceAction,
    ) -> Result<AbsenceMap, TransportError>;
}

/// [`AbsenceTransport`] speaking JSON over HTTP with a bearer token.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpTransport {
    /// A mutation that takes longer than this is treated as a network failure.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

    pub fn new(base_url: &str, token: &str) -> Result<Self, SyncError> {
        Self::with_timeout(base_url, token, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, token: &str, timeout: Duration) -> Result<Self, SyncError> {
        let base_url = base_url.trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(SyncError::InvalidBaseUrl(base_url.to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            token: token.to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api/v1{}", self.base_url, endpoint)
    }
}

#[async_trait]
impl AbsenceTransport for HttpTransport {
    async fn fetch_absences(&self) -> Result<AbsenceMap, TransportError> {
        let url = self.url("/absences");
        debug!("GET request to: {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| network_error("GET /absences", e))?;

        let body: AbsencesResponse = read_json("GET /absences", response).await?;
        info!("GET /absences - Success");
        Ok(body.absences)
    }

    async fn mutate(
        &self,
        module_id: i32,
        action: AbsenceAction,
    ) -> Result<AbsenceMap, TransportError> {
        let url = self.url("/absences");
        debug!("POST request to: {} ({} on module {})", url, action, module_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&AbsenceMutationRequest { module_id, action })
            .send()
            .await
            .map_err(|e| network_error("POST /absences", e))?;

        let body: AbsenceMutationResponse = read_json("POST /absences", response).await?;
        if !body.success {
            warn!("POST /absences - Response not marked successful");
            return Err(TransportError::Rejected {
                status: 200,
                code: None,
                message: "Mutation not confirmed".to_string(),
            });
        }

        info!("POST /absences - Success");
        Ok(body.absences)
    }
}

fn network_error(endpoint: &str, e: reqwest::Error) -> TransportError {
    let message = if e.is_timeout() {
        format!("Request timed out: {}", e)
    } else {
        format!("Request failed: {}", e)
    };
    error!("{} - {}", endpoint, message);
    TransportError::Network(message)
}

/// Reads the body and decodes it. Error statuses and undecodable bodies are rejections;
/// a body that cannot be read at all is a network failure.
async fn read_json<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T, TransportError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| network_error(endpoint, e))?;

    if !status.is_success() {
        warn!("{} - Non-OK response: {}", endpoint, status);
        return Err(match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(err) => {
                error!("{} - API error: {}", endpoint, err.error);
                TransportError::Rejected {
                    status: status.as_u16(),
                    code: Some(err.code),
                    message: err.error,
                }
            }
            Err(_) => TransportError::Rejected {
                status: status.as_u16(),
                code: None,
                message: format!("HTTP error: {}", status),
            },
        });
    }

    trace!("{} - Response received, parsing JSON", endpoint);
    serde_json::from_str(&text).map_err(|e| {
        let message = format!("Failed to parse response: {}", e);
        error!("{} - {}", endpoint, message);
        TransportError::Rejected {
            status: status.as_u16(),
            code: None,
            message,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let transport = HttpTransport::new("http://localhost:3000/", "tok").unwrap();
        assert_eq!(transport.url("/absences"), "http://localhost:3000/api/v1/absences");
    }

    #[test]
    fn test_base_url_requires_scheme() {
        assert!(matches!(
            HttpTransport::new("localhost:3000", "tok"),
            Err(SyncError::InvalidBaseUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_network_failure() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let transport =
            HttpTransport::with_timeout("http://127.0.0.1:9", "tok", Duration::from_millis(500)).unwrap();

        let err = transport.mutate(1, AbsenceAction::Add).await.unwrap_err();
        assert!(err.is_network());
    }
}
