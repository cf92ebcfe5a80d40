use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::DispatchError;
use crate::traits::DispatchClient;
use crate::types::DispatchRequest;

/// Default endpoint of a locally running dispatch server.
pub const DEFAULT_DISPATCH_URL: &str = "http://localhost:8000/dispatch";

/// Posts dispatch requests as JSON to an agent-dispatch server.
pub struct HttpDispatchClient {
    client: Client,
    endpoint: String,
}

impl HttpDispatchClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            endpoint: DEFAULT_DISPATCH_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for HttpDispatchClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DispatchClient for HttpDispatchClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn dispatch(&self, request: &DispatchRequest) -> Result<String, DispatchError> {
        debug!(endpoint = %self.endpoint, room = %request.room_name, "Posting dispatch request");

        // `.json()` sets `Content-Type: application/json`; redirects are followed by default.
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(DispatchError::rejected(status.as_u16(), &body));
        }

        Ok(body)
    }
}
