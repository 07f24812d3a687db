//! HTTP delivery to the store's query endpoint
//!
//! One GET per position, the statement carried in the `query` parameter.

use crate::client::IngestionClient;
use crate::error::Result;
use crate::outcome::SendOutcome;
use crate::serializer::{QuerySerializer, SqlInsertSerializer};
use async_trait::async_trait;
use chrono::Utc;
use common::Position;
use config::IngestionConfig;
use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// HTTP-based ingestion client
pub struct HttpIngestionClient {
    client: Client,
    exec_url: String,
    serializer: Arc<dyn QuerySerializer>,
    connection_backoff: Duration,
    cancel: CancellationToken,
}

impl HttpIngestionClient {
    /// Create a client for the configured endpoint.
    ///
    /// `connection_backoff` is how long `send` pauses after the endpoint
    /// could not be reached.
    pub fn new(config: &IngestionConfig, connection_backoff: Duration) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            exec_url: config.exec_url(),
            serializer: Arc::new(SqlInsertSerializer::new(config.table.clone())),
            connection_backoff,
            cancel: CancellationToken::new(),
        })
    }

    /// Replace the payload format
    pub fn with_serializer(mut self, serializer: Arc<dyn QuerySerializer>) -> Self {
        self.serializer = serializer;
        self
    }

    /// Cut the connection backoff short when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    async fn back_off(&self) {
        if self.connection_backoff.is_zero() {
            return;
        }

        tokio::select! {
            _ = tokio::time::sleep(self.connection_backoff) => {}
            _ = self.cancel.cancelled() => {
                debug!(url = %self.exec_url, "Connection backoff interrupted by shutdown");
            }
        }
    }
}

/// Map a received response onto an outcome
async fn classify_response(response: Response) -> SendOutcome {
    let status = response.status();

    if status != StatusCode::OK {
        // The body is only a diagnostic here; an unreadable one is left empty
        let body = response.text().await.unwrap_or_default();
        return SendOutcome::TransportError {
            status: status.as_u16(),
            body,
        };
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return SendOutcome::UnknownError(format!("failed to read body: {}", e)),
    };

    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(value) => match value.get("error") {
            Some(serde_json::Value::String(message)) => {
                SendOutcome::ApplicationError(message.clone())
            }
            Some(other) => SendOutcome::ApplicationError(other.to_string()),
            None => SendOutcome::Success,
        },
        Err(e) => SendOutcome::UnknownError(format!("invalid response body: {}", e)),
    }
}

#[async_trait]
impl IngestionClient for HttpIngestionClient {
    async fn send(&self, position: &Position) -> SendOutcome {
        let timestamp = Utc::now();
        let query = self.serializer.serialize(position, timestamp);

        let result = self
            .client
            .get(&self.exec_url)
            .query(&[("query", query.as_str())])
            .send()
            .await;

        match result {
            Ok(response) => classify_response(response).await,
            Err(e) if e.is_connect() => {
                warn!(
                    symbol = %position.symbol,
                    url = %self.exec_url,
                    backoff_ms = self.connection_backoff.as_millis() as u64,
                    "Cannot connect to ingestion endpoint, backing off"
                );
                self.back_off().await;
                SendOutcome::ConnectionFailure(e.to_string())
            }
            Err(e) => SendOutcome::UnknownError(e.to_string()),
        }
    }

    fn endpoint(&self) -> &str {
        &self.exec_url
    }
}
