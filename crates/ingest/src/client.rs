//! Ingestion client - trait and mock implementation

use crate::outcome::SendOutcome;
use async_trait::async_trait;
use common::Position;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// Client trait for the ingestion endpoint - protocol agnostic
#[async_trait]
pub trait IngestionClient: Send + Sync {
    /// Deliver one position and classify the result.
    ///
    /// Never retries: whatever the outcome, the position is done with.
    async fn send(&self, position: &Position) -> SendOutcome;

    /// Where positions go, for log lines
    fn endpoint(&self) -> &str;
}

// ==================== Mock Implementation ====================

/// Mock ingestion client for testing
///
/// Records every position it is given and answers with a fixed outcome.
pub struct MockIngestionClient {
    outcome: SendOutcome,
    latency: Option<Duration>,
    sent: Mutex<Vec<Position>>,
    send_count: AtomicUsize,
}

impl MockIngestionClient {
    /// Create a mock that always succeeds
    pub fn new() -> Self {
        Self {
            outcome: SendOutcome::Success,
            latency: None,
            sent: Mutex::new(Vec::new()),
            send_count: AtomicUsize::new(0),
        }
    }

    /// Configure the outcome returned for every send
    pub fn with_outcome(mut self, outcome: SendOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Simulate request latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of send attempts so far
    pub fn send_count(&self) -> usize {
        self.send_count.load(Ordering::SeqCst)
    }

    /// Positions received so far, in send order
    pub async fn sent(&self) -> Vec<Position> {
        self.sent.lock().await.clone()
    }
}

impl Default for MockIngestionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IngestionClient for MockIngestionClient {
    async fn send(&self, position: &Position) -> SendOutcome {
        self.send_count.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().await.push(position.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.outcome.clone()
    }

    fn endpoint(&self) -> &str {
        "mock://ingest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Side;

    fn create_test_position(side: Side) -> Position {
        Position::new("EURUSD", 100, side, 0.02, 1.1, 1.101)
    }

    #[tokio::test]
    async fn test_mock_records_positions() {
        let client = MockIngestionClient::new();

        let outcome = client.send(&create_test_position(Side::Buy)).await;
        client.send(&create_test_position(Side::Sell)).await;

        assert!(outcome.is_success());
        assert_eq!(client.send_count(), 2);
        let sides: Vec<_> = client.sent().await.iter().map(|p| p.side).collect();
        assert_eq!(sides, vec![Side::Buy, Side::Sell]);
    }

    #[tokio::test]
    async fn test_mock_configured_outcome() {
        let client = MockIngestionClient::new()
            .with_outcome(SendOutcome::ApplicationError("table does not exist".into()));

        let outcome = client.send(&create_test_position(Side::Buy)).await;

        assert_eq!(
            outcome,
            SendOutcome::ApplicationError("table does not exist".into())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_latency() {
        let client = MockIngestionClient::new().with_latency(Duration::from_millis(250));
        let start = tokio::time::Instant::now();

        client.send(&create_test_position(Side::Buy)).await;

        assert!(start.elapsed() >= Duration::from_millis(250));
    }
}
