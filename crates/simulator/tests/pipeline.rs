//! Full bot pipeline: supervisor, workers, HTTP client and a fake store.

use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use common::Position;
use config::SimulatorConfig;
use ingest::{IngestionClient, MockIngestionClient, SendOutcome};
use simulator::{ClientFactory, Supervisor};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

type Queries = Arc<Mutex<Vec<String>>>;
type ClientResult = simulator::Result<Arc<dyn IngestionClient>>;

const INSERT_PREFIX: &str = "INSERT INTO positions(symbol, ticket, type, volume, price_open, \
                             price_current, profit, timestamp) VALUES(";

async fn exec_handler(
    State(queries): State<Queries>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    let query = params.get("query").cloned().unwrap_or_default();
    queries.lock().unwrap().push(query);
    Json(serde_json::json!({ "ddl": "OK" }))
}

async fn spawn_store() -> (String, Queries) {
    let queries: Queries = Arc::default();
    let router = Router::new()
        .route("/exec", get(exec_handler))
        .with_state(queries.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}", addr), queries)
}

fn two_instrument_config() -> SimulatorConfig {
    let mut config = SimulatorConfig::default();
    config.bot.instruments = vec!["EURUSD".to_string(), "XAUUSD".to_string()];
    config.bot.positions_per_round = 1;
    config
}

#[tokio::test]
async fn test_first_round_delivers_four_positions() {
    let (base_url, queries) = spawn_store().await;
    let mut config = two_instrument_config();
    config.ingestion.base_url = base_url;

    let mut supervisor = Supervisor::http(config);
    supervisor.start().await.unwrap();

    // Both bots are in their round pause until ~3s
    tokio::time::sleep(Duration::from_millis(1800)).await;
    let report = supervisor.shutdown(Duration::from_secs(5)).await;

    assert!(report.is_clean());
    assert_eq!(report.total_attempts(), 4);
    assert_eq!(report.total_successes(), 4);

    let queries = queries.lock().unwrap().clone();
    assert_eq!(queries.len(), 4);
    assert!(queries.iter().all(|q| q.starts_with(INSERT_PREFIX)));

    for symbol in ["EURUSD", "XAUUSD"] {
        let sides: Vec<&str> = queries
            .iter()
            .filter(|q| q.contains(&format!("'{}'", symbol)))
            .map(|q| if q.contains("'buy'") { "buy" } else { "sell" })
            .collect();
        assert_eq!(sides, vec!["buy", "sell"], "order for {}", symbol);
    }
}

/// Every send stalls for the backoff and then fails to connect
struct UnreachableClient {
    backoff: Duration,
}

#[async_trait]
impl IngestionClient for UnreachableClient {
    async fn send(&self, _position: &Position) -> SendOutcome {
        tokio::time::sleep(self.backoff).await;
        SendOutcome::ConnectionFailure("connection refused".to_string())
    }

    fn endpoint(&self) -> &str {
        "http://unreachable/exec"
    }
}

#[tokio::test(start_paused = true)]
async fn test_connection_failure_only_delays_its_own_bot() {
    let healthy = Arc::new(MockIngestionClient::new());
    let factory_healthy = healthy.clone();

    let factory: ClientFactory = Arc::new(
        move |symbol: &str, _token: CancellationToken| -> ClientResult {
            if symbol == "EURUSD" {
                Ok(Arc::new(UnreachableClient {
                    backoff: Duration::from_secs(5),
                }))
            } else {
                Ok(factory_healthy.clone())
            }
        },
    );

    let mut supervisor = Supervisor::new(two_instrument_config(), factory);
    supervisor.start().await.unwrap();

    // XAUUSD started at 200ms: sends at 200, 700 and 3200
    tokio::time::sleep(Duration::from_millis(3300)).await;

    assert_eq!(healthy.send_count(), 3);
    let eurusd = &supervisor.workers()[0];
    assert_eq!(eurusd.symbol(), "EURUSD");
    assert_eq!(eurusd.stats().attempts, 0);

    // The stalled send finishes at 5s and is counted as a connection failure
    tokio::time::sleep(Duration::from_millis(1600)).await;
    let eurusd = supervisor.workers()[0].stats();
    assert_eq!(eurusd.attempts, 1);
    assert_eq!(eurusd.connection_failures, 1);

    let report = supervisor.shutdown(Duration::from_secs(10)).await;
    assert!(report.is_clean());
}
