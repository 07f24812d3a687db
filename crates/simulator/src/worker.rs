//! Per-instrument bot.
//!
//! A worker owns one symbol, one generator and one client. It replays its
//! [`RoundPlan`] until the cancellation token fires; the token is checked
//! before every step and interrupts pauses, but a send that has started is
//! allowed to finish. Delivery failures are logged and counted, never
//! propagated: the affected position is simply lost.

use crate::generator::PositionGenerator;
use crate::plan::{pause, RoundPlan, Step};
use common::{Position, Side};
use ingest::{IngestionClient, SendOutcome};
use observability::IngestMetrics;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Longest response body excerpt written to the log
const BODY_EXCERPT_CHARS: usize = 100;

/// Lock-free counters published by a running worker
#[derive(Debug, Default)]
pub struct WorkerStats {
    attempts: AtomicU64,
    successes: AtomicU64,
    application_errors: AtomicU64,
    transport_errors: AtomicU64,
    connection_failures: AtomicU64,
    unknown_errors: AtomicU64,
    rounds_completed: AtomicU64,
}

/// Point-in-time copy of [`WorkerStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStatsSnapshot {
    pub attempts: u64,
    pub successes: u64,
    pub application_errors: u64,
    pub transport_errors: u64,
    pub connection_failures: u64,
    pub unknown_errors: u64,
    pub rounds_completed: u64,
}

impl WorkerStatsSnapshot {
    /// Positions that did not make it into the store
    pub fn lost(&self) -> u64 {
        self.attempts.saturating_sub(self.successes)
    }
}

impl WorkerStats {
    pub fn record(&self, outcome: &SendOutcome) {
        self.attempts.fetch_add(1, Ordering::Release);
        let counter = match outcome {
            SendOutcome::Success => &self.successes,
            SendOutcome::ApplicationError(_) => &self.application_errors,
            SendOutcome::TransportError { .. } => &self.transport_errors,
            SendOutcome::ConnectionFailure(_) => &self.connection_failures,
            SendOutcome::UnknownError(_) => &self.unknown_errors,
        };
        counter.fetch_add(1, Ordering::Release);
    }

    pub fn round_completed(&self) {
        self.rounds_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Outcome counters are loaded before `attempts`, so a snapshot taken
    /// while the worker runs never shows more outcomes than attempts.
    pub fn snapshot(&self) -> WorkerStatsSnapshot {
        let successes = self.successes.load(Ordering::Acquire);
        let application_errors = self.application_errors.load(Ordering::Acquire);
        let transport_errors = self.transport_errors.load(Ordering::Acquire);
        let connection_failures = self.connection_failures.load(Ordering::Acquire);
        let unknown_errors = self.unknown_errors.load(Ordering::Acquire);

        WorkerStatsSnapshot {
            attempts: self.attempts.load(Ordering::Acquire),
            successes,
            application_errors,
            transport_errors,
            connection_failures,
            unknown_errors,
            rounds_completed: self.rounds_completed.load(Ordering::Relaxed),
        }
    }
}

pub struct BotWorker {
    symbol: String,
    generator: PositionGenerator,
    client: Arc<dyn IngestionClient>,
    plan: Arc<RoundPlan>,
    stats: Arc<WorkerStats>,
    metrics: IngestMetrics,
}

impl BotWorker {
    pub fn new(
        symbol: impl Into<String>,
        generator: PositionGenerator,
        client: Arc<dyn IngestionClient>,
        plan: Arc<RoundPlan>,
    ) -> Self {
        let symbol = symbol.into();
        Self {
            metrics: IngestMetrics::new(&symbol),
            symbol,
            generator,
            client,
            plan,
            stats: Arc::new(WorkerStats::default()),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Shared handle to this worker's counters
    pub fn stats(&self) -> Arc<WorkerStats> {
        self.stats.clone()
    }

    /// Run rounds until `token` is cancelled.
    pub async fn run(mut self, token: CancellationToken) {
        info!(
            symbol = %self.symbol,
            endpoint = %self.client.endpoint(),
            sends_per_round = self.plan.sends(),
            "Bot started"
        );

        while self.run_round(&token).await {}

        let stats = self.stats.snapshot();
        info!(
            symbol = %self.symbol,
            rounds = stats.rounds_completed,
            attempts = stats.attempts,
            successes = stats.successes,
            lost = stats.lost(),
            "Bot stopped"
        );
    }

    /// Execute one round of the plan.
    ///
    /// Returns `false` if cancellation was observed before the round finished.
    pub async fn run_round(&mut self, token: &CancellationToken) -> bool {
        let plan = self.plan.clone();

        for step in plan.steps() {
            if token.is_cancelled() {
                return false;
            }

            match *step {
                Step::Send(side) => {
                    self.send_one(side).await;
                }
                Step::Pause(duration) => {
                    if !pause(token, duration).await {
                        return false;
                    }
                }
            }
        }

        self.stats.round_completed();
        self.metrics.round_completed();
        !token.is_cancelled()
    }

    /// Generate one position and deliver it
    async fn send_one(&mut self, side: Side) -> SendOutcome {
        let position = self.generator.generate(&self.symbol, side);

        let started = Instant::now();
        let outcome = self.client.send(&position).await;

        self.stats.record(&outcome);
        self.metrics.record_send(outcome.kind(), started.elapsed());
        log_outcome(&position, &outcome);

        outcome
    }
}

fn excerpt(body: &str) -> String {
    body.trim().chars().take(BODY_EXCERPT_CHARS).collect()
}

fn log_outcome(position: &Position, outcome: &SendOutcome) {
    let symbol = position.symbol.as_str();
    let ticket = position.ticket;
    let side = position.side.as_str();
    let kind = outcome.kind();

    match outcome {
        SendOutcome::Success => info!(
            symbol,
            ticket,
            side,
            profit = position.profit,
            outcome = kind,
            "Position saved"
        ),
        SendOutcome::ApplicationError(message) => error!(
            symbol,
            ticket,
            side,
            outcome = kind,
            error = %message,
            "Store rejected position"
        ),
        SendOutcome::TransportError { status, body } => error!(
            symbol,
            ticket,
            side,
            outcome = kind,
            status = *status,
            body = %excerpt(body),
            "HTTP error from ingestion endpoint"
        ),
        SendOutcome::ConnectionFailure(err) => warn!(
            symbol,
            ticket,
            side,
            outcome = kind,
            error = %err,
            "Ingestion endpoint unreachable, position dropped"
        ),
        SendOutcome::UnknownError(err) => error!(
            symbol,
            ticket,
            side,
            outcome = kind,
            error = %err,
            "Unexpected failure while sending position"
        ),
    }
}
