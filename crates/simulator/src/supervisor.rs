//! Bot fleet supervisor
//!
//! Builds one [`BotWorker`] per configured instrument, each with its own
//! generator and client, and spawns it on the runtime. Handles are kept in
//! a registry so the fleet can be inspected and drained on shutdown.

use crate::error::{Result, SimulatorError};
use crate::generator::PositionGenerator;
use crate::plan::{pause, RoundPlan};
use crate::shutdown::ShutdownController;
use crate::worker::{BotWorker, WorkerStats, WorkerStatsSnapshot};
use config::SimulatorConfig;
use ingest::{HttpIngestionClient, IngestionClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};

/// Builds the client for one instrument.
///
/// The token is the worker's own; clients that block (connection backoff)
/// should give up when it is cancelled.
pub type ClientFactory =
    Arc<dyn Fn(&str, CancellationToken) -> Result<Arc<dyn IngestionClient>> + Send + Sync>;

/// A running bot in the registry
pub struct WorkerHandle {
    symbol: String,
    stats: Arc<WorkerStats>,
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn stats(&self) -> WorkerStatsSnapshot {
        self.stats.snapshot()
    }

    /// Stop this bot only; the rest of the fleet keeps running
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

/// What happened to each bot during drain
#[derive(Debug, Default)]
pub struct DrainReport {
    /// Bots that returned before the drain timeout
    pub stopped: Vec<String>,
    /// Bots still running at the timeout, aborted
    pub aborted: Vec<String>,
    /// Final counters per bot, in start order
    pub stats: Vec<(String, WorkerStatsSnapshot)>,
}

impl DrainReport {
    pub fn is_clean(&self) -> bool {
        self.aborted.is_empty()
    }

    pub fn total_successes(&self) -> u64 {
        self.stats.iter().map(|(_, s)| s.successes).sum()
    }

    pub fn total_attempts(&self) -> u64 {
        self.stats.iter().map(|(_, s)| s.attempts).sum()
    }
}

pub struct Supervisor {
    config: SimulatorConfig,
    factory: ClientFactory,
    shutdown: ShutdownController,
    workers: Vec<WorkerHandle>,
    started: bool,
}

impl Supervisor {
    pub fn new(config: SimulatorConfig, factory: ClientFactory) -> Self {
        Self {
            config,
            factory,
            shutdown: ShutdownController::new(),
            workers: Vec::new(),
            started: false,
        }
    }

    /// Supervisor whose bots deliver over HTTP to the configured endpoint
    pub fn http(config: SimulatorConfig) -> Self {
        let ingestion = config.ingestion.clone();
        let backoff = config.cadence.connection_backoff();

        let factory: ClientFactory = Arc::new(
            move |_symbol: &str, token: CancellationToken| -> Result<Arc<dyn IngestionClient>> {
                let client =
                    HttpIngestionClient::new(&ingestion, backoff)?.with_cancellation(token);
                Ok(Arc::new(client))
            },
        );

        Self::new(config, factory)
    }

    /// Use an externally owned controller, e.g. one wired to Ctrl+C
    pub fn with_shutdown(mut self, shutdown: ShutdownController) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn shutdown_controller(&self) -> &ShutdownController {
        &self.shutdown
    }

    pub fn workers(&self) -> &[WorkerHandle] {
        &self.workers
    }

    /// Spawn one bot per instrument, `stagger` apart.
    ///
    /// Returns early without error if shutdown is requested while staggering.
    /// If a client cannot be built, bots already launched are cancelled and
    /// the error is returned.
    pub async fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(SimulatorError::AlreadyStarted);
        }
        if self.config.bot.instruments.is_empty() {
            return Err(SimulatorError::NoInstruments);
        }
        self.started = true;

        let plan = Arc::new(RoundPlan::from_config(
            &self.config.bot,
            &self.config.cadence,
        ));
        let stagger = self.config.cadence.stagger();
        let root = self.shutdown.token();
        let instruments = self.config.bot.instruments.clone();

        for (index, symbol) in instruments.iter().enumerate() {
            if index > 0 && !pause(&root, stagger).await {
                warn!(
                    launched = self.workers.len(),
                    "Shutdown requested during startup"
                );
                break;
            }

            let token = self.shutdown.child_token();
            let client = match (self.factory)(symbol, token.clone()) {
                Ok(client) => client,
                Err(e) => {
                    error!(symbol = %symbol, error = %e, "Failed to build ingestion client");
                    self.shutdown.shutdown();
                    return Err(e);
                }
            };
            let generator = match self.config.bot.seed {
                Some(seed) => PositionGenerator::from_seed(seed.wrapping_add(index as u64)),
                None => PositionGenerator::from_entropy(),
            };

            let worker = BotWorker::new(symbol.clone(), generator, client, plan.clone());
            let stats = worker.stats();
            let join = tokio::spawn(
                worker
                    .run(token.clone())
                    .instrument(info_span!("bot", symbol = %symbol)),
            );

            info!(symbol = %symbol, index, "Bot launched");
            self.workers.push(WorkerHandle {
                symbol: symbol.clone(),
                stats,
                token,
                join,
            });
        }

        Ok(())
    }

    /// Cancel every bot and wait up to `drain_timeout` for them to return.
    ///
    /// Bots still running at the deadline are aborted. The registry is
    /// emptied either way.
    pub async fn shutdown(&mut self, drain_timeout: Duration) -> DrainReport {
        self.shutdown.shutdown();

        let deadline = tokio::time::Instant::now() + drain_timeout;
        let mut report = DrainReport::default();

        for mut handle in self.workers.drain(..) {
            match tokio::time::timeout_at(deadline, &mut handle.join).await {
                Ok(Ok(())) => report.stopped.push(handle.symbol.clone()),
                Ok(Err(e)) => {
                    warn!(symbol = %handle.symbol, error = %e, "Bot task failed");
                    report.stopped.push(handle.symbol.clone());
                }
                Err(_) => {
                    warn!(symbol = %handle.symbol, "Bot did not stop in time, aborting");
                    handle.join.abort();
                    report.aborted.push(handle.symbol.clone());
                }
            }
            report
                .stats
                .push((handle.symbol.clone(), handle.stats.snapshot()));
        }

        report
    }

    /// Start the fleet, block until shutdown is requested, then drain.
    pub async fn run_until_shutdown(&mut self) -> Result<DrainReport> {
        info!(
            url = %self.config.ingestion.exec_url(),
            instruments = ?self.config.bot.instruments,
            positions_per_round = self.config.bot.positions_per_round,
            positions_per_cycle = self.config.bot.positions_per_cycle(),
            "Starting position simulator"
        );

        self.start().await?;
        self.shutdown.wait_for_shutdown().await;

        let report = self.shutdown(self.config.shutdown.drain_timeout()).await;
        info!(
            stopped = report.stopped.len(),
            aborted = report.aborted.len(),
            attempts = report.total_attempts(),
            successes = report.total_successes(),
            "Position simulator stopped"
        );

        Ok(report)
    }
}
