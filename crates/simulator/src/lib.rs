//! Synthetic position bots
//!
//! One [`BotWorker`] per instrument generates buy/sell positions with a
//! [`PositionGenerator`] and hands each one to an
//! [`IngestionClient`](ingest::IngestionClient), pacing itself with a
//! [`RoundPlan`]. The [`Supervisor`] starts the workers, keeps a registry
//! of their handles and stops them through a shared cancellation token.
//!
//! # Modules
//!
//! - [`generator`] - Synthetic position construction
//! - [`plan`] - Send/pause schedule of a round
//! - [`worker`] - Per-instrument bot loop and its counters
//! - [`supervisor`] - Worker startup, registry and drain
//! - [`shutdown`] - Cancellation token coordination

pub mod error;
pub mod generator;
pub mod plan;
pub mod shutdown;
pub mod supervisor;
pub mod worker;

pub use error::{Result, SimulatorError};
pub use generator::PositionGenerator;
pub use plan::{pause, RoundPlan, Step};
pub use shutdown::ShutdownController;
pub use supervisor::{ClientFactory, DrainReport, Supervisor, WorkerHandle};
pub use worker::{BotWorker, WorkerStats, WorkerStatsSnapshot};
