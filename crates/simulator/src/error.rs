//! Simulator error types

use thiserror::Error;

/// Errors that stop the supervisor from starting bots.
///
/// Nothing a running bot encounters is turned into one of these.
#[derive(Error, Debug)]
pub enum SimulatorError {
    /// No instrument to run a bot for
    #[error("No instruments configured")]
    NoInstruments,

    /// Workers were already started by this supervisor
    #[error("Supervisor already started")]
    AlreadyStarted,

    /// Building an ingestion client failed
    #[error("Ingestion client error: {0}")]
    Ingest(#[from] ingest::IngestError),
}

/// Result type for simulator operations
pub type Result<T> = std::result::Result<T, SimulatorError>;
