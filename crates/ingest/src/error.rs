//! Ingestion error types

use thiserror::Error;

/// Errors raised while setting up a client.
///
/// Failures of an individual delivery are not errors, they are reported
/// as [`SendOutcome`](crate::SendOutcome) values.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// Result type for ingestion setup
pub type Result<T> = std::result::Result<T, IngestError>;
