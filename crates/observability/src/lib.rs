//! Observability infrastructure for the position simulator
//!
//! This crate provides:
//! - Structured logging via tracing
//! - Prometheus metrics
//! - Per-instrument ingestion metric helpers
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! // Initialize logging
//! init_logging("possim", LogFormat::Pretty)?;
//!
//! // Initialize metrics (optional)
//! observability::metrics::init_metrics(9100)?;
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{init_metrics, IngestMetrics};
