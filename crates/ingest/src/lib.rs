//! Delivery of synthetic positions to the time-series store
//!
//! A [`QuerySerializer`] turns one position plus its send-time timestamp
//! into a self-contained write request; an [`IngestionClient`] delivers it
//! and classifies what happened as a [`SendOutcome`]. Delivery is
//! at-most-once: no outcome causes the same position to be sent again.

pub mod client;
pub mod error;
pub mod http;
pub mod outcome;
pub mod serializer;

pub use client::{IngestionClient, MockIngestionClient};
pub use error::{IngestError, Result};
pub use http::HttpIngestionClient;
pub use outcome::SendOutcome;
pub use serializer::{format_timestamp, QuerySerializer, SqlInsertSerializer};
