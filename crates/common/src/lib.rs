//! Shared types for the position simulator
//!
//! - [`types`] - Side, instrument category and the position record
//!   with its rounding and profit rules

pub mod types;

pub use types::*;
