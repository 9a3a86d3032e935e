//! # lumi-core
//!
//! Core types and error handling for per-bunch luminosity processing.
//!
//! This crate provides:
//! - Common error types
//! - Per-bunch record and per-interval summary data structures
//! - Facility timing constants

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod error;
pub mod types;

pub use constants::LumiConstants;
pub use error::{Error, Result};
pub use types::{BunchRecord, BunchSlot, IntervalSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
