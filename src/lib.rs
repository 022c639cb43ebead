//! Botnet Scan Client
//!
//! Client side of the botnet detection dashboard: uploads capture files
//! to the analysis backend, tracks the detection phases, normalizes the
//! verdict and browses the scan history.
//!
//! ## Structure
//! - `logic`: session controller, normalizer, history view, backends
//! - `api`: CLI commands over `logic`
//! - `constants`: defaults and environment lookups

pub mod api;
pub mod constants;
pub mod error;
pub mod logic;
