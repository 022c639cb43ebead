//! Business Logic Module
//!
//! Everything the CLI drives. The presentation layer (`api`) only reads
//! state exposed from here.

pub mod analysis;
pub mod backend;
pub mod config;
pub mod history;
pub mod lenient;
pub mod report;
pub mod timestamp;
