//! API Module
//!
//! Command surface of the CLI. Each command builds a backend from the
//! runtime configuration, drives the logic layer and prints the outcome.

pub mod commands;

#[cfg(test)]
mod tests;

pub use commands::*;
