//! Roulette application orchestrator.
//!
//! This module provides:
//! - `core`: Roulette struct owning the in-memory roster and its store
//! - `tasks`: Spin animation and latest-spin-wins reveal
//! - `tests`: Unit tests for both

pub mod core;
pub mod tasks;

// Re-export main types and structs
pub use core::Roulette;
pub use tasks::{SpinHandle, SpinOutcome, Spinner, SPIN_FRAME_MS};

#[cfg(test)]
mod tests;
