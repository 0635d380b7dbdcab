//! Verification integration tests.
//!
//! This module contains property-based and determinism tests:
//! - Property tests - movement and turn-order properties checked with proptest
//! - Determinism tests - identical seeds and ticks produce identical games

// Shared test infrastructure
#[path = "common/mod.rs"]
mod common;

// Verification test modules
mod verification {
    pub mod determinism;
    pub mod property;
}
