//! Gameplay integration tests.
//!
//! This module drives whole sessions through the public API:
//! - Turns - roll acceptance, busy rejection, round-robin order, pacing
//! - Scenarios - concrete board situations (ladders, snakes, overshoot, wins)
//! - Restart - resetting a finished game

// Shared test infrastructure
#[path = "common/mod.rs"]
mod common;

// Gameplay test modules
mod gameplay {
    pub mod restart;
    pub mod scenarios;
    pub mod turns;
}
