//! Convenient re-exports for common usage.
//!
//! This module provides a "prelude" that re-exports the types a presentation layer needs to
//! run a game, allowing you to import them all at once.
//!
//! # Usage
//!
//! ```rust
//! use ladder_session::prelude::*;
//! ```
//!
//! # What's Included
//!
//! - **Session types**: [`GameSession`], [`SessionBuilder`], [`GameSnapshot`], [`EventDrain`]
//! - **Driving time**: [`Tick`], [`TimingConfig`]
//! - **Fundamental types**: [`Cell`], [`PlayerId`], [`TurnState`], [`GameEvent`]
//! - **Board and dice**: [`BoardTopology`], [`DiceRoller`], [`RandomDice`], [`ScriptedDice`]
//! - **Error handling**: [`GameError`], [`GameResult`]
//!
//! # Example
//!
//! ```rust
//! use ladder_session::prelude::*;
//!
//! # fn main() -> GameResult<()> {
//! let mut session = SessionBuilder::new()
//!     .with_seed(7)
//!     .with_timing(TimingConfig::instant())
//!     .add_player("Ada")?
//!     .add_player("Grace")?
//!     .start_session()?;
//!
//! while session.winner().is_none() {
//!     session.roll_dice()?;
//!     while session.state().is_busy() {
//!         session.tick(Tick::Advance);
//!     }
//!     session.events().for_each(drop);
//! }
//! assert_eq!(session.state(), TurnState::GameOver);
//! # Ok(())
//! # }
//! ```

// Core session types
pub use crate::session::builder::SessionBuilder;
pub use crate::session::event_drain::EventDrain;
pub use crate::session::game_session::GameSession;
pub use crate::session::roster::{Player, TokenColor};
pub use crate::session::snapshot::{GameSnapshot, PlayerSnapshot};

// Driving time
pub use crate::config::{StartPosition, TimingConfig};
pub use crate::engine::Tick;

// Fundamental types
pub use crate::{Cell, GameEvent, PlayerId, TurnState};

// Board and dice
pub use crate::board::BoardTopology;
pub use crate::dice::{DiceRoller, RandomDice, ScriptedDice};

// Error handling
pub use crate::error::{GameError, GameResult};
