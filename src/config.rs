//! Configuration types for game sessions.
//!
//! | Config Type | Purpose | Key Presets |
//! |-------------|---------|-------------|
//! | `TimingConfig` | Pacing of dice tumble, hops and turn handoff | `classic()`, `instant()`, `relaxed()` |
//! | `StartPosition` | Where tokens begin | `OnBoard`, `OffBoard` |
//!
//! # Example
//!
//! ```
//! use ladder_session::{SessionBuilder, StartPosition, TimingConfig};
//!
//! let builder = SessionBuilder::new()
//!     .with_timing(TimingConfig::instant())
//!     .with_start_position(StartPosition::OffBoard);
//! ```

use web_time::Duration;

use crate::error::{ConfigurationErrorKind, GameResult};
use crate::Cell;

/// Pacing of the timed phases of a turn.
///
/// The engine never reads a clock. These durations are compared against the time handed to
/// [`GameSession::tick`](crate::GameSession::tick), so a presentation loop running at any frame
/// rate sees the same pacing.
///
/// # Forward Compatibility
///
/// New fields may be added to this struct in future versions. Always use the
/// `..TimingConfig::default()` pattern when constructing instances.
///
/// # Example
///
/// ```
/// use ladder_session::TimingConfig;
/// use web_time::Duration;
///
/// let snappy = TimingConfig {
///     step_delay: Duration::from_millis(120),
///     ..TimingConfig::default()
/// };
/// assert!(snappy.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[must_use = "TimingConfig has no effect unless passed to SessionBuilder::with_timing()"]
pub struct TimingConfig {
    /// How long the dice tumble before the roll settles.
    ///
    /// Default: 1000ms
    pub roll_duration: Duration,

    /// Minimum time between two hops of the moving token.
    ///
    /// Default: 300ms
    pub step_delay: Duration,

    /// Pause after a resolved turn before the next player may roll.
    /// Zero skips the [`RoundComplete`](crate::TurnState::RoundComplete) pause entirely.
    ///
    /// Default: 0ms
    pub handoff_delay: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::classic()
    }
}

impl TimingConfig {
    /// Longest accepted duration for any single phase.
    pub const MAX_PHASE_DURATION: Duration = Duration::from_secs(60);

    /// Creates a new `TimingConfig` with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// The pacing of the desktop game: a one second tumble and 300ms per hop.
    pub const fn classic() -> Self {
        Self {
            roll_duration: Duration::from_millis(1000),
            step_delay: Duration::from_millis(300),
            handoff_delay: Duration::ZERO,
        }
    }

    /// No delays at all. Every tick completes the current phase step.
    ///
    /// Suited to headless simulation, bots and tests.
    pub const fn instant() -> Self {
        Self {
            roll_duration: Duration::ZERO,
            step_delay: Duration::ZERO,
            handoff_delay: Duration::ZERO,
        }
    }

    /// Slower pacing with a visible pause between turns, for younger players or hot-seat play.
    pub const fn relaxed() -> Self {
        Self {
            roll_duration: Duration::from_millis(1500),
            step_delay: Duration::from_millis(450),
            handoff_delay: Duration::from_millis(800),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationErrorKind::InvalidTiming`] if any phase is longer than
    /// [`Self::MAX_PHASE_DURATION`].
    pub fn validate(&self) -> GameResult<()> {
        let phases = [
            ("roll_duration", self.roll_duration),
            ("step_delay", self.step_delay),
            ("handoff_delay", self.handoff_delay),
        ];
        for (field, value) in phases {
            if value > Self::MAX_PHASE_DURATION {
                return Err(ConfigurationErrorKind::InvalidTiming {
                    reason: format!(
                        "{} is {}ms, at most {}ms are allowed",
                        field,
                        value.as_millis(),
                        Self::MAX_PHASE_DURATION.as_millis()
                    ),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Where tokens stand before their first move.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub enum StartPosition {
    /// Tokens start on cell 1. A ladder on cell 1 is only taken by landing on it.
    #[default]
    OnBoard,
    /// Tokens start off the board (cell 0); a roll of 1 enters on cell 1.
    OffBoard,
}

impl StartPosition {
    /// The cell tokens start on.
    #[must_use]
    pub const fn cell(self) -> Cell {
        match self {
            StartPosition::OnBoard => Cell::FIRST,
            StartPosition::OffBoard => Cell::OFF_BOARD,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::GameError;

    #[test]
    fn default_is_classic() {
        assert_eq!(TimingConfig::default(), TimingConfig::classic());
        assert_eq!(TimingConfig::new().roll_duration, Duration::from_millis(1000));
        assert_eq!(TimingConfig::new().step_delay, Duration::from_millis(300));
        assert_eq!(TimingConfig::new().handoff_delay, Duration::ZERO);
    }

    #[test]
    fn presets_are_valid() {
        for preset in [
            TimingConfig::classic(),
            TimingConfig::instant(),
            TimingConfig::relaxed(),
        ] {
            assert!(preset.validate().is_ok(), "{preset:?}");
        }
    }

    #[test]
    fn maximum_phase_duration_is_accepted() {
        let config = TimingConfig {
            handoff_delay: TimingConfig::MAX_PHASE_DURATION,
            ..TimingConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overlong_phase_is_rejected_with_field_name() {
        let config = TimingConfig {
            step_delay: Duration::from_secs(61),
            ..TimingConfig::default()
        };
        match config.validate() {
            Err(GameError::Configuration {
                kind: ConfigurationErrorKind::InvalidTiming { reason },
            }) => assert!(reason.contains("step_delay"), "{reason}"),
            other => panic!("expected InvalidTiming, got {other:?}"),
        }
    }

    #[test]
    fn start_position_cells() {
        assert_eq!(StartPosition::default(), StartPosition::OnBoard);
        assert_eq!(StartPosition::OnBoard.cell(), Cell::FIRST);
        assert_eq!(StartPosition::OffBoard.cell(), Cell::OFF_BOARD);
    }
}
