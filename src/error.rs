use std::error::Error;
use std::fmt;
use std::fmt::Display;

use crate::{Cell, TurnState};

/// Convenience alias for results returned by this crate.
pub type GameResult<T> = std::result::Result<T, GameError>;

/// This enum contains all error messages this library can return. Most API functions will generally return a [`Result<(), GameError>`].
///
/// Every rejected command leaves the session untouched: either the whole operation applies or none of it does.
///
/// [`Result<(), GameError>`]: std::result::Result
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameError {
    /// The session or board was set up with invalid data. Surfaced at setup time and never silently corrected.
    Configuration {
        /// Further specifies what was wrong with the configuration.
        kind: ConfigurationErrorKind,
    },
    /// A command arrived while the engine is busy with another phase (rolling, animating or handing over the turn).
    ///
    /// This is recoverable: retry once the engine is back in [`TurnState::AwaitingRoll`].
    Busy {
        /// The state the engine was in when the command was rejected.
        state: TurnState,
    },
    /// A command is not valid in the current state at all (e.g. restarting a game that has not ended).
    InvalidState {
        /// The state the engine was in when the command was rejected.
        state: TurnState,
        /// The state the command requires.
        expected: TurnState,
    },
}

/// Detailed reasons for [`GameError::Configuration`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ConfigurationErrorKind {
    /// A player was added to a session that already holds the maximum number of players.
    TooManyPlayers {
        /// The maximum number of players a session accepts.
        max: usize,
    },
    /// The game was started with fewer players than required.
    NotEnoughPlayers {
        /// The minimum number of players a session requires.
        min: usize,
        /// The number of players actually registered.
        actual: usize,
    },
    /// A player name was empty after trimming whitespace.
    EmptyPlayerName,
    /// A player name is already used by another player in this session.
    DuplicatePlayerName {
        /// The offending name.
        name: String,
    },
    /// A player name exceeds the maximum length.
    PlayerNameTooLong {
        /// Length of the offending name in characters.
        len: usize,
        /// Maximum allowed length in characters.
        max: usize,
    },
    /// Players can only be registered before the first roll.
    SessionAlreadyStarted,
    /// A topology entry references a cell outside the playable track.
    CellOutOfRange {
        /// The offending cell.
        cell: Cell,
    },
    /// The final cell must not carry a snake or ladder.
    TransitionFromFinalCell,
    /// A topology entry maps a cell onto itself.
    SelfLoop {
        /// The offending cell.
        cell: Cell,
    },
    /// A snake must lead to a strictly lower cell.
    SnakeNotDescending {
        /// The snake's head.
        head: Cell,
        /// The snake's tail.
        tail: Cell,
    },
    /// A ladder must lead to a strictly higher cell.
    LadderNotAscending {
        /// The ladder's bottom.
        bottom: Cell,
        /// The ladder's top.
        top: Cell,
    },
    /// A cell is both a snake head and a ladder bottom.
    OverlappingTransition {
        /// The offending cell.
        cell: Cell,
    },
    /// A transition lands on the start of another transition.
    ChainedTransition {
        /// Start of the first transition.
        from: Cell,
        /// Destination of the first transition, which is itself a transition start.
        via: Cell,
    },
    /// A timing value is outside the accepted range.
    InvalidTiming {
        /// Why the value was rejected.
        reason: String,
    },
    /// The event queue must be able to hold at least a full turn worth of events.
    EventQueueTooSmall {
        /// The requested size.
        size: usize,
        /// The minimum accepted size.
        min: usize,
    },
    /// A scripted dice source needs at least one value.
    EmptyDiceScript,
    /// A scripted dice value is not a valid die face.
    InvalidDieFace {
        /// The offending value.
        value: u8,
    },
}

impl Display for ConfigurationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyPlayers { max } => {
                write!(f, "cannot add another player, the session is full ({} players)", max)
            },
            Self::NotEnoughPlayers { min, actual } => {
                write!(
                    f,
                    "at least {} players are required to play, but only {} registered",
                    min, actual
                )
            },
            Self::EmptyPlayerName => write!(f, "player name must not be empty"),
            Self::DuplicatePlayerName { name } => {
                write!(f, "player name '{}' is already taken", name)
            },
            Self::PlayerNameTooLong { len, max } => {
                write!(
                    f,
                    "player name is {} characters long, at most {} are allowed",
                    len, max
                )
            },
            Self::SessionAlreadyStarted => {
                write!(f, "players can only be added before the first roll")
            },
            Self::CellOutOfRange { cell } => {
                write!(f, "cell {} is outside the board", cell)
            },
            Self::TransitionFromFinalCell => {
                write!(f, "the final cell cannot start a snake or ladder")
            },
            Self::SelfLoop { cell } => write!(f, "cell {} maps onto itself", cell),
            Self::SnakeNotDescending { head, tail } => {
                write!(f, "snake {} -> {} does not lead downwards", head, tail)
            },
            Self::LadderNotAscending { bottom, top } => {
                write!(f, "ladder {} -> {} does not lead upwards", bottom, top)
            },
            Self::OverlappingTransition { cell } => {
                write!(f, "cell {} is both a snake head and a ladder bottom", cell)
            },
            Self::ChainedTransition { from, via } => {
                write!(
                    f,
                    "transition from {} lands on {}, which starts another transition",
                    from, via
                )
            },
            Self::InvalidTiming { reason } => write!(f, "invalid timing: {}", reason),
            Self::EventQueueTooSmall { size, min } => {
                write!(f, "event queue size {} is below the minimum of {}", size, min)
            },
            Self::EmptyDiceScript => write!(f, "scripted dice need at least one value"),
            Self::InvalidDieFace { value } => {
                write!(f, "{} is not a face of a six-sided die", value)
            },
        }
    }
}

impl Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::Configuration { kind } => {
                write!(f, "Configuration error: {}", kind)
            },
            GameError::Busy { state } => {
                write!(
                    f,
                    "The engine is busy ({:?}); retry once it awaits the next roll.",
                    state
                )
            },
            GameError::InvalidState { state, expected } => {
                write!(
                    f,
                    "Invalid state: the command requires {:?}, but the engine is {:?}.",
                    expected, state
                )
            },
        }
    }
}

impl Error for GameError {}

impl From<ConfigurationErrorKind> for GameError {
    fn from(kind: ConfigurationErrorKind) -> Self {
        GameError::Configuration { kind }
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

    #[test]
    fn configuration_kind_converts_into_game_error() {
        let err: GameError = ConfigurationErrorKind::EmptyPlayerName.into();
        assert_eq!(
            err,
            GameError::Configuration {
                kind: ConfigurationErrorKind::EmptyPlayerName
            }
        );
    }

    #[test]
    fn busy_display_names_the_state() {
        let err = GameError::Busy {
            state: TurnState::Animating,
        };
        let text = err.to_string();
        assert!(text.contains("Animating"), "{text}");
    }

    #[test]
    fn invalid_state_display_names_both_states() {
        let err = GameError::InvalidState {
            state: TurnState::AwaitingRoll,
            expected: TurnState::GameOver,
        };
        let text = err.to_string();
        assert!(text.contains("AwaitingRoll"), "{text}");
        assert!(text.contains("GameOver"), "{text}");
    }

    #[test]
    fn configuration_display_includes_details() {
        let err: GameError = ConfigurationErrorKind::SnakeNotDescending {
            head: Cell::new(10),
            tail: Cell::new(20),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Configuration error: snake 10 -> 20 does not lead downwards"
        );
    }

    #[test]
    fn errors_implement_std_error() {
        fn assert_error<E: Error>(_: &E) {}
        let err = GameError::Busy {
            state: TurnState::RollInProgress,
        };
        assert_error(&err);
    }
}
