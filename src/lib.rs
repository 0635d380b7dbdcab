//! # Ladder Session
//!
//! Ladder Session is a headless, tick-driven engine for the classic Snakes and Ladders board game.
//! It owns everything that carries state or policy: turn order, dice resolution, the hop-by-hop
//! movement path including snake and ladder jumps, and win detection. Drawing, sound and input
//! widgets stay outside; they read [`GameSnapshot`]s, drain [`GameEvent`]s and call session commands.
//!
//! The engine has no timers or threads of its own. The presentation loop drives time forward by
//! calling [`GameSession::tick`] with the elapsed time (or a plain [`Tick::Advance`] signal), and
//! the engine decides when the dice settle and when the token takes its next hop.
//!
//! ```
//! use ladder_session::prelude::*;
//!
//! # fn main() -> Result<(), GameError> {
//! let mut session = SessionBuilder::new()
//!     .with_dice(ScriptedDice::new([3, 4])?)
//!     .with_timing(TimingConfig::instant())
//!     .add_player("Ada")?
//!     .add_player("Grace")?
//!     .start_session()?;
//!
//! session.roll_dice()?;
//! while session.state() != TurnState::AwaitingRoll {
//!     session.tick(Tick::Advance);
//! }
//!
//! // Ada started on cell 1 and rolled a 3.
//! assert_eq!(session.player(PlayerId::new(0)).map(|p| p.position()), Some(Cell::new(14)));
//! assert_eq!(session.active_player(), PlayerId::new(1));
//! # Ok(())
//! # }
//! ```
//!
//! Cell 4 is the bottom of the ladder to 14 on the standard board.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use board::{BoardTopology, GridPosition, Transition, TransitionKind};
pub use config::{StartPosition, TimingConfig};
pub use dice::{DiceRoller, DieFace, RandomDice, ScriptedDice};
pub use engine::{Tick, TurnEngine};
pub use error::{ConfigurationErrorKind, GameError, GameResult};
pub use movement::{resolve, MovementPath, PathAnomaly};
pub use session::builder::SessionBuilder;
pub use session::event_drain::EventDrain;
pub use session::game_session::GameSession;
pub use session::roster::{Player, PlayerRoster, TokenColor};
pub use session::snapshot::{GameSnapshot, PlayerSnapshot};

/// Board topology: snakes, ladders and the layout of the 10×10 track.
pub mod board;
/// Timing and start-position configuration.
pub mod config;
/// Dice sources, random and scripted.
pub mod dice;
/// The turn state machine.
pub mod engine;
mod error;
pub mod hash;
/// Movement resolution: from a start cell and a roll to the exact hop sequence.
pub mod movement;
pub mod prelude;
/// Internal random number generator module based on PCG32.
///
/// Provides a minimal, high-quality PRNG so the crate does not need the `rand` crate.
/// See the module documentation for usage details.
pub mod rng;
pub mod telemetry;

/// Session orchestration: players, events, snapshots and the command API.
pub mod session {
    /// Consuming builder for [`GameSession`](crate::GameSession).
    pub mod builder;
    /// Draining iterator over queued [`GameEvent`](crate::GameEvent)s.
    pub mod event_drain;
    /// The [`GameSession`](crate::GameSession) aggregate.
    pub mod game_session;
    /// Registered players and their token identities.
    pub mod roster;
    /// Read-only views of a session for the presentation layer.
    pub mod snapshot;
}

// #############
// # CONSTANTS #
// #############

/// Number of cells on the track. The last cell is the goal.
pub const BOARD_CELLS: u8 = 100;

/// Width (and height) of the square board grid.
pub const GRID_WIDTH: u8 = 10;

/// Fewest players a game can be started with.
pub const MIN_PLAYERS: usize = 2;

/// Most players a session accepts.
pub const MAX_PLAYERS: usize = 4;

/// Longest accepted player name, in characters.
pub const MAX_NAME_LEN: usize = 15;

/// A cell on the track.
///
/// Cells are numbered `1..=100`. The special value [`Cell::OFF_BOARD`] (0) marks a token that has
/// not entered the board yet, used when a session starts with [`StartPosition::OffBoard`].
///
/// # Examples
///
/// ```
/// use ladder_session::Cell;
///
/// let cell = Cell::new(97);
/// assert_eq!(cell.checked_advance(3), Some(Cell::FINAL));
/// assert_eq!(cell.checked_advance(4), None); // would overshoot
/// assert!(Cell::FINAL.is_final());
/// assert!(!Cell::OFF_BOARD.is_on_board());
/// ```
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Cell(u8);

impl Cell {
    /// The position of a token that has not entered the board yet.
    pub const OFF_BOARD: Cell = Cell(0);

    /// The first cell of the track.
    pub const FIRST: Cell = Cell(1);

    /// The goal. Resting here wins the game.
    pub const FINAL: Cell = Cell(BOARD_CELLS);

    /// Creates a new `Cell` from its number.
    ///
    /// Note: This does not validate the number. Use [`Cell::is_on_board()`] to check it.
    #[inline]
    #[must_use]
    pub const fn new(cell: u8) -> Self {
        Cell(cell)
    }

    /// Returns the cell number.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Returns `true` if this cell lies on the track (`1..=100`).
    #[inline]
    #[must_use]
    pub const fn is_on_board(self) -> bool {
        self.0 >= 1 && self.0 <= BOARD_CELLS
    }

    /// Returns `true` if this is the goal cell.
    #[inline]
    #[must_use]
    pub const fn is_final(self) -> bool {
        self.0 == BOARD_CELLS
    }

    /// Returns `true` if this is the off-board start position.
    #[inline]
    #[must_use]
    pub const fn is_off_board(self) -> bool {
        self.0 == 0
    }

    /// Moves `steps` cells forward, or returns `None` if that would pass the final cell.
    #[inline]
    #[must_use]
    pub const fn checked_advance(self, steps: u8) -> Option<Cell> {
        let target = self.0 as u16 + steps as u16;
        if target > BOARD_CELLS as u16 {
            None
        } else {
            Some(Cell(target as u8))
        }
    }

    /// Returns the next cell along the track, or `None` past the final cell.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Option<Cell> {
        self.checked_advance(1)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for Cell {
    #[inline]
    fn from(value: u8) -> Self {
        Cell(value)
    }
}

impl From<Cell> for u8 {
    #[inline]
    fn from(cell: Cell) -> Self {
        cell.0
    }
}

impl PartialEq<u8> for Cell {
    #[inline]
    fn eq(&self, other: &u8) -> bool {
        self.0 == *other
    }
}

impl PartialOrd<u8> for Cell {
    #[inline]
    fn partial_cmp(&self, other: &u8) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

/// A stable identifier for a registered player.
///
/// Players are numbered `0..N-1` in registration order, which is also the turn order.
///
/// # Examples
///
/// ```
/// use ladder_session::PlayerId;
///
/// let first = PlayerId::new(0);
/// assert!(first.is_valid_for(2));
/// assert_eq!(first.next_in(3), PlayerId::new(1));
/// assert_eq!(PlayerId::new(2).next_in(3), first);
/// ```
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct PlayerId(usize);

impl PlayerId {
    /// Creates a new `PlayerId` from its index.
    #[inline]
    #[must_use]
    pub const fn new(index: usize) -> Self {
        PlayerId(index)
    }

    /// Returns the index of the player in turn order.
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }

    /// Returns `true` if this id refers to a player in a session with `num_players` players.
    #[inline]
    #[must_use]
    pub const fn is_valid_for(self, num_players: usize) -> bool {
        self.0 < num_players
    }

    /// Returns the player whose turn follows this one in a session with `num_players` players.
    ///
    /// A session without players has no successor; the id is returned unchanged.
    #[inline]
    #[must_use]
    pub const fn next_in(self, num_players: usize) -> Self {
        if num_players == 0 {
            self
        } else {
            PlayerId((self.0 + 1) % num_players)
        }
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for PlayerId {
    #[inline]
    fn from(value: usize) -> Self {
        PlayerId(value)
    }
}

impl From<PlayerId> for usize {
    #[inline]
    fn from(id: PlayerId) -> Self {
        id.0
    }
}

// #############
// #   ENUMS   #
// #############

/// The engine is always in one of these states. Query it via [`GameSession::state`].
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub enum TurnState {
    /// Waiting for the active player to roll. This is where every turn starts.
    #[default]
    AwaitingRoll,
    /// The dice are tumbling. Only cosmetic faces are available until the roll settles.
    RollInProgress,
    /// The active token is hopping along its movement path, one cell per tick.
    Animating,
    /// The turn is resolved and the engine pauses before handing over to the next player.
    RoundComplete,
    /// Someone reached the final cell. Only [`GameSession::restart`] leaves this state.
    GameOver,
}

impl TurnState {
    /// Returns `true` if a roll may be requested in this state.
    #[inline]
    #[must_use]
    pub const fn accepts_roll(self) -> bool {
        matches!(self, TurnState::AwaitingRoll)
    }

    /// Returns `true` while a turn is being resolved and commands are rejected as busy.
    #[inline]
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(
            self,
            TurnState::RollInProgress | TurnState::Animating | TurnState::RoundComplete
        )
    }
}

/// How a single hop along a movement path came about.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum StepKind {
    /// An ordinary one-cell hop.
    Move,
    /// A slide from a snake's head down to its tail.
    Snake,
    /// A climb from a ladder's bottom up to its top.
    Ladder,
}

/// Notifications emitted by the session. Drain them with [`GameSession::events`].
///
/// # Forward Compatibility
///
/// This enum is marked `#[non_exhaustive]` because new event types may be
/// added in future versions. Always include a wildcard arm when matching:
///
/// ```ignore
/// match event {
///     GameEvent::PlayerMoved { player, to, .. } => { /* hop token */ }
///     GameEvent::PlayerWon { player } => { /* celebrate */ }
///     _ => { /* handle unknown events */ }
/// }
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[non_exhaustive]
pub enum GameEvent {
    /// The dice settled on their authoritative value.
    DiceRolled {
        /// The player who rolled.
        player: PlayerId,
        /// The rolled value, `1..=6`.
        value: u8,
    },
    /// A token hopped one cell forward.
    PlayerMoved {
        /// The moving player.
        player: PlayerId,
        /// The cell the token left.
        from: Cell,
        /// The cell the token reached.
        to: Cell,
    },
    /// A token landed on a snake's head and slid down.
    SnakeHit {
        /// The moving player.
        player: PlayerId,
        /// The snake's head, where the token landed.
        head: Cell,
        /// The snake's tail, where the token rests.
        tail: Cell,
    },
    /// A token landed on a ladder's bottom and climbed up.
    LadderHit {
        /// The moving player.
        player: PlayerId,
        /// The ladder's bottom, where the token landed.
        bottom: Cell,
        /// The ladder's top, where the token rests.
        top: Cell,
    },
    /// The roll would have carried the token past the final cell, so it stayed put.
    MoveBlocked {
        /// The player whose move was blocked.
        player: PlayerId,
        /// The cell the token stays on.
        cell: Cell,
        /// The roll that overshot.
        roll: u8,
    },
    /// The turn passed to the next player.
    TurnAdvanced {
        /// The player whose turn ended.
        from: PlayerId,
        /// The player whose turn begins.
        to: PlayerId,
    },
    /// A token came to rest on the final cell.
    PlayerWon {
        /// The winner.
        player: PlayerId,
    },
    /// A finished game was reset with the same players.
    GameRestarted,
}

// ###################
// # UNIT TESTS      #
// ###################

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    // ==========================================
    // Cell Tests
    // ==========================================

    #[test]
    fn cell_constants() {
        assert_eq!(Cell::OFF_BOARD.as_u8(), 0);
        assert_eq!(Cell::FIRST.as_u8(), 1);
        assert_eq!(Cell::FINAL.as_u8(), 100);
    }

    #[test]
    fn cell_on_board_range() {
        assert!(!Cell::new(0).is_on_board());
        assert!(Cell::new(1).is_on_board());
        assert!(Cell::new(100).is_on_board());
        assert!(!Cell::new(101).is_on_board());
    }

    #[test]
    fn cell_checked_advance_stops_at_final() {
        assert_eq!(Cell::new(94).checked_advance(6), Some(Cell::FINAL));
        assert_eq!(Cell::new(95).checked_advance(6), None);
        assert_eq!(Cell::OFF_BOARD.checked_advance(1), Some(Cell::FIRST));
    }

    #[test]
    fn cell_checked_advance_does_not_wrap_near_u8_max() {
        assert_eq!(Cell::new(250).checked_advance(10), None);
    }

    #[test]
    fn cell_next_past_final_is_none() {
        assert_eq!(Cell::new(99).next(), Some(Cell::FINAL));
        assert_eq!(Cell::FINAL.next(), None);
    }

    #[test]
    fn cell_compares_with_u8() {
        assert_eq!(Cell::new(42), 42);
        assert!(Cell::new(42) > 41);
        assert!(Cell::new(42) < 43);
    }

    #[test]
    fn cell_display() {
        assert_eq!(Cell::new(56).to_string(), "56");
    }

    // ==========================================
    // PlayerId Tests
    // ==========================================

    #[test]
    fn player_id_round_robin() {
        let mut id = PlayerId::new(0);
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(id.as_usize());
            id = id.next_in(4);
        }
        assert_eq!(seen, vec![0, 1, 2, 3]);
        assert_eq!(id, PlayerId::new(0));
    }

    #[test]
    fn player_id_next_in_empty_session_is_identity() {
        assert_eq!(PlayerId::new(0).next_in(0), PlayerId::new(0));
    }

    #[test]
    fn player_id_validity() {
        assert!(PlayerId::new(1).is_valid_for(2));
        assert!(!PlayerId::new(2).is_valid_for(2));
    }

    // ==========================================
    // TurnState Tests
    // ==========================================

    #[test]
    fn turn_state_default_is_awaiting_roll() {
        assert_eq!(TurnState::default(), TurnState::AwaitingRoll);
    }

    #[test]
    fn only_awaiting_roll_accepts_roll() {
        assert!(TurnState::AwaitingRoll.accepts_roll());
        assert!(!TurnState::RollInProgress.accepts_roll());
        assert!(!TurnState::Animating.accepts_roll());
        assert!(!TurnState::RoundComplete.accepts_roll());
        assert!(!TurnState::GameOver.accepts_roll());
    }

    #[test]
    fn busy_states() {
        assert!(!TurnState::AwaitingRoll.is_busy());
        assert!(TurnState::RollInProgress.is_busy());
        assert!(TurnState::Animating.is_busy());
        assert!(TurnState::RoundComplete.is_busy());
        assert!(!TurnState::GameOver.is_busy());
    }

    #[test]
    fn turn_state_debug_format() {
        assert_eq!(format!("{:?}", TurnState::RollInProgress), "RollInProgress");
        assert_eq!(format!("{:?}", TurnState::GameOver), "GameOver");
    }

    // ==========================================
    // GameEvent Tests
    // ==========================================

    #[test]
    fn game_event_snake_hit_fields() {
        let event = GameEvent::SnakeHit {
            player: PlayerId::new(1),
            head: Cell::new(56),
            tail: Cell::new(53),
        };

        if let GameEvent::SnakeHit { player, head, tail } = event {
            assert_eq!(player, PlayerId::new(1));
            assert!(tail < head);
        } else {
            panic!("Expected SnakeHit event");
        }
    }

    #[test]
    fn game_event_equality() {
        let a = GameEvent::PlayerWon {
            player: PlayerId::new(0),
        };
        let b = GameEvent::PlayerWon {
            player: PlayerId::new(0),
        };
        let c = GameEvent::PlayerWon {
            player: PlayerId::new(1),
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
