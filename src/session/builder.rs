use std::sync::Arc;

use crate::board::BoardTopology;
use crate::config::{StartPosition, TimingConfig};
use crate::dice::{DiceRoller, RandomDice};
use crate::engine::TurnEngine;
use crate::error::{ConfigurationErrorKind, GameResult};
use crate::rng::{Pcg32, SeedableRng};
use crate::session::game_session::GameSession;
use crate::session::roster::PlayerRoster;
use crate::telemetry::ViolationObserver;
use crate::{MAX_PLAYERS, MIN_PLAYERS};

/// Default event queue size.
/// Events older than this threshold are dropped if not polled.
pub(crate) const DEFAULT_EVENT_QUEUE_SIZE: usize = 100;
/// Smallest accepted event queue. One turn emits up to a dozen events.
pub(crate) const MIN_EVENT_QUEUE_SIZE: usize = 10;
/// PCG stream of the cosmetic dice, kept apart from the authoritative dice stream.
const COSMETIC_STREAM: u64 = 0x00c0_ffee;

/// The [`SessionBuilder`] builds a [`GameSession`].
///
/// Configure the board, pacing and dice, register 2 to 4 players, then call
/// [`start_session`](Self::start_session) to consume the builder.
///
/// # Example
///
/// ```
/// use ladder_session::{BoardTopology, SessionBuilder, StartPosition, TimingConfig};
///
/// # fn main() -> Result<(), ladder_session::GameError> {
/// let session = SessionBuilder::new()
///     .with_topology(BoardTopology::standard())
///     .with_timing(TimingConfig::relaxed())
///     .with_start_position(StartPosition::OffBoard)
///     .with_seed(42)
///     .add_player("Ada")?
///     .add_player("Grace")?
///     .add_player("Edsger")?
///     .start_session()?;
/// assert_eq!(session.players().len(), 3);
/// # Ok(())
/// # }
/// ```
#[must_use = "SessionBuilder must be consumed by calling start_session()"]
pub struct SessionBuilder {
    topology: BoardTopology,
    timing: TimingConfig,
    dice: Option<Box<dyn DiceRoller>>,
    seed: Option<u64>,
    roster: PlayerRoster,
    /// Optional observer for rule violations.
    violation_observer: Option<Arc<dyn ViolationObserver>>,
    /// Maximum number of events to queue before oldest are dropped.
    event_queue_size: usize,
}

impl std::fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Destructure so a new field cannot be forgotten here.
        let Self {
            topology,
            timing,
            dice,
            seed,
            roster,
            violation_observer,
            event_queue_size,
        } = self;

        f.debug_struct("SessionBuilder")
            .field("topology", topology)
            .field("timing", timing)
            .field("dice", &dice.as_ref().map(|_| "<custom>"))
            .field("seed", seed)
            .field("roster", roster)
            .field("has_violation_observer", &violation_observer.is_some())
            .field("event_queue_size", event_queue_size)
            .finish()
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBuilder {
    /// Construct a new builder with all values set to their defaults:
    /// the standard board, classic timing, entropy-seeded dice and tokens on cell 1.
    pub fn new() -> Self {
        Self {
            topology: BoardTopology::standard(),
            timing: TimingConfig::default(),
            dice: None,
            seed: None,
            roster: PlayerRoster::new(StartPosition::default()),
            violation_observer: None,
            event_queue_size: DEFAULT_EVENT_QUEUE_SIZE,
        }
    }

    /// Registers a player. Turn order is registration order.
    ///
    /// # Errors
    /// - [`ConfigurationErrorKind::TooManyPlayers`] if four players are already registered.
    /// - [`ConfigurationErrorKind::EmptyPlayerName`], [`ConfigurationErrorKind::PlayerNameTooLong`]
    ///   or [`ConfigurationErrorKind::DuplicatePlayerName`] for a bad name.
    pub fn add_player(mut self, name: &str) -> GameResult<Self> {
        self.roster.add(name)?;
        Ok(self)
    }

    /// Uses a custom board. Default is [`BoardTopology::standard`].
    pub fn with_topology(mut self, topology: BoardTopology) -> Self {
        self.topology = topology;
        self
    }

    /// Changes the pacing of the timed phases. Validated in [`start_session`](Self::start_session).
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Uses `dice` as the authoritative dice source. Takes precedence over [`with_seed`](Self::with_seed)
    /// for the authoritative rolls.
    pub fn with_dice<D: DiceRoller + 'static>(mut self, dice: D) -> Self {
        self.dice = Some(Box::new(dice));
        self
    }

    /// Seeds both the dice and the cosmetic faces, making the whole game reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Changes where tokens start. Default is [`StartPosition::OnBoard`].
    pub fn with_start_position(mut self, start: StartPosition) -> Self {
        self.roster.set_start(start);
        self
    }

    /// Sets the maximum number of events kept between two calls to
    /// [`GameSession::events`]. When full, the oldest events are dropped. Default is 100.
    ///
    /// # Errors
    /// Returns [`ConfigurationErrorKind::EventQueueTooSmall`] below 10.
    ///
    /// ```
    /// use ladder_session::SessionBuilder;
    ///
    /// assert!(SessionBuilder::new().with_event_queue_size(200).is_ok());
    /// assert!(SessionBuilder::new().with_event_queue_size(5).is_err());
    /// ```
    pub fn with_event_queue_size(mut self, size: usize) -> GameResult<Self> {
        if size < MIN_EVENT_QUEUE_SIZE {
            return Err(ConfigurationErrorKind::EventQueueTooSmall {
                size,
                min: MIN_EVENT_QUEUE_SIZE,
            }
            .into());
        }
        self.event_queue_size = size;
        Ok(self)
    }

    /// Routes rule violations detected by the session to `observer` instead of the log.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use ladder_session::SessionBuilder;
    /// use ladder_session::telemetry::CollectingObserver;
    ///
    /// let observer = Arc::new(CollectingObserver::new());
    /// let builder = SessionBuilder::new().with_violation_observer(observer.clone());
    /// ```
    pub fn with_violation_observer(mut self, observer: Arc<dyn ViolationObserver>) -> Self {
        self.violation_observer = Some(observer);
        self
    }

    /// Consumes the builder and creates the session, ready for the first player's roll.
    ///
    /// # Errors
    /// - [`ConfigurationErrorKind::NotEnoughPlayers`] with fewer than two players.
    /// - [`ConfigurationErrorKind::InvalidTiming`] if the timing is out of range.
    pub fn start_session(self) -> GameResult<GameSession> {
        if self.roster.len() < MIN_PLAYERS {
            return Err(ConfigurationErrorKind::NotEnoughPlayers {
                min: MIN_PLAYERS,
                actual: self.roster.len(),
            }
            .into());
        }
        debug_assert!(self.roster.len() <= MAX_PLAYERS);
        self.timing.validate()?;

        let (dice, cosmetic): (Box<dyn DiceRoller>, Pcg32) = match self.seed {
            Some(seed) => (
                self.dice
                    .unwrap_or_else(|| Box::new(RandomDice::seeded(seed))),
                Pcg32::new(seed, COSMETIC_STREAM),
            ),
            None => (
                self.dice.unwrap_or_else(|| Box::new(RandomDice::from_entropy())),
                Pcg32::from_entropy(),
            ),
        };

        Ok(GameSession::from_parts(
            self.topology,
            self.roster,
            TurnEngine::new(self.timing, cosmetic),
            dice,
            self.event_queue_size,
            self.violation_observer,
        ))
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
    use crate::{Cell, GameError};

    fn config_kind<T: std::fmt::Debug>(result: GameResult<T>) -> ConfigurationErrorKind {
        match result {
            Err(GameError::Configuration { kind }) => kind,
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn requires_two_players() {
        let result = SessionBuilder::new().add_player("Ada").unwrap().start_session();
        assert_eq!(
            config_kind(result),
            ConfigurationErrorKind::NotEnoughPlayers { min: 2, actual: 1 }
        );
        assert_eq!(
            config_kind(SessionBuilder::new().start_session()),
            ConfigurationErrorKind::NotEnoughPlayers { min: 2, actual: 0 }
        );
    }

    #[test]
    fn rejects_fifth_player() {
        let builder = ["A", "B", "C", "D"]
            .iter()
            .fold(SessionBuilder::new(), |b, name| b.add_player(name).unwrap());
        assert_eq!(
            config_kind(builder.add_player("E")),
            ConfigurationErrorKind::TooManyPlayers { max: 4 }
        );
    }

    #[test]
    fn rejects_invalid_timing() {
        let timing = TimingConfig {
            roll_duration: TimingConfig::MAX_PHASE_DURATION * 2,
            ..TimingConfig::default()
        };
        let result = SessionBuilder::new()
            .with_timing(timing)
            .add_player("Ada")
            .unwrap()
            .add_player("Grace")
            .unwrap()
            .start_session();
        assert!(matches!(
            config_kind(result),
            ConfigurationErrorKind::InvalidTiming { .. }
        ));
    }

    #[test]
    fn event_queue_minimum() {
        assert_eq!(
            config_kind(SessionBuilder::new().with_event_queue_size(9)),
            ConfigurationErrorKind::EventQueueTooSmall { size: 9, min: 10 }
        );
        assert!(SessionBuilder::new().with_event_queue_size(10).is_ok());
    }

    #[test]
    fn start_position_applies_to_players_added_before_and_after() {
        let session = SessionBuilder::new()
            .add_player("Ada")
            .unwrap()
            .with_start_position(StartPosition::OffBoard)
            .add_player("Grace")
            .unwrap()
            .start_session()
            .unwrap();
        assert!(session
            .players()
            .iter()
            .all(|p| p.position() == Cell::OFF_BOARD));
    }

    #[test]
    fn debug_output_hides_dice() {
        let builder = SessionBuilder::new().with_dice(crate::ScriptedDice::new([1]).unwrap());
        let text = format!("{builder:?}");
        assert!(text.contains("<custom>"), "{text}");
        assert!(text.contains("event_queue_size: 100"), "{text}");
    }
}
