use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use crate::board::BoardTopology;
use crate::config::{StartPosition, TimingConfig};
use crate::dice::{DiceRoller, RandomDice};
use crate::engine::{Tick, TurnContext, TurnEngine};
use crate::error::{ConfigurationErrorKind, GameError, GameResult};
use crate::rng::{Pcg32, SeedableRng};
use crate::session::builder::{SessionBuilder, DEFAULT_EVENT_QUEUE_SIZE};
use crate::session::event_drain::EventDrain;
use crate::session::roster::{Player, PlayerRoster};
use crate::session::snapshot::GameSnapshot;
use crate::telemetry::{
    InvariantChecker, InvariantViolation, ViolationKind, ViolationObserver, ViolationSeverity,
};
use crate::{
    debug_check_invariants, report_violation_to, GameEvent, PlayerId, TurnState, MIN_PLAYERS,
};

/// A running game of Snakes and Ladders.
///
/// The session is a pure state machine. It owns the players, the board, the dice and the
/// [`TurnEngine`], and never touches a clock, a window or a speaker. A presentation layer drives it
/// with three calls:
///
/// - [`roll_dice`](Self::roll_dice) when the active player asks to roll,
/// - [`tick`](Self::tick) once per frame with the elapsed time,
/// - [`events`](Self::events) to learn what happened, and [`snapshot`](Self::snapshot) to draw.
///
/// Every command either applies completely or is rejected with no side effect.
pub struct GameSession {
    topology: BoardTopology,
    roster: PlayerRoster,
    engine: TurnEngine,
    dice: Box<dyn DiceRoller>,
    /// Contains all events to be forwarded to the user.
    event_queue: VecDeque<GameEvent>,
    max_events: usize,
    /// Events produced by the current tick, before they are queued.
    pending: Vec<GameEvent>,
    /// Set by the first roll. Players can no longer join afterwards.
    started: bool,
    violation_observer: Option<Arc<dyn ViolationObserver>>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("players", &self.roster.len())
            .field("state", &self.engine.state())
            .field("active_player", &self.engine.active_player())
            .field("winner", &self.engine.winner())
            .field("queued_events", &self.event_queue.len())
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// Creates a session without players on the standard board, with classic timing and
    /// entropy-seeded dice. Register players with [`add_player`](Self::add_player).
    ///
    /// Use [`GameSession::builder`] for anything else.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(
            BoardTopology::standard(),
            PlayerRoster::new(StartPosition::default()),
            TurnEngine::new(TimingConfig::default(), Pcg32::from_entropy()),
            Box::new(RandomDice::from_entropy()),
            DEFAULT_EVENT_QUEUE_SIZE,
            None,
        )
    }

    /// Shorthand for [`SessionBuilder::new`].
    #[must_use]
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub(crate) fn from_parts(
        topology: BoardTopology,
        roster: PlayerRoster,
        engine: TurnEngine,
        dice: Box<dyn DiceRoller>,
        max_events: usize,
        violation_observer: Option<Arc<dyn ViolationObserver>>,
    ) -> Self {
        Self {
            topology,
            roster,
            engine,
            dice,
            event_queue: VecDeque::with_capacity(max_events),
            max_events,
            pending: Vec::new(),
            started: false,
            violation_observer,
        }
    }

    /// Registers a player and returns their id. Turn order is registration order.
    ///
    /// # Errors
    /// - [`ConfigurationErrorKind::SessionAlreadyStarted`] once the first roll was made.
    /// - [`ConfigurationErrorKind::TooManyPlayers`] if four players are already registered.
    /// - A name error as described in [`PlayerRoster::validate_name`].
    pub fn add_player(&mut self, name: &str) -> GameResult<PlayerId> {
        if self.started {
            debug!("Rejected player {:?}: session already started", name);
            return Err(ConfigurationErrorKind::SessionAlreadyStarted.into());
        }
        let id = self.roster.add(name)?;
        debug!("Player {} joined as {}", id, name.trim());
        Ok(id)
    }

    /// Starts the active player's roll. The outcome is decided when the roll phase ends in
    /// [`tick`](Self::tick).
    ///
    /// # Errors
    /// - [`GameError::Busy`] while a roll, an animation or a turn handoff is in progress.
    ///   Nothing changes; try again once the state is back to [`TurnState::AwaitingRoll`].
    /// - [`GameError::InvalidState`] after the game is over. Call [`restart`](Self::restart).
    /// - [`ConfigurationErrorKind::NotEnoughPlayers`] with fewer than two players.
    pub fn roll_dice(&mut self) -> GameResult<()> {
        let state = self.engine.state();
        if state == TurnState::GameOver {
            debug!("Rejected roll: game is over");
            return Err(GameError::InvalidState {
                state,
                expected: TurnState::AwaitingRoll,
            });
        }
        if !state.accepts_roll() {
            debug!("Rejected roll: engine busy in {:?}", state);
            return Err(GameError::Busy { state });
        }
        if self.roster.len() < MIN_PLAYERS {
            return Err(ConfigurationErrorKind::NotEnoughPlayers {
                min: MIN_PLAYERS,
                actual: self.roster.len(),
            }
            .into());
        }

        self.started = true;
        self.engine.begin_roll();
        debug_check_invariants!(self, observer = self.violation_observer, "after roll_dice");
        Ok(())
    }

    /// Drives time forward. Pass the time elapsed since the previous call, or [`Tick::Advance`]
    /// to finish the current timed phase at once.
    ///
    /// At most one path entry is played back per call. Ticks outside the timed phases are ignored.
    pub fn tick(&mut self, tick: impl Into<Tick>) {
        let tick = tick.into();
        let mut ctx = TurnContext {
            topology: &self.topology,
            dice: self.dice.as_mut(),
            roster: &mut self.roster,
            events: &mut self.pending,
            observer: &self.violation_observer,
        };
        self.engine.tick(tick, &mut ctx);
        self.flush_pending();
        debug_check_invariants!(self, observer = self.violation_observer, "after tick");
    }

    /// Starts a new game with the same players once the current one is over.
    ///
    /// Every token goes back to the start cell and player 0 moves first.
    ///
    /// # Errors
    /// [`GameError::InvalidState`] unless the state is [`TurnState::GameOver`]. Nothing changes.
    pub fn restart(&mut self) -> GameResult<()> {
        let state = self.engine.state();
        if state != TurnState::GameOver {
            debug!("Rejected restart in {:?}", state);
            return Err(GameError::InvalidState {
                state,
                expected: TurnState::GameOver,
            });
        }
        self.roster.reset_positions();
        self.engine.restart();
        self.pending.push(GameEvent::GameRestarted);
        self.flush_pending();
        debug!("Game restarted with {} players", self.roster.len());
        debug_check_invariants!(self, observer = self.violation_observer, "after restart");
        Ok(())
    }

    /// Returns all events that happened since last queried for events. If the number of stored
    /// events exceeds the configured queue size, the oldest events are discarded.
    pub fn events(&mut self) -> EventDrain<'_> {
        EventDrain::from_drain(self.event_queue.drain(..))
    }

    /// Number of events waiting to be drained.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }

    /// A self-contained copy of the state a presentation layer draws from.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(&self.roster, &self.engine)
    }

    /// All players in turn order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        self.roster.players()
    }

    /// The player with the given id.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.roster.get(id)
    }

    /// The player whose turn it is.
    #[must_use]
    pub fn active_player(&self) -> PlayerId {
        self.engine.active_player()
    }

    /// The current engine state.
    #[must_use]
    pub fn state(&self) -> TurnState {
        self.engine.state()
    }

    /// The winner, once the game is over.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.engine.winner()
    }

    /// The turn state machine, for read-only inspection.
    #[must_use]
    pub fn engine(&self) -> &TurnEngine {
        &self.engine
    }

    /// The board this game is played on.
    #[must_use]
    pub fn topology(&self) -> &BoardTopology {
        &self.topology
    }

    /// The pacing of the timed phases.
    #[must_use]
    pub fn timing(&self) -> TimingConfig {
        self.engine.timing()
    }

    /// Returns `true` once the first roll was made.
    #[must_use]
    pub fn has_started(&self) -> bool {
        self.started
    }

    /// The observer receiving rule violations, if one was configured.
    #[must_use]
    pub fn violation_observer(&self) -> Option<&Arc<dyn ViolationObserver>> {
        self.violation_observer.as_ref()
    }

    fn flush_pending(&mut self) {
        self.event_queue.extend(self.pending.drain(..));
        let mut dropped = 0_usize;
        while self.event_queue.len() > self.max_events {
            self.event_queue.pop_front();
            dropped += 1;
        }
        if dropped > 0 {
            report_violation_to!(
                self.violation_observer,
                turn = self.engine.turns_completed();
                ViolationSeverity::Warning,
                ViolationKind::EventQueue,
                "event queue full ({} events), dropped the {} oldest",
                self.max_events,
                dropped
            );
        }
    }
}

impl InvariantChecker for GameSession {
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.engine.check_invariants()?;

        let players = self.roster.len();
        if self.started && !self.engine.active_player().is_valid_for(players) {
            return Err(InvariantViolation::new(
                "GameSession",
                "active player must be a registered player",
            )
            .with_details(format!(
                "active={}, players={}",
                self.engine.active_player(),
                players
            )));
        }
        if let Some(winner) = self.engine.winner() {
            let on_final = self
                .roster
                .position(winner)
                .is_some_and(|cell| cell.is_final());
            if !on_final {
                return Err(InvariantViolation::new(
                    "GameSession",
                    "the winner's token rests on the final cell",
                )
                .with_details(format!("winner={winner}")));
            }
        }
        if let Some(player) = self
            .roster
            .iter()
            .find(|p| p.position().as_u8() > crate::BOARD_CELLS)
        {
            return Err(InvariantViolation::new(
                "GameSession",
                "tokens stay on the track",
            )
            .with_details(format!("{} on {}", player.id(), player.position())));
        }
        if self.event_queue.len() > self.max_events {
            return Err(InvariantViolation::new(
                "GameSession",
                "event queue stays within its bound",
            )
            .with_details(format!(
                "len={}, max={}",
                self.event_queue.len(),
                self.max_events
            )));
        }
        Ok(())
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
    use crate::dice::ScriptedDice;
    use crate::telemetry::CollectingObserver;
    use crate::Cell;

    fn session(rolls: &[u8]) -> GameSession {
        SessionBuilder::new()
            .with_dice(ScriptedDice::new(rolls.iter().copied()).unwrap())
            .with_timing(TimingConfig::instant())
            .add_player("Ada")
            .unwrap()
            .add_player("Grace")
            .unwrap()
            .start_session()
            .unwrap()
    }

    fn finish_turn(session: &mut GameSession) {
        session.roll_dice().unwrap();
        while session.state().is_busy() {
            session.tick(Tick::Advance);
        }
    }

    #[test]
    fn new_session_accepts_players_until_first_roll() {
        let mut session = GameSession::new();
        assert_eq!(session.add_player("Ada").unwrap(), PlayerId::new(0));
        assert_eq!(
            session.roll_dice(),
            Err(GameError::Configuration {
                kind: ConfigurationErrorKind::NotEnoughPlayers { min: 2, actual: 1 }
            })
        );
        assert_eq!(session.state(), TurnState::AwaitingRoll);

        session.add_player("Grace").unwrap();
        session.roll_dice().unwrap();
        assert!(session.has_started());
        assert_eq!(
            session.add_player("Edsger"),
            Err(GameError::Configuration {
                kind: ConfigurationErrorKind::SessionAlreadyStarted
            })
        );
        assert_eq!(session.players().len(), 2);
    }

    #[test]
    fn busy_roll_is_rejected_without_side_effects() {
        let mut session = session(&[4]);
        session.roll_dice().unwrap();
        let before = session.snapshot();

        assert_eq!(
            session.roll_dice(),
            Err(GameError::Busy {
                state: TurnState::RollInProgress
            })
        );
        assert_eq!(session.snapshot(), before);

        session.tick(Tick::Advance);
        assert_eq!(session.state(), TurnState::Animating);
        assert_eq!(
            session.roll_dice(),
            Err(GameError::Busy {
                state: TurnState::Animating
            })
        );
    }

    #[test]
    fn restart_only_after_game_over() {
        let mut session = session(&[3]);
        assert_eq!(
            session.restart(),
            Err(GameError::InvalidState {
                state: TurnState::AwaitingRoll,
                expected: TurnState::GameOver
            })
        );
    }

    #[test]
    fn events_are_drained_once() {
        let mut session = session(&[1]);
        finish_turn(&mut session);
        let events: Vec<_> = session.events().collect();
        assert_eq!(
            events,
            vec![
                GameEvent::DiceRolled {
                    player: PlayerId::new(0),
                    value: 1
                },
                GameEvent::PlayerMoved {
                    player: PlayerId::new(0),
                    from: Cell::new(1),
                    to: Cell::new(2)
                },
                GameEvent::TurnAdvanced {
                    from: PlayerId::new(0),
                    to: PlayerId::new(1)
                },
            ]
        );
        assert_eq!(session.pending_events(), 0);
        assert_eq!(session.events().len(), 0);
    }

    #[test]
    fn full_event_queue_drops_oldest_and_reports() {
        let observer = Arc::new(CollectingObserver::new());
        let mut session = SessionBuilder::new()
            .with_dice(ScriptedDice::new([6]).unwrap())
            .with_timing(TimingConfig::instant())
            .with_event_queue_size(10)
            .unwrap()
            .with_violation_observer(observer.clone())
            .add_player("Ada")
            .unwrap()
            .add_player("Grace")
            .unwrap()
            .start_session()
            .unwrap();

        // each turn of six hops emits 8 events
        finish_turn(&mut session);
        finish_turn(&mut session);

        assert_eq!(session.pending_events(), 10);
        crate::assert_violation!(observer, ViolationKind::EventQueue);
        let last = session.events().next_back();
        assert_eq!(
            last,
            Some(GameEvent::TurnAdvanced {
                from: PlayerId::new(1),
                to: PlayerId::new(0)
            })
        );
    }

    #[test]
    fn debug_output_summarizes_session() {
        let session = session(&[1]);
        let text = format!("{session:?}");
        assert!(text.starts_with("GameSession"), "{text}");
        assert!(text.contains("AwaitingRoll"), "{text}");
    }

    #[cfg(any(debug_assertions, feature = "paranoid"))]
    #[test]
    fn broken_invariant_reaches_session_observer() {
        let observer = Arc::new(CollectingObserver::new());
        let mut session = SessionBuilder::new()
            .with_dice(ScriptedDice::new([1]).unwrap())
            .with_violation_observer(observer.clone())
            .add_player("Ada")
            .unwrap()
            .add_player("Grace")
            .unwrap()
            .start_session()
            .unwrap();
        crate::assert_no_violations!(observer);

        session.roster.set_position(PlayerId::new(0), Cell::new(120));
        session.tick(Tick::Advance);

        crate::assert_violation!(observer, ViolationKind::Invariant);
        let violation = &observer.violations_of_kind(ViolationKind::Invariant)[0];
        assert!(violation.message.contains("after tick"), "{violation}");
    }

    #[test]
    fn invariants_hold_on_fresh_session() {
        let session = session(&[1]);
        assert!(session.check_invariants().is_ok());
    }
}
