//! Common test infrastructure shared across integration tests.
//!
//! Provides session constructors with scripted dice and helpers that drive a session through
//! whole turns without caring about timing.
//!
//! # Usage
//!
//! From any integration test root file:
//! ```ignore
//! #[path = "common/mod.rs"]
//! mod common;
//! use common::{scripted_session, play_turn};
//! ```

#![allow(dead_code, clippy::panic, clippy::unwrap_used)]

use std::sync::Arc;

use ladder_session::telemetry::{CollectingObserver, ViolationObserver};
use ladder_session::{
    BoardTopology, GameEvent, GameSession, PlayerId, ScriptedDice, SessionBuilder, Tick,
    TimingConfig, TurnState,
};

/// Upper bound on ticks a single turn may take before a helper gives up.
pub const MAX_TICKS_PER_TURN: usize = 64;

/// Default player names, in turn order.
pub const NAMES: [&str; 4] = ["Ada", "Grace", "Edsger", "Barbara"];

/// A builder with scripted dice, instant timing and `players` registered.
pub fn scripted_builder(rolls: &[u8], players: usize) -> SessionBuilder {
    NAMES.iter().take(players).fold(
        SessionBuilder::new()
            .with_dice(ScriptedDice::new(rolls.iter().copied()).unwrap())
            .with_timing(TimingConfig::instant()),
        |builder, name| builder.add_player(name).unwrap(),
    )
}

/// A started session with scripted dice, instant timing and `players` registered.
pub fn scripted_session(rolls: &[u8], players: usize) -> GameSession {
    scripted_builder(rolls, players).start_session().unwrap()
}

/// Same as [`scripted_session`] on a custom board.
pub fn scripted_session_on(topology: BoardTopology, rolls: &[u8], players: usize) -> GameSession {
    scripted_builder(rolls, players)
        .with_topology(topology)
        .start_session()
        .unwrap()
}

/// A started session reporting violations to the returned collector.
pub fn observed_session(
    rolls: &[u8],
    players: usize,
) -> (GameSession, Arc<CollectingObserver>) {
    let observer = Arc::new(CollectingObserver::new());
    let session = scripted_builder(rolls, players)
        .with_violation_observer(observer.clone() as Arc<dyn ViolationObserver>)
        .start_session()
        .unwrap();
    (session, observer)
}

/// Ticks until the engine is no longer busy.
pub fn settle(session: &mut GameSession) {
    for _ in 0..MAX_TICKS_PER_TURN {
        if !session.state().is_busy() {
            return;
        }
        session.tick(Tick::Advance);
    }
    panic!("session stuck in {:?}", session.state());
}

/// Rolls for the active player and plays the turn to its end. Returns the turn's events.
pub fn play_turn(session: &mut GameSession) -> Vec<GameEvent> {
    session.roll_dice().unwrap();
    settle(session);
    session.events().collect()
}

/// Plays turns until someone wins or `max_turns` have been played. Returns the winner.
pub fn play_until_won(session: &mut GameSession, max_turns: usize) -> Option<PlayerId> {
    for _ in 0..max_turns {
        if session.state() == TurnState::GameOver {
            break;
        }
        play_turn(session);
    }
    session.winner()
}

/// The cell the given player's token stands on.
pub fn position_of(session: &GameSession, player: usize) -> u8 {
    session
        .player(PlayerId::new(player))
        .map(|p| p.position().as_u8())
        .unwrap()
}

/// The cells visited by `PlayerMoved`, `SnakeHit` and `LadderHit` events, starting with the
/// first `from` cell.
pub fn visited_cells(events: &[GameEvent]) -> Vec<u8> {
    let mut cells = Vec::new();
    for event in events {
        let (from, to) = match *event {
            GameEvent::PlayerMoved { from, to, .. } => (from, to),
            GameEvent::SnakeHit { head, tail, .. } => (head, tail),
            GameEvent::LadderHit { bottom, top, .. } => (bottom, top),
            _ => continue,
        };
        if cells.is_empty() {
            cells.push(from.as_u8());
        }
        cells.push(to.as_u8());
    }
    cells
}
