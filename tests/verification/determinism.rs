//! Determinism tests.
//!
//! A session is a pure function of its dice and the ticks it is fed. These tests verify that:
//! 1. Two sessions with the same seed produce identical snapshots at every step
//! 2. Different seeds produce different games
//! 3. Pacing changes how long a turn takes, never its outcome

// Allow test-specific patterns that are appropriate for test code
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]

use crate::common::{play_turn, scripted_builder, settle};
use ladder_session::{GameEvent, GameSession, SessionBuilder, Tick, TimingConfig, TurnState};
use web_time::Duration;

fn seeded(seed: u64, timing: TimingConfig) -> GameSession {
    SessionBuilder::new()
        .with_seed(seed)
        .with_timing(timing)
        .add_player("Ada")
        .unwrap()
        .add_player("Grace")
        .unwrap()
        .add_player("Edsger")
        .unwrap()
        .start_session()
        .unwrap()
}

/// Plays up to `turns` turns and returns the checksum after each tick.
fn checksum_trace(session: &mut GameSession, turns: usize, frame: Duration) -> Vec<u64> {
    let mut trace = Vec::new();
    for _ in 0..turns {
        if session.state() == TurnState::GameOver {
            break;
        }
        session.roll_dice().unwrap();
        while session.state().is_busy() {
            session.tick(frame);
            trace.push(session.snapshot().checksum());
        }
    }
    trace
}

fn rolls(events: &[GameEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|event| match *event {
            GameEvent::DiceRolled { value, .. } => Some(value),
            _ => None,
        })
        .collect()
}

#[test]
fn test_same_seed_same_snapshots() {
    let frame = Duration::from_millis(16);
    let mut a = seeded(0xdead_beef, TimingConfig::classic());
    let mut b = seeded(0xdead_beef, TimingConfig::classic());

    let trace_a = checksum_trace(&mut a, 30, frame);
    let trace_b = checksum_trace(&mut b, 30, frame);

    assert!(!trace_a.is_empty());
    assert_eq!(trace_a, trace_b);
    assert_eq!(a.snapshot(), b.snapshot());
}

#[test]
fn test_same_seed_same_events() {
    let mut a = seeded(7, TimingConfig::instant());
    let mut b = seeded(7, TimingConfig::instant());
    for _ in 0..25 {
        if a.state() == TurnState::GameOver {
            break;
        }
        assert_eq!(play_turn(&mut a), play_turn(&mut b));
    }
}

#[test]
fn test_different_seeds_roll_differently() {
    let mut a = seeded(1, TimingConfig::instant());
    let mut b = seeded(2, TimingConfig::instant());
    let mut rolls_a = Vec::new();
    let mut rolls_b = Vec::new();
    for _ in 0..20 {
        if a.state() == TurnState::GameOver || b.state() == TurnState::GameOver {
            break;
        }
        rolls_a.extend(rolls(&play_turn(&mut a)));
        rolls_b.extend(rolls(&play_turn(&mut b)));
    }
    assert_ne!(rolls_a, rolls_b);
}

#[test]
fn test_pacing_does_not_change_outcome() {
    let script = [3, 6, 2, 5, 4, 1, 6, 6, 2];
    let mut instant = scripted_builder(&script, 3).start_session().unwrap();
    let mut paced = scripted_builder(&script, 3)
        .with_timing(TimingConfig::relaxed())
        .start_session()
        .unwrap();

    for _ in 0..24 {
        if instant.state() == TurnState::GameOver {
            break;
        }
        let fast = play_turn(&mut instant);

        paced.roll_dice().unwrap();
        while paced.state().is_busy() {
            paced.tick(Duration::from_millis(33));
        }
        let slow: Vec<_> = paced.events().collect();

        assert_eq!(fast, slow);
    }

    let fast = instant.snapshot();
    let slow = paced.snapshot();
    assert_eq!(fast.players, slow.players);
    assert_eq!(fast.active_player, slow.active_player);
    assert_eq!(fast.winner, slow.winner);
    assert_eq!(fast.turns_completed, slow.turns_completed);
}

#[test]
fn test_advance_signal_matches_elapsed_time() {
    let script = [4, 2, 6];
    let mut advanced = scripted_builder(&script, 2).start_session().unwrap();
    let mut timed = scripted_builder(&script, 2)
        .with_timing(TimingConfig::classic())
        .start_session()
        .unwrap();

    for _ in 0..6 {
        advanced.roll_dice().unwrap();
        settle(&mut advanced);
        timed.roll_dice().unwrap();
        while timed.state().is_busy() {
            timed.tick(Tick::Elapsed(Duration::from_millis(100)));
        }
        assert_eq!(
            advanced.snapshot().players,
            timed.snapshot().players
        );
    }
}

#[test]
fn test_checksum_changes_when_state_changes() {
    let mut session = seeded(99, TimingConfig::instant());
    let start = session.snapshot().checksum();
    play_turn(&mut session);
    assert_ne!(session.snapshot().checksum(), start);
}

#[cfg(feature = "json")]
#[test]
fn test_snapshot_json_round_trip() {
    let mut session = seeded(5, TimingConfig::classic());
    session.roll_dice().unwrap();
    session.tick(Tick::Advance);

    let snapshot = session.snapshot();
    let json = snapshot.to_json().unwrap();
    let back: ladder_session::GameSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);
    assert_eq!(back.checksum(), snapshot.checksum());
}
