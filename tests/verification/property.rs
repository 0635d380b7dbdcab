//! Property-based tests for whole sessions.
//!
//! These tests use proptest to drive sessions with arbitrary dice scripts and check that the
//! rules hold on every turn.
//!
//! # Properties Tested
//!
//! - Tokens never leave the track, and only the active player's token moves during a turn
//! - A turn's hop events end exactly on the mover's new position
//! - Turn order is a strict round-robin until somebody wins
//! - A win is declared iff the mover rests on the final cell
//! - Rolling while busy is rejected and changes nothing
//! - Session invariants hold after every tick

// Allow test-specific patterns that are appropriate for test code
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]

use crate::common::{play_turn, scripted_builder, scripted_session, visited_cells};
use ladder_session::telemetry::InvariantChecker;
use ladder_session::{GameError, GameEvent, PlayerId, Tick, TimingConfig, TurnState};
use proptest::prelude::*;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Strategy for dice scripts
fn script_strategy() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(1u8..=6, 1..40)
}

/// Strategy for player count
fn player_count_strategy() -> impl Strategy<Value = usize> {
    2usize..=4
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_turns_follow_the_rules(
        script in script_strategy(),
        players in player_count_strategy(),
        turns in 1usize..120,
    ) {
        let mut session = scripted_session(&script, players);

        for _ in 0..turns {
            if session.state() == TurnState::GameOver {
                break;
            }
            let mover = session.active_player();
            let before: Vec<u8> = session.players().iter().map(|p| p.position().as_u8()).collect();

            let events = play_turn(&mut session);
            let after: Vec<u8> = session.players().iter().map(|p| p.position().as_u8()).collect();

            for (id, (&b, &a)) in before.iter().zip(&after).enumerate() {
                prop_assert!(a <= 100);
                if id != mover.as_usize() {
                    prop_assert_eq!(a, b, "player {} moved out of turn", id);
                }
            }

            let visited = visited_cells(&events);
            if let Some(&last) = visited.last() {
                prop_assert_eq!(last, after[mover.as_usize()]);
                prop_assert_eq!(visited[0], before[mover.as_usize()]);
            } else {
                prop_assert_eq!(before[mover.as_usize()], after[mover.as_usize()]);
            }

            let won = events.contains(&GameEvent::PlayerWon { player: mover });
            prop_assert_eq!(won, after[mover.as_usize()] == 100);
            if won {
                prop_assert_eq!(session.state(), TurnState::GameOver);
                prop_assert_eq!(session.winner(), Some(mover));
                prop_assert_eq!(session.active_player(), mover);
            } else {
                prop_assert_eq!(session.state(), TurnState::AwaitingRoll);
                prop_assert_eq!(session.active_player(), mover.next_in(players));
            }
            prop_assert!(session.check_invariants().is_ok());
        }
    }

    #[test]
    fn prop_busy_rolls_change_nothing(
        script in script_strategy(),
        ticks in 0usize..8,
    ) {
        let mut session = scripted_builder(&script, 2)
            .with_timing(TimingConfig::classic())
            .start_session()
            .unwrap();
        session.roll_dice().unwrap();
        for _ in 0..ticks {
            session.tick(Tick::Advance);
        }
        prop_assume!(session.state().is_busy());

        let before = session.snapshot();
        let result = session.roll_dice();
        prop_assert_eq!(result, Err(GameError::Busy { state: before.state }));
        prop_assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn prop_invariants_hold_after_every_tick(
        script in script_strategy(),
        players in player_count_strategy(),
        frame_ms in 1u64..400,
    ) {
        let mut session = scripted_builder(&script, players)
            .with_timing(TimingConfig::relaxed())
            .start_session()
            .unwrap();
        let frame = web_time::Duration::from_millis(frame_ms);

        for _ in 0..2_000 {
            match session.state() {
                TurnState::GameOver => break,
                TurnState::AwaitingRoll => session.roll_dice().unwrap(),
                _ => session.tick(frame),
            }
            prop_assert!(session.check_invariants().is_ok());
            prop_assert!(session.active_player().is_valid_for(players));
        }
    }

    #[test]
    fn prop_round_robin_returns_to_first_player(
        players in player_count_strategy(),
        roll in 1u8..=6,
    ) {
        // an empty board cannot end a game within one round
        let board = ladder_session::BoardTopology::empty();
        let mut session = crate::common::scripted_session_on(board, &[roll], players);
        for _ in 0..players {
            play_turn(&mut session);
        }
        prop_assert_eq!(session.active_player(), PlayerId::new(0));
        prop_assert_eq!(session.snapshot().turns_completed, players as u32);
    }
}
