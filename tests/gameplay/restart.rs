//! Restarting a finished game.

// Allow test-specific patterns that are appropriate for test code
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]

use crate::common::{play_turn, position_of, scripted_builder, scripted_session_on};
use ladder_session::{
    BoardTopology, GameError, GameEvent, GameSession, PlayerId, StartPosition, Tick, TurnState,
};

/// Both players reach 98 with a roll of 1; the script then decides who finishes.
fn near_finish(rolls: &[u8]) -> GameSession {
    let board = BoardTopology::new(Vec::<(u8, u8)>::new(), [(2_u8, 98_u8)]).unwrap();
    scripted_session_on(board, rolls, 2)
}

fn finish_game(session: &mut GameSession) {
    while session.state() != TurnState::GameOver {
        play_turn(session);
    }
}

#[test]
fn test_restart_rejected_while_playing() {
    let mut session = near_finish(&[1]);
    assert_eq!(
        session.restart(),
        Err(GameError::InvalidState {
            state: TurnState::AwaitingRoll,
            expected: TurnState::GameOver
        })
    );

    session.roll_dice().unwrap();
    let before = session.snapshot();
    assert_eq!(
        session.restart(),
        Err(GameError::InvalidState {
            state: TurnState::RollInProgress,
            expected: TurnState::GameOver
        })
    );
    assert_eq!(session.snapshot(), before);
}

#[test]
fn test_restart_resets_positions_winner_and_turn_order() {
    // Ada overshoots, Grace wins
    let mut session = near_finish(&[1, 1, 3, 2]);
    finish_game(&mut session);
    assert_eq!(session.winner(), Some(PlayerId::new(1)));
    session.events().for_each(drop);

    session.restart().unwrap();

    assert_eq!(session.state(), TurnState::AwaitingRoll);
    assert_eq!(session.winner(), None);
    assert_eq!(session.active_player(), PlayerId::new(0));
    assert_eq!(position_of(&session, 0), 1);
    assert_eq!(position_of(&session, 1), 1);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.turns_completed, 0);
    assert_eq!(snapshot.last_roll, None);

    let events: Vec<_> = session.events().collect();
    assert_eq!(events, vec![GameEvent::GameRestarted]);
}

#[test]
fn test_restart_keeps_players_and_their_order() {
    let mut session = near_finish(&[1, 1, 2]);
    let names: Vec<String> = session.players().iter().map(|p| p.name().to_owned()).collect();
    finish_game(&mut session);
    session.restart().unwrap();

    let after: Vec<String> = session.players().iter().map(|p| p.name().to_owned()).collect();
    assert_eq!(after, names);
}

#[test]
fn test_game_can_be_played_again_after_restart() {
    // the script cycles, so the second game replays the first
    let mut session = near_finish(&[1, 1, 2]);
    finish_game(&mut session);
    let first_winner = session.winner();
    session.restart().unwrap();

    finish_game(&mut session);
    assert_eq!(session.winner(), first_winner);
    assert_eq!(session.snapshot().turns_completed, 3);
}

#[test]
fn test_second_restart_requires_another_finished_game() {
    let mut session = near_finish(&[1, 1, 2]);
    finish_game(&mut session);
    session.restart().unwrap();
    assert!(matches!(
        session.restart(),
        Err(GameError::InvalidState { .. })
    ));
}

#[test]
fn test_restart_returns_tokens_off_board() {
    let board = BoardTopology::new(Vec::<(u8, u8)>::new(), [(1_u8, 98_u8)]).unwrap();
    let mut session = scripted_builder(&[1, 1, 2], 2)
        .with_topology(board)
        .with_start_position(StartPosition::OffBoard)
        .start_session()
        .unwrap();
    finish_game(&mut session);
    session.restart().unwrap();

    assert_eq!(position_of(&session, 0), 0);
    assert_eq!(position_of(&session, 1), 0);
}

#[test]
fn test_ticks_after_game_over_change_nothing() {
    let mut session = near_finish(&[1, 1, 2]);
    finish_game(&mut session);
    session.events().for_each(drop);
    let before = session.snapshot();

    session.tick(Tick::Advance);
    assert_eq!(session.snapshot(), before);
    assert_eq!(session.events().len(), 0);
}
