//! Turn sequencing: roll acceptance, pacing and round-robin order.

// Allow test-specific patterns that are appropriate for test code
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]

use crate::common::{
    play_turn, play_until_won, position_of, scripted_builder, scripted_session, scripted_session_on,
    settle,
};
use ladder_session::{
    BoardTopology, Cell, GameError, GameEvent, PlayerId, ScriptedDice, SessionBuilder, Tick,
    TimingConfig, TurnState,
};
use web_time::Duration;

const FRAME: Duration = Duration::from_millis(16);

fn classic_session(rolls: &[u8]) -> ladder_session::GameSession {
    scripted_builder(rolls, 2)
        .with_timing(TimingConfig::classic())
        .start_session()
        .unwrap()
}

#[test]
fn test_session_starts_awaiting_first_players_roll() {
    let session = scripted_session(&[1], 2);
    assert_eq!(session.state(), TurnState::AwaitingRoll);
    assert_eq!(session.active_player(), PlayerId::new(0));
    assert_eq!(session.winner(), None);
    assert!(session.players().iter().all(|p| p.position() == Cell::FIRST));
}

#[test]
fn test_roll_while_rolling_is_busy_and_changes_nothing() {
    let mut session = classic_session(&[5]);
    session.roll_dice().unwrap();
    session.tick(FRAME);
    let before = session.snapshot();

    assert_eq!(
        session.roll_dice(),
        Err(GameError::Busy {
            state: TurnState::RollInProgress
        })
    );
    let after = session.snapshot();
    assert_eq!(after.players, before.players);
    assert_eq!(after.state, before.state);
    assert_eq!(after.active_player, before.active_player);
}

#[test]
fn test_roll_while_animating_is_busy_and_changes_nothing() {
    let mut session = classic_session(&[5]);
    session.roll_dice().unwrap();
    session.tick(Tick::Advance);
    session.tick(Duration::from_millis(300));
    assert_eq!(session.state(), TurnState::Animating);
    assert_eq!(position_of(&session, 0), 2);

    assert_eq!(
        session.roll_dice(),
        Err(GameError::Busy {
            state: TurnState::Animating
        })
    );
    assert_eq!(position_of(&session, 0), 2);
    assert_eq!(position_of(&session, 1), 1);
}

#[test]
fn test_busy_roll_is_recoverable() {
    let mut session = classic_session(&[2, 3]);
    session.roll_dice().unwrap();
    assert!(session.roll_dice().is_err());
    settle(&mut session);

    assert_eq!(session.active_player(), PlayerId::new(1));
    assert!(session.roll_dice().is_ok());
}

#[test]
fn test_roll_settles_after_roll_duration_at_frame_rate() {
    let mut session = classic_session(&[2]);
    session.roll_dice().unwrap();

    // 62 frames of 16ms are 992ms
    for _ in 0..62 {
        session.tick(FRAME);
    }
    assert_eq!(session.state(), TurnState::RollInProgress);
    assert_eq!(session.snapshot().last_roll, None);

    session.tick(FRAME);
    assert_eq!(session.state(), TurnState::Animating);
    assert_eq!(session.snapshot().last_roll, Some(2));
}

#[test]
fn test_one_hop_per_step_delay() {
    let mut session = classic_session(&[3]);
    session.roll_dice().unwrap();
    session.tick(Tick::Advance);

    // 18 frames are 288ms, the 19th crosses 300ms
    for _ in 0..18 {
        session.tick(FRAME);
    }
    assert_eq!(position_of(&session, 0), 1);
    session.tick(FRAME);
    assert_eq!(position_of(&session, 0), 2);

    // a huge frame still only moves one cell
    session.tick(Duration::from_secs(5));
    assert_eq!(position_of(&session, 0), 3);
}

#[test]
fn test_dice_face_is_visible_while_rolling() {
    let mut session = classic_session(&[4]);
    session.roll_dice().unwrap();
    for _ in 0..10 {
        session.tick(FRAME);
        let face = session.snapshot().dice_face.unwrap();
        assert!((1..=6).contains(&face));
    }
    session.tick(Tick::Advance);
    assert_eq!(session.snapshot().dice_face, Some(4));
}

#[test]
fn test_snapshot_exposes_animated_path_and_cursor() {
    let mut session = classic_session(&[2]);
    session.roll_dice().unwrap();
    session.tick(Tick::Advance);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, TurnState::Animating);
    assert_eq!(
        snapshot.animated_path,
        vec![Cell::new(1), Cell::new(2), Cell::new(3)]
    );
    assert_eq!(snapshot.animation_cursor, 0);

    session.tick(Tick::Advance);
    assert_eq!(session.snapshot().animation_cursor, 1);

    session.tick(Tick::Advance);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, TurnState::AwaitingRoll);
    assert!(snapshot.animated_path.is_empty());
}

#[test]
fn test_finished_path_is_hidden_during_handoff_and_after_game_over() {
    let mut session = scripted_builder(&[2], 2)
        .with_timing(TimingConfig::relaxed())
        .start_session()
        .unwrap();
    session.roll_dice().unwrap();
    for _ in 0..3 {
        session.tick(Tick::Advance);
    }
    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, TurnState::RoundComplete);
    assert!(snapshot.animated_path.is_empty());
    assert_eq!(snapshot.animation_cursor, 0);

    let board = BoardTopology::new(Vec::<(u8, u8)>::new(), [(2_u8, 98_u8)]).unwrap();
    let mut session = scripted_session_on(board, &[1, 1, 2], 2);
    assert_eq!(play_until_won(&mut session, 3), Some(PlayerId::new(0)));
    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, TurnState::GameOver);
    assert!(snapshot.animated_path.is_empty());
    assert_eq!(snapshot.animation_cursor, 0);
}

#[test]
fn test_ticks_outside_timed_phases_are_ignored() {
    let mut session = classic_session(&[2]);
    let before = session.snapshot();
    session.tick(Duration::from_secs(10));
    session.tick(Tick::Advance);
    assert_eq!(session.snapshot(), before);
    assert_eq!(session.events().len(), 0);
}

#[test]
fn test_round_robin_with_three_players() {
    let mut session = scripted_session(&[1], 3);
    let expected = [1, 2, 0, 1, 2, 0];
    for next in expected {
        play_turn(&mut session);
        assert_eq!(session.active_player(), PlayerId::new(next));
    }
    assert_eq!(session.snapshot().turns_completed, 6);
}

#[test]
fn test_round_robin_returns_to_first_player_after_each_played_once() {
    for players in 2..=4 {
        let mut session = scripted_session(&[2], players);
        for _ in 0..players {
            play_turn(&mut session);
        }
        assert_eq!(
            session.active_player(),
            PlayerId::new(0),
            "{players} players"
        );
        for id in 0..players {
            assert_eq!(position_of(&session, id), 3);
        }
    }
}

#[test]
fn test_turn_advanced_event_names_both_players() {
    let mut session = scripted_session(&[2], 4);
    for _ in 0..3 {
        play_turn(&mut session);
    }
    let events = play_turn(&mut session);
    assert_eq!(
        events.last(),
        Some(&GameEvent::TurnAdvanced {
            from: PlayerId::new(3),
            to: PlayerId::new(0)
        })
    );
}

#[test]
fn test_handoff_pause_rejects_rolls_until_elapsed() {
    let mut session = scripted_builder(&[2], 2)
        .with_timing(TimingConfig::relaxed())
        .start_session()
        .unwrap();
    session.roll_dice().unwrap();
    session.tick(Tick::Advance);
    session.tick(Tick::Advance);
    session.tick(Tick::Advance);

    assert_eq!(session.state(), TurnState::RoundComplete);
    assert_eq!(session.active_player(), PlayerId::new(0));
    assert_eq!(
        session.roll_dice(),
        Err(GameError::Busy {
            state: TurnState::RoundComplete
        })
    );

    session.tick(Duration::from_millis(400));
    assert_eq!(session.state(), TurnState::RoundComplete);
    session.tick(Duration::from_millis(400));
    assert_eq!(session.state(), TurnState::AwaitingRoll);
    assert_eq!(session.active_player(), PlayerId::new(1));
}

#[test]
fn test_players_cannot_join_after_first_roll() {
    let mut session = SessionBuilder::new()
        .with_dice(ScriptedDice::new([1]).unwrap())
        .with_timing(TimingConfig::instant())
        .add_player("Ada")
        .unwrap()
        .add_player("Grace")
        .unwrap()
        .start_session()
        .unwrap();
    assert_eq!(session.add_player("Edsger").unwrap(), PlayerId::new(2));

    play_turn(&mut session);
    assert!(matches!(
        session.add_player("Barbara"),
        Err(GameError::Configuration { .. })
    ));
    assert_eq!(session.players().len(), 3);
}
