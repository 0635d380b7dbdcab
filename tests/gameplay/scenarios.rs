//! Concrete board situations played through a full session.

// Allow test-specific patterns that are appropriate for test code
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]

use std::sync::Arc;

use crate::common::{
    observed_session, play_turn, play_until_won, position_of, scripted_builder,
    scripted_session, scripted_session_on, visited_cells,
};
use ladder_session::telemetry::{CollectingObserver, ViolationKind, ViolationObserver};
use ladder_session::{
    assert_no_violations, assert_violation, BoardTopology, Cell, ConfigurationErrorKind,
    DiceRoller, GameError, GameEvent, PlayerId, SessionBuilder, StartPosition, TimingConfig,
    TurnState,
};

/// A board whose only ladder drops both players onto `cell` with a roll of 1.
fn board_with_shortcut_to(cell: u8, snakes: &[(u8, u8)]) -> BoardTopology {
    BoardTopology::new(snakes.iter().copied(), [(2_u8, cell)]).unwrap()
}

#[test]
fn test_plain_move_from_first_cell() {
    let mut session = scripted_session(&[1], 2);
    let events = play_turn(&mut session);

    assert_eq!(visited_cells(&events), vec![1, 2]);
    assert_eq!(position_of(&session, 0), 2);
    assert_eq!(session.active_player(), PlayerId::new(1));
}

#[test]
fn test_ladder_from_four_to_fourteen() {
    let mut session = scripted_session(&[3], 2);
    let events = play_turn(&mut session);

    assert_eq!(visited_cells(&events), vec![1, 2, 3, 4, 14]);
    assert!(events.contains(&GameEvent::LadderHit {
        player: PlayerId::new(0),
        bottom: Cell::new(4),
        top: Cell::new(14),
    }));
    assert_eq!(position_of(&session, 0), 14);
}

#[test]
fn test_snake_from_sixteen_to_six() {
    // Ada climbs to 14, Grace steps to 2, Ada lands on the snake at 16
    let mut session = scripted_session(&[3, 1, 2], 2);
    play_turn(&mut session);
    play_turn(&mut session);
    let events = play_turn(&mut session);

    assert_eq!(visited_cells(&events), vec![14, 15, 16, 6]);
    assert!(events.contains(&GameEvent::SnakeHit {
        player: PlayerId::new(0),
        head: Cell::new(16),
        tail: Cell::new(6),
    }));
    assert_eq!(position_of(&session, 0), 6);
}

#[test]
fn test_snake_at_fifty_six_after_roll_of_six_from_fifty() {
    let board = board_with_shortcut_to(50, &[(56, 53)]);
    let mut session = scripted_session_on(board, &[1, 1, 6], 2);
    play_turn(&mut session);
    play_turn(&mut session);
    assert_eq!(position_of(&session, 0), 50);

    let events = play_turn(&mut session);
    assert_eq!(
        visited_cells(&events),
        vec![50, 51, 52, 53, 54, 55, 56, 53]
    );
    assert_eq!(position_of(&session, 0), 53);
    assert_eq!(session.winner(), None);
    assert_eq!(session.state(), TurnState::AwaitingRoll);
    assert_eq!(session.active_player(), PlayerId::new(1));
}

#[test]
fn test_exact_roll_onto_final_cell_wins() {
    let board = board_with_shortcut_to(98, &[]);
    let mut session = scripted_session_on(board, &[1, 1, 2], 2);
    play_turn(&mut session);
    play_turn(&mut session);

    let events = play_turn(&mut session);
    assert_eq!(visited_cells(&events), vec![98, 99, 100]);
    assert_eq!(
        events.last(),
        Some(&GameEvent::PlayerWon {
            player: PlayerId::new(0)
        })
    );
    assert_eq!(session.state(), TurnState::GameOver);
    assert_eq!(session.winner(), Some(PlayerId::new(0)));
    assert_eq!(session.active_player(), PlayerId::new(0));
}

#[test]
fn test_roll_after_game_over_is_invalid_state() {
    let board = board_with_shortcut_to(98, &[]);
    let mut session = scripted_session_on(board, &[1, 1, 2], 2);
    for _ in 0..3 {
        play_turn(&mut session);
    }

    assert_eq!(
        session.roll_dice(),
        Err(GameError::InvalidState {
            state: TurnState::GameOver,
            expected: TurnState::AwaitingRoll
        })
    );
    assert_eq!(position_of(&session, 0), 100);
}

#[test]
fn test_overshoot_keeps_token_and_passes_turn() {
    let board = board_with_shortcut_to(95, &[]);
    let mut session = scripted_session_on(board, &[1, 1, 6], 2);
    play_turn(&mut session);
    play_turn(&mut session);

    let events = play_turn(&mut session);
    assert_eq!(
        events,
        vec![
            GameEvent::DiceRolled {
                player: PlayerId::new(0),
                value: 6
            },
            GameEvent::MoveBlocked {
                player: PlayerId::new(0),
                cell: Cell::new(95),
                roll: 6
            },
            GameEvent::TurnAdvanced {
                from: PlayerId::new(0),
                to: PlayerId::new(1)
            },
        ]
    );
    assert_eq!(position_of(&session, 0), 95);
    assert_eq!(session.winner(), None);
}

#[test]
fn test_overshoot_from_ninety_nine_never_wins() {
    let board = board_with_shortcut_to(99, &[]);
    let mut session = scripted_session_on(board, &[1, 1, 2, 2], 2);
    for _ in 0..4 {
        play_turn(&mut session);
    }
    assert_eq!(position_of(&session, 0), 99);
    assert_eq!(position_of(&session, 1), 99);
    assert_eq!(session.state(), TurnState::AwaitingRoll);
}

#[test]
fn test_ladder_onto_final_cell_wins() {
    let board = BoardTopology::new(Vec::<(u8, u8)>::new(), [(2_u8, 74_u8), (80, 100)]).unwrap();
    let mut session = scripted_session_on(board, &[1, 1, 6], 2);
    play_turn(&mut session);
    play_turn(&mut session);

    let events = play_turn(&mut session);
    assert_eq!(visited_cells(&events), vec![74, 75, 76, 77, 78, 79, 80, 100]);
    assert_eq!(session.winner(), Some(PlayerId::new(0)));
}

#[test]
fn test_second_player_can_win() {
    let board = board_with_shortcut_to(98, &[]);
    let mut session = scripted_session_on(board, &[1, 1, 3, 2], 2);
    for _ in 0..4 {
        play_turn(&mut session);
    }
    assert_eq!(position_of(&session, 0), 98);
    assert_eq!(session.winner(), Some(PlayerId::new(1)));
}

#[test]
fn test_off_board_start_enters_on_first_cell_and_takes_its_ladder() {
    let mut session = scripted_builder(&[1], 2)
        .with_start_position(StartPosition::OffBoard)
        .start_session()
        .unwrap();
    assert_eq!(position_of(&session, 0), 0);

    let events = play_turn(&mut session);
    assert_eq!(visited_cells(&events), vec![0, 1, 38]);
    assert_eq!(position_of(&session, 0), 38);
}

#[test]
fn test_on_board_start_does_not_take_ladder_under_start_cell() {
    let mut session = scripted_session(&[1], 2);
    play_turn(&mut session);
    assert_eq!(position_of(&session, 0), 2);
}

#[test]
fn test_chained_topology_is_rejected_at_construction() {
    let result = BoardTopology::new([(60_u8, 20_u8)], [(3_u8, 60_u8)]);
    assert!(matches!(
        result,
        Err(GameError::Configuration {
            kind: ConfigurationErrorKind::ChainedTransition { .. }
        })
    ));
}

#[test]
fn test_chained_topology_met_at_runtime_is_reported_and_not_followed() {
    let observer = Arc::new(CollectingObserver::new());
    let mut session = scripted_builder(&[2], 2)
        .with_topology(BoardTopology::new_unchecked(&[(60, 20)], &[(3, 60)]))
        .with_violation_observer(observer.clone() as Arc<dyn ViolationObserver>)
        .start_session()
        .unwrap();

    let events = play_turn(&mut session);
    assert_eq!(visited_cells(&events), vec![1, 2, 3, 60]);
    assert_eq!(position_of(&session, 0), 60);
    assert_violation!(observer, ViolationKind::Topology);
}

#[test]
fn test_out_of_range_dice_are_clamped_and_reported() {
    struct Sequence(Vec<u8>);

    impl DiceRoller for Sequence {
        fn roll(&mut self) -> u8 {
            self.0.pop().unwrap_or(1)
        }
    }

    let observer = Arc::new(CollectingObserver::new());
    let mut session = SessionBuilder::new()
        .with_dice(Sequence(vec![0, 9]))
        .with_timing(TimingConfig::instant())
        .with_violation_observer(observer.clone())
        .add_player("Ada")
        .unwrap()
        .add_player("Grace")
        .unwrap()
        .start_session()
        .unwrap();

    // 9 is clamped to 6, 0 to 1
    let events = play_turn(&mut session);
    assert_eq!(
        events.first(),
        Some(&GameEvent::DiceRolled {
            player: PlayerId::new(0),
            value: 6
        })
    );
    play_turn(&mut session);
    assert_eq!(position_of(&session, 0), 7);
    assert_eq!(position_of(&session, 1), 2);
    assert_eq!(
        observer.violations_of_kind(ViolationKind::DiceRange).len(),
        2
    );
}

#[test]
fn test_clean_game_reports_no_violations() {
    let (mut session, observer) = observed_session(&[6, 5, 4, 3, 2, 1], 4);
    play_until_won(&mut session, 40);
    assert_no_violations!(observer);
}

#[test]
fn test_seeded_random_game_finishes_on_final_cell() {
    let mut session = SessionBuilder::new()
        .with_seed(2024)
        .with_timing(TimingConfig::instant())
        .add_player("Ada")
        .unwrap()
        .add_player("Grace")
        .unwrap()
        .add_player("Edsger")
        .unwrap()
        .start_session()
        .unwrap();

    let winner = play_until_won(&mut session, 10_000).unwrap();
    assert_eq!(position_of(&session, winner.as_usize()), 100);
    assert!(session
        .players()
        .iter()
        .filter(|p| p.id() != winner)
        .all(|p| p.position() != Cell::FINAL));
}
