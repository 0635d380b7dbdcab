use std::sync::Arc;

use tracing::{debug, trace};
use web_time::Duration;

use crate::board::BoardTopology;
use crate::config::TimingConfig;
use crate::dice::{DiceRoller, DieFace};
use crate::movement::{resolve, MovementPath, PathAnomaly};
use crate::rng::{Pcg32, Rng};
use crate::session::roster::PlayerRoster;
use crate::telemetry::{
    InvariantChecker, InvariantViolation, ViolationKind, ViolationObserver, ViolationSeverity,
};
use crate::{report_violation_to, Cell, GameEvent, PlayerId, StepKind, TurnState};

/// A signal driving the engine forward in time.
///
/// ```
/// use ladder_session::Tick;
/// use web_time::Duration;
///
/// let tick: Tick = Duration::from_millis(16).into();
/// assert_eq!(tick, Tick::Elapsed(Duration::from_millis(16)));
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Tick {
    /// This much time has passed since the previous tick.
    Elapsed(Duration),
    /// Finish the current timed phase now, whatever its remaining time.
    Advance,
}

impl From<Duration> for Tick {
    fn from(elapsed: Duration) -> Self {
        Tick::Elapsed(elapsed)
    }
}

/// Everything outside the engine that a tick reads or mutates.
pub(crate) struct TurnContext<'a> {
    pub(crate) topology: &'a BoardTopology,
    pub(crate) dice: &'a mut dyn DiceRoller,
    pub(crate) roster: &'a mut PlayerRoster,
    pub(crate) events: &'a mut Vec<GameEvent>,
    pub(crate) observer: &'a Option<Arc<dyn ViolationObserver>>,
}

/// The turn state machine.
///
/// Owns whose turn it is, the timed phases of a turn and the movement playback cursor.
/// Player positions live in the [`PlayerRoster`]; the engine moves them one path entry at a time.
///
/// ```text
///                 roll_dice()
///  AwaitingRoll ───────────────► RollInProgress
///       ▲                             │ roll_duration elapsed
///       │                             ▼
///       │   handoff_delay     path longer than one entry ──► Animating ──┐
///       ├◄──────────────── RoundComplete ◄── stationary path             │ one entry per
///       │                       ▲                                        │ step_delay
///       │                       └──────────── path done, no win ◄────────┘
///       │ restart()
///  GameOver ◄──────────────────────────────── path done on the final cell
/// ```
#[derive(Debug, Clone)]
pub struct TurnEngine {
    state: TurnState,
    timing: TimingConfig,
    phase_elapsed: Duration,
    active: PlayerId,
    last_roll: Option<u8>,
    dice_face: Option<u8>,
    path: Option<MovementPath>,
    cursor: usize,
    winner: Option<PlayerId>,
    turns_completed: u32,
    cosmetic: Pcg32,
}

impl TurnEngine {
    /// Creates an engine waiting for the first player's roll.
    ///
    /// `cosmetic` draws the faces shown while the dice tumble; it never affects the outcome.
    #[must_use]
    pub fn new(timing: TimingConfig, cosmetic: Pcg32) -> Self {
        Self {
            state: TurnState::AwaitingRoll,
            timing,
            phase_elapsed: Duration::ZERO,
            active: PlayerId::new(0),
            last_roll: None,
            dice_face: None,
            path: None,
            cursor: 0,
            winner: None,
            turns_completed: 0,
            cosmetic,
        }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> TurnState {
        self.state
    }

    /// The configured pacing.
    #[must_use]
    pub fn timing(&self) -> TimingConfig {
        self.timing
    }

    /// The player whose turn it is.
    #[must_use]
    pub fn active_player(&self) -> PlayerId {
        self.active
    }

    /// The most recent authoritative roll.
    #[must_use]
    pub fn last_roll(&self) -> Option<u8> {
        self.last_roll
    }

    /// The face to display: a cosmetic face while rolling, afterwards the authoritative roll.
    #[must_use]
    pub fn dice_face(&self) -> Option<u8> {
        self.dice_face
    }

    /// The path of the current move, if one is being played back.
    #[must_use]
    pub fn path(&self) -> Option<&MovementPath> {
        self.path.as_ref()
    }

    /// Index of the path entry the token currently stands on.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The winner once the game is over.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    /// Number of fully resolved turns since the game (re)started.
    #[must_use]
    pub fn turns_completed(&self) -> u32 {
        self.turns_completed
    }

    /// Time accumulated in the current timed phase.
    #[must_use]
    pub fn phase_elapsed(&self) -> Duration {
        self.phase_elapsed
    }

    /// Starts the dice tumbling. The caller has checked that the state is `AwaitingRoll`.
    pub(crate) fn begin_roll(&mut self) {
        self.state = TurnState::RollInProgress;
        self.phase_elapsed = Duration::ZERO;
        self.path = None;
        self.cursor = 0;
        self.dice_face = Some(self.cosmetic.gen_die_face());
        debug!("Player {} rolls", self.active);
    }

    /// Resets to a fresh game with player 0 to move.
    pub(crate) fn restart(&mut self) {
        self.state = TurnState::AwaitingRoll;
        self.phase_elapsed = Duration::ZERO;
        self.active = PlayerId::new(0);
        self.last_roll = None;
        self.dice_face = None;
        self.path = None;
        self.cursor = 0;
        self.winner = None;
        self.turns_completed = 0;
    }

    /// Advances the current phase.
    pub(crate) fn tick(&mut self, tick: Tick, ctx: &mut TurnContext<'_>) {
        match self.state {
            TurnState::AwaitingRoll | TurnState::GameOver => {
                trace!("Tick ignored in {:?}", self.state);
            },
            TurnState::RollInProgress => self.tick_roll(tick, ctx),
            TurnState::Animating => self.tick_animation(tick, ctx),
            TurnState::RoundComplete => {
                if self.phase_done(tick, self.timing.handoff_delay) {
                    self.advance_turn(ctx);
                }
            },
        }
    }

    fn phase_done(&mut self, tick: Tick, duration: Duration) -> bool {
        match tick {
            Tick::Advance => true,
            Tick::Elapsed(elapsed) => {
                self.phase_elapsed = self.phase_elapsed.saturating_add(elapsed);
                self.phase_elapsed >= duration
            },
        }
    }

    fn tick_roll(&mut self, tick: Tick, ctx: &mut TurnContext<'_>) {
        if !self.phase_done(tick, self.timing.roll_duration) {
            self.dice_face = Some(self.cosmetic.gen_die_face());
            return;
        }

        let raw = ctx.dice.roll();
        let face = match DieFace::new(raw) {
            Some(face) => face,
            None => {
                let clamped = DieFace::clamped(raw);
                report_violation_to!(
                    ctx.observer,
                    turn = self.turns_completed;
                    ViolationSeverity::Error,
                    ViolationKind::DiceRange,
                    "dice source rolled {}, using {} instead",
                    raw,
                    clamped
                );
                clamped
            },
        };
        let roll = face.value();
        let player = self.active;
        self.last_roll = Some(roll);
        self.dice_face = Some(roll);
        ctx.events.push(GameEvent::DiceRolled {
            player,
            value: roll,
        });

        let Some(start) = ctx.roster.position(player) else {
            report_violation_to!(
                ctx.observer,
                turn = self.turns_completed;
                ViolationSeverity::Critical,
                ViolationKind::TurnOrder,
                "active player {} is not registered ({} players)",
                player,
                ctx.roster.len()
            );
            self.finish_turn(ctx);
            return;
        };

        let path = resolve(start, roll, ctx.topology);
        if let Some(PathAnomaly::ChainedTransition { from, via }) = path.anomaly() {
            report_violation_to!(
                ctx.observer,
                turn = self.turns_completed;
                ViolationSeverity::Warning,
                ViolationKind::Topology,
                "transition from {} lands on {}, which starts another transition; not following it",
                from,
                via
            );
        }
        debug!(
            "Player {} rolled {}: {} -> {} ({} entries)",
            player,
            roll,
            start,
            path.resting_cell(),
            path.len()
        );

        if path.is_stationary() {
            if path.is_blocked() {
                ctx.events.push(GameEvent::MoveBlocked {
                    player,
                    cell: start,
                    roll,
                });
            }
            self.path = Some(path);
            self.finish_turn(ctx);
        } else {
            self.path = Some(path);
            self.cursor = 0;
            self.phase_elapsed = Duration::ZERO;
            self.state = TurnState::Animating;
        }
    }

    fn tick_animation(&mut self, tick: Tick, ctx: &mut TurnContext<'_>) {
        if !self.phase_done(tick, self.timing.step_delay) {
            return;
        }
        // leftover time does not carry into the next hop
        self.phase_elapsed = Duration::ZERO;

        let Some(path) = self.path.as_ref() else {
            report_violation_to!(
                ctx.observer,
                turn = self.turns_completed;
                ViolationSeverity::Critical,
                ViolationKind::InternalError,
                "animating without a movement path"
            );
            self.finish_turn(ctx);
            return;
        };

        let next = self.cursor + 1;
        let cells = path.cells();
        let (Some(&from), Some(&to), Some(kind)) =
            (cells.get(self.cursor), cells.get(next), path.step_kind(next))
        else {
            report_violation_to!(
                ctx.observer,
                turn = self.turns_completed;
                ViolationSeverity::Critical,
                ViolationKind::InternalError,
                "animation cursor {} ran past a path of {} entries",
                self.cursor,
                cells.len()
            );
            self.finish_turn(ctx);
            return;
        };
        let is_last = next + 1 == cells.len();
        let is_win = path.is_win();

        let player = self.active;
        self.cursor = next;
        ctx.roster.set_position(player, to);
        ctx.events.push(step_event(kind, player, from, to));
        trace!("Player {} hops {} -> {} ({:?})", player, from, to, kind);

        if !is_last {
            return;
        }
        if is_win {
            self.state = TurnState::GameOver;
            self.winner = Some(player);
            self.turns_completed = self.turns_completed.saturating_add(1);
            ctx.events.push(GameEvent::PlayerWon { player });
            debug!("Player {} wins after {} turns", player, self.turns_completed);
        } else {
            self.finish_turn(ctx);
        }
    }

    fn finish_turn(&mut self, ctx: &mut TurnContext<'_>) {
        self.turns_completed = self.turns_completed.saturating_add(1);
        self.phase_elapsed = Duration::ZERO;
        if self.timing.handoff_delay.is_zero() {
            self.advance_turn(ctx);
        } else {
            self.state = TurnState::RoundComplete;
        }
    }

    fn advance_turn(&mut self, ctx: &mut TurnContext<'_>) {
        let from = self.active;
        let to = from.next_in(ctx.roster.len());
        self.active = to;
        self.state = TurnState::AwaitingRoll;
        self.phase_elapsed = Duration::ZERO;
        self.path = None;
        self.cursor = 0;
        ctx.events.push(GameEvent::TurnAdvanced { from, to });
        debug!("Turn passes from player {} to player {}", from, to);
    }
}

fn step_event(kind: StepKind, player: PlayerId, from: Cell, to: Cell) -> GameEvent {
    match kind {
        StepKind::Move => GameEvent::PlayerMoved { player, from, to },
        StepKind::Snake => GameEvent::SnakeHit {
            player,
            head: from,
            tail: to,
        },
        StepKind::Ladder => GameEvent::LadderHit {
            player,
            bottom: from,
            top: to,
        },
    }
}

impl InvariantChecker for TurnEngine {
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if (self.state == TurnState::GameOver) != self.winner.is_some() {
            return Err(InvariantViolation::new(
                "TurnEngine",
                "a winner is recorded exactly when the game is over",
            )
            .with_details(format!("state={:?}, winner={:?}", self.state, self.winner)));
        }
        if self.state == TurnState::Animating {
            match &self.path {
                None => {
                    return Err(InvariantViolation::new(
                        "TurnEngine",
                        "animating requires a movement path",
                    ));
                },
                Some(path) if self.cursor + 1 >= path.len() => {
                    return Err(InvariantViolation::new(
                        "TurnEngine",
                        "animation cursor must point before the last path entry",
                    )
                    .with_details(format!("cursor={}, len={}", self.cursor, path.len())));
                },
                Some(_) => {},
            }
        }
        if let Some(face) = self.dice_face {
            if DieFace::new(face).is_none() {
                return Err(InvariantViolation::new(
                    "TurnEngine",
                    "displayed dice face must be a valid face",
                )
                .with_details(format!("face={face}")));
            }
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
    use crate::config::StartPosition;
    use crate::dice::ScriptedDice;
    use crate::rng::SeedableRng;
    use crate::telemetry::CollectingObserver;

    struct Fixture {
        engine: TurnEngine,
        topology: BoardTopology,
        dice: Box<dyn DiceRoller>,
        roster: PlayerRoster,
        events: Vec<GameEvent>,
        observer: Option<Arc<dyn ViolationObserver>>,
    }

    impl Fixture {
        fn new(timing: TimingConfig, rolls: &[u8]) -> Self {
            let mut roster = PlayerRoster::new(StartPosition::OnBoard);
            roster.add("Ada").unwrap();
            roster.add("Grace").unwrap();
            Self {
                engine: TurnEngine::new(timing, Pcg32::seed_from_u64(1)),
                topology: BoardTopology::standard(),
                dice: Box::new(ScriptedDice::new(rolls.iter().copied()).unwrap()),
                roster,
                events: Vec::new(),
                observer: None,
            }
        }

        fn tick(&mut self, tick: Tick) {
            let mut ctx = TurnContext {
                topology: &self.topology,
                dice: self.dice.as_mut(),
                roster: &mut self.roster,
                events: &mut self.events,
                observer: &self.observer,
            };
            self.engine.tick(tick, &mut ctx);
        }

        fn play_turn(&mut self) {
            self.engine.begin_roll();
            for _ in 0..32 {
                self.tick(Tick::Advance);
                if matches!(
                    self.engine.state(),
                    TurnState::AwaitingRoll | TurnState::GameOver
                ) {
                    return;
                }
            }
            panic!("turn did not finish, stuck in {:?}", self.engine.state());
        }
    }

    #[test]
    fn roll_waits_for_roll_duration() {
        let mut fx = Fixture::new(TimingConfig::classic(), &[2]);
        fx.engine.begin_roll();

        fx.tick(Tick::Elapsed(Duration::from_millis(400)));
        fx.tick(Tick::Elapsed(Duration::from_millis(400)));
        assert_eq!(fx.engine.state(), TurnState::RollInProgress);
        assert_eq!(fx.engine.last_roll(), None);
        assert!(fx.events.is_empty());

        fx.tick(Tick::Elapsed(Duration::from_millis(200)));
        assert_eq!(fx.engine.state(), TurnState::Animating);
        assert_eq!(fx.engine.last_roll(), Some(2));
        assert_eq!(
            fx.events,
            vec![GameEvent::DiceRolled {
                player: PlayerId::new(0),
                value: 2
            }]
        );
    }

    #[test]
    fn cosmetic_faces_are_valid_and_do_not_consume_dice() {
        let mut fx = Fixture::new(TimingConfig::classic(), &[5, 1]);
        fx.engine.begin_roll();
        for _ in 0..10 {
            fx.tick(Tick::Elapsed(Duration::from_millis(10)));
            let face = fx.engine.dice_face().unwrap();
            assert!((1..=6).contains(&face));
        }
        fx.tick(Tick::Advance);
        assert_eq!(fx.engine.last_roll(), Some(5));
    }

    #[test]
    fn one_hop_per_step_delay_and_leftover_time_is_discarded() {
        let mut fx = Fixture::new(TimingConfig::classic(), &[2]);
        fx.engine.begin_roll();
        fx.tick(Tick::Advance);
        assert_eq!(fx.engine.state(), TurnState::Animating);

        fx.tick(Tick::Elapsed(Duration::from_millis(299)));
        assert_eq!(fx.roster.position(PlayerId::new(0)), Some(Cell::new(1)));

        // 900ms at once still only moves one cell
        fx.tick(Tick::Elapsed(Duration::from_millis(900)));
        assert_eq!(fx.roster.position(PlayerId::new(0)), Some(Cell::new(2)));
        assert_eq!(fx.engine.cursor(), 1);
        assert_eq!(fx.engine.phase_elapsed(), Duration::ZERO);

        fx.tick(Tick::Elapsed(Duration::from_millis(300)));
        assert_eq!(fx.roster.position(PlayerId::new(0)), Some(Cell::new(3)));
        assert_eq!(fx.engine.state(), TurnState::AwaitingRoll);
        assert_eq!(fx.engine.active_player(), PlayerId::new(1));
    }

    #[test]
    fn ladder_step_emits_ladder_hit() {
        // 1 + 3 lands on the ladder 4 -> 14
        let mut fx = Fixture::new(TimingConfig::instant(), &[3]);
        fx.play_turn();

        assert_eq!(fx.roster.position(PlayerId::new(0)), Some(Cell::new(14)));
        assert!(fx.events.contains(&GameEvent::LadderHit {
            player: PlayerId::new(0),
            bottom: Cell::new(4),
            top: Cell::new(14),
        }));
        assert_eq!(
            fx.events.last(),
            Some(&GameEvent::TurnAdvanced {
                from: PlayerId::new(0),
                to: PlayerId::new(1)
            })
        );
        assert_eq!(fx.engine.turns_completed(), 1);
    }

    #[test]
    fn handoff_delay_pauses_in_round_complete() {
        let timing = TimingConfig {
            handoff_delay: Duration::from_millis(500),
            ..TimingConfig::instant()
        };
        let mut fx = Fixture::new(timing, &[1]);
        fx.engine.begin_roll();
        fx.tick(Tick::Elapsed(Duration::ZERO));
        fx.tick(Tick::Elapsed(Duration::ZERO));
        assert_eq!(fx.engine.state(), TurnState::RoundComplete);
        assert_eq!(fx.engine.active_player(), PlayerId::new(0));

        fx.tick(Tick::Elapsed(Duration::from_millis(499)));
        assert_eq!(fx.engine.state(), TurnState::RoundComplete);

        fx.tick(Tick::Elapsed(Duration::from_millis(1)));
        assert_eq!(fx.engine.state(), TurnState::AwaitingRoll);
        assert_eq!(fx.engine.active_player(), PlayerId::new(1));
    }

    #[test]
    fn overshoot_hands_over_without_animation() {
        let mut fx = Fixture::new(TimingConfig::instant(), &[6]);
        fx.roster.set_position(PlayerId::new(0), Cell::new(95));
        fx.engine.begin_roll();
        fx.tick(Tick::Advance);

        assert_eq!(fx.engine.state(), TurnState::AwaitingRoll);
        assert_eq!(fx.roster.position(PlayerId::new(0)), Some(Cell::new(95)));
        assert_eq!(
            fx.events,
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
    }

    #[test]
    fn landing_on_final_cell_ends_game() {
        let mut fx = Fixture::new(TimingConfig::instant(), &[2]);
        fx.roster.set_position(PlayerId::new(0), Cell::new(98));
        fx.play_turn();

        assert_eq!(fx.engine.state(), TurnState::GameOver);
        assert_eq!(fx.engine.winner(), Some(PlayerId::new(0)));
        assert_eq!(
            fx.events.last(),
            Some(&GameEvent::PlayerWon {
                player: PlayerId::new(0)
            })
        );
        assert!(fx.engine.check_invariants().is_ok());

        // ticks after the game is over change nothing
        fx.tick(Tick::Advance);
        assert_eq!(fx.engine.state(), TurnState::GameOver);
    }

    #[test]
    fn restart_resets_turn_bookkeeping() {
        let mut fx = Fixture::new(TimingConfig::instant(), &[2]);
        fx.roster.set_position(PlayerId::new(0), Cell::new(98));
        fx.play_turn();
        fx.engine.restart();

        assert_eq!(fx.engine.state(), TurnState::AwaitingRoll);
        assert_eq!(fx.engine.winner(), None);
        assert_eq!(fx.engine.active_player(), PlayerId::new(0));
        assert_eq!(fx.engine.turns_completed(), 0);
        assert!(fx.engine.check_invariants().is_ok());
    }

    #[test]
    fn out_of_range_dice_are_clamped_and_reported() {
        struct Broken;
        impl DiceRoller for Broken {
            fn roll(&mut self) -> u8 {
                9
            }
        }

        let collector = Arc::new(CollectingObserver::new());
        let mut fx = Fixture::new(TimingConfig::instant(), &[1]);
        fx.dice = Box::new(Broken);
        fx.observer = Some(collector.clone() as Arc<dyn ViolationObserver>);
        fx.engine.begin_roll();
        fx.tick(Tick::Advance);

        assert_eq!(fx.engine.last_roll(), Some(6));
        assert!(collector.has_violation(ViolationKind::DiceRange));
    }

    #[test]
    fn chained_transition_is_reported_to_observer() {
        let collector = Arc::new(CollectingObserver::new());
        let mut fx = Fixture::new(TimingConfig::instant(), &[2]);
        fx.topology = BoardTopology::new_unchecked(&[(60, 20)], &[(3, 60)]);
        fx.observer = Some(collector.clone() as Arc<dyn ViolationObserver>);
        fx.play_turn();

        assert_eq!(fx.roster.position(PlayerId::new(0)), Some(Cell::new(60)));
        assert!(collector.has_violation(ViolationKind::Topology));
    }

    #[test]
    fn invariants_hold_throughout_a_turn() {
        let mut fx = Fixture::new(TimingConfig::instant(), &[6]);
        fx.engine.begin_roll();
        assert!(fx.engine.check_invariants().is_ok());
        while fx.engine.state() != TurnState::AwaitingRoll {
            fx.tick(Tick::Advance);
            assert!(fx.engine.check_invariants().is_ok());
        }
    }
}
