use std::collections::BTreeMap;

use crate::error::{ConfigurationErrorKind, GameResult};
use crate::telemetry::{InvariantChecker, InvariantViolation};
use crate::{Cell, StepKind, GRID_WIDTH};

/// Whether a transition is a snake or a ladder.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TransitionKind {
    /// Leads from a snake's head down to its tail.
    Snake,
    /// Leads from a ladder's bottom up to its top.
    Ladder,
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionKind::Snake => write!(f, "snake"),
            TransitionKind::Ladder => write!(f, "ladder"),
        }
    }
}

/// A single snake or ladder.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Transition {
    /// Snake or ladder.
    pub kind: TransitionKind,
    /// The cell a token must land on to trigger the transition.
    pub from: Cell,
    /// The cell the token ends up on.
    pub to: Cell,
}

impl Transition {
    /// The kind of path step this transition produces.
    #[must_use]
    pub const fn step_kind(&self) -> StepKind {
        match self.kind {
            TransitionKind::Snake => StepKind::Snake,
            TransitionKind::Ladder => StepKind::Ladder,
        }
    }
}

/// Where a cell sits on the 10×10 grid.
///
/// Row 0 is the bottom row. The track runs left-to-right on even rows and right-to-left on odd
/// rows, so consecutive cells are always adjacent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GridPosition {
    /// Row index, 0 at the bottom.
    pub row: u8,
    /// Column index, 0 on the left.
    pub col: u8,
}

/// The immutable set of snakes and ladders on a board.
///
/// Construction validates the topology:
/// - every transition starts on a cell in `1..=99` and ends on a cell in `1..=100`
/// - snakes lead strictly down, ladders strictly up, nothing maps onto itself
/// - no cell is both a snake head and a ladder bottom
/// - no transition ends on the start of another (transitions never chain)
///
/// # Examples
///
/// ```
/// use ladder_session::{BoardTopology, Cell};
///
/// let board = BoardTopology::standard();
/// assert_eq!(board.lookup(Cell::new(56)), Some(Cell::new(53)));
/// assert_eq!(board.lookup(Cell::new(80)), Some(Cell::FINAL));
/// assert_eq!(board.lookup(Cell::new(2)), None);
///
/// // A ladder that leads downwards is rejected.
/// assert!(BoardTopology::new([], [(30u8, 10u8)]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardTopology {
    snakes: BTreeMap<Cell, Cell>,
    ladders: BTreeMap<Cell, Cell>,
}

impl BoardTopology {
    /// Snakes of the standard board as `(head, tail)` pairs.
    pub const STANDARD_SNAKES: [(u8, u8); 10] = [
        (16, 6),
        (47, 26),
        (49, 11),
        (56, 53),
        (62, 19),
        (64, 60),
        (87, 24),
        (93, 73),
        (95, 75),
        (98, 78),
    ];

    /// Ladders of the standard board as `(bottom, top)` pairs.
    pub const STANDARD_LADDERS: [(u8, u8); 9] = [
        (1, 38),
        (4, 14),
        (9, 31),
        (21, 42),
        (28, 84),
        (36, 44),
        (51, 67),
        (71, 91),
        (80, 100),
    ];

    /// Builds a topology from `(head, tail)` snake pairs and `(bottom, top)` ladder pairs.
    ///
    /// # Errors
    /// Returns a [`GameError::Configuration`](crate::GameError::Configuration) naming the first
    /// broken rule (see the type-level docs).
    pub fn new<S, L, C>(snakes: S, ladders: L) -> GameResult<Self>
    where
        S: IntoIterator<Item = (C, C)>,
        L: IntoIterator<Item = (C, C)>,
        C: Into<Cell>,
    {
        let mut topology = Self::empty();
        for (head, tail) in snakes {
            let head = head.into();
            if topology.snakes.insert(head, tail.into()).is_some() {
                return Err(ConfigurationErrorKind::OverlappingTransition { cell: head }.into());
            }
        }
        for (bottom, top) in ladders {
            let bottom = bottom.into();
            if topology.snakes.contains_key(&bottom)
                || topology.ladders.insert(bottom, top.into()).is_some()
            {
                return Err(ConfigurationErrorKind::OverlappingTransition { cell: bottom }.into());
            }
        }
        topology.validate()?;
        Ok(topology)
    }

    /// The standard board: 10 snakes and 9 ladders.
    #[must_use]
    pub fn standard() -> Self {
        let snakes = Self::STANDARD_SNAKES
            .iter()
            .map(|&(head, tail)| (Cell::new(head), Cell::new(tail)))
            .collect();
        let ladders = Self::STANDARD_LADDERS
            .iter()
            .map(|&(bottom, top)| (Cell::new(bottom), Cell::new(top)))
            .collect();
        Self { snakes, ladders }
    }

    /// A board without snakes or ladders.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            snakes: BTreeMap::new(),
            ladders: BTreeMap::new(),
        }
    }

    /// Builds a topology without validating it.
    ///
    /// Lets tests exercise how the resolver copes with broken topologies. Snakes and ladders
    /// sharing a start cell resolve as the snake.
    #[doc(hidden)]
    #[must_use]
    pub fn new_unchecked(snakes: &[(u8, u8)], ladders: &[(u8, u8)]) -> Self {
        Self {
            snakes: snakes
                .iter()
                .map(|&(h, t)| (Cell::new(h), Cell::new(t)))
                .collect(),
            ladders: ladders
                .iter()
                .map(|&(b, t)| (Cell::new(b), Cell::new(t)))
                .collect(),
        }
    }

    /// Returns the destination of the snake or ladder starting at `cell`, if any.
    #[must_use]
    pub fn lookup(&self, cell: Cell) -> Option<Cell> {
        self.transition(cell).map(|t| t.to)
    }

    /// Returns the snake or ladder starting at `cell`, if any.
    #[must_use]
    pub fn transition(&self, cell: Cell) -> Option<Transition> {
        if let Some(&to) = self.snakes.get(&cell) {
            return Some(Transition {
                kind: TransitionKind::Snake,
                from: cell,
                to,
            });
        }
        self.ladders.get(&cell).map(|&to| Transition {
            kind: TransitionKind::Ladder,
            from: cell,
            to,
        })
    }

    /// Iterates over all snakes, ordered by head cell.
    pub fn snakes(&self) -> impl Iterator<Item = Transition> + '_ {
        self.snakes.iter().map(|(&from, &to)| Transition {
            kind: TransitionKind::Snake,
            from,
            to,
        })
    }

    /// Iterates over all ladders, ordered by bottom cell.
    pub fn ladders(&self) -> impl Iterator<Item = Transition> + '_ {
        self.ladders.iter().map(|(&from, &to)| Transition {
            kind: TransitionKind::Ladder,
            from,
            to,
        })
    }

    /// All snakes and ladders, ordered by start cell.
    #[must_use]
    pub fn transitions(&self) -> Vec<Transition> {
        let mut all: Vec<Transition> = self.snakes().chain(self.ladders()).collect();
        all.sort_by_key(|t| t.from);
        all
    }

    /// Number of snakes and ladders on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snakes.len() + self.ladders.len()
    }

    /// Returns `true` if the board has no snakes or ladders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snakes.is_empty() && self.ladders.is_empty()
    }

    /// Position of `cell` on the serpentine 10×10 grid, or `None` for cells off the board.
    ///
    /// ```
    /// use ladder_session::{BoardTopology, Cell, GridPosition};
    ///
    /// assert_eq!(BoardTopology::grid_position(Cell::new(1)), Some(GridPosition { row: 0, col: 0 }));
    /// assert_eq!(BoardTopology::grid_position(Cell::new(11)), Some(GridPosition { row: 1, col: 9 }));
    /// assert_eq!(BoardTopology::grid_position(Cell::OFF_BOARD), None);
    /// ```
    #[must_use]
    pub fn grid_position(cell: Cell) -> Option<GridPosition> {
        if !cell.is_on_board() {
            return None;
        }
        let index = cell.as_u8() - 1;
        let row = index / GRID_WIDTH;
        let offset = index % GRID_WIDTH;
        let col = if row % 2 == 0 {
            offset
        } else {
            GRID_WIDTH - 1 - offset
        };
        Some(GridPosition { row, col })
    }

    fn validate(&self) -> Result<(), ConfigurationErrorKind> {
        for t in self.snakes().chain(self.ladders()) {
            Self::validate_transition(t)?;
        }
        if let Some(&cell) = self.snakes.keys().find(|c| self.ladders.contains_key(c)) {
            return Err(ConfigurationErrorKind::OverlappingTransition { cell });
        }
        for t in self.snakes().chain(self.ladders()) {
            if self.snakes.contains_key(&t.to) || self.ladders.contains_key(&t.to) {
                return Err(ConfigurationErrorKind::ChainedTransition {
                    from: t.from,
                    via: t.to,
                });
            }
        }
        Ok(())
    }

    fn validate_transition(t: Transition) -> Result<(), ConfigurationErrorKind> {
        if t.from.is_final() {
            return Err(ConfigurationErrorKind::TransitionFromFinalCell);
        }
        if !t.from.is_on_board() {
            return Err(ConfigurationErrorKind::CellOutOfRange { cell: t.from });
        }
        if !t.to.is_on_board() {
            return Err(ConfigurationErrorKind::CellOutOfRange { cell: t.to });
        }
        if t.from == t.to {
            return Err(ConfigurationErrorKind::SelfLoop { cell: t.from });
        }
        match t.kind {
            TransitionKind::Snake if t.to > t.from => {
                Err(ConfigurationErrorKind::SnakeNotDescending {
                    head: t.from,
                    tail: t.to,
                })
            },
            TransitionKind::Ladder if t.to < t.from => {
                Err(ConfigurationErrorKind::LadderNotAscending {
                    bottom: t.from,
                    top: t.to,
                })
            },
            _ => Ok(()),
        }
    }
}

impl Default for BoardTopology {
    fn default() -> Self {
        Self::standard()
    }
}

impl InvariantChecker for BoardTopology {
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.validate().map_err(|kind| {
            InvariantViolation::new("BoardTopology", "topology rules broken")
                .with_details(kind.to_string())
        })
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
    use crate::{GameError, BOARD_CELLS};

    fn config_kind(result: GameResult<BoardTopology>) -> ConfigurationErrorKind {
        match result {
            Err(GameError::Configuration { kind }) => kind,
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn standard_board_is_valid() {
        let board = BoardTopology::standard();
        assert!(board.check_invariants().is_ok());
        assert_eq!(board.snakes().count(), 10);
        assert_eq!(board.ladders().count(), 9);
        assert_eq!(board.len(), 19);
    }

    #[test]
    fn standard_board_matches_validated_construction() {
        let validated = BoardTopology::new(
            BoardTopology::STANDARD_SNAKES,
            BoardTopology::STANDARD_LADDERS,
        )
        .unwrap();
        assert_eq!(validated, BoardTopology::standard());
    }

    #[test]
    fn lookup_distinguishes_snakes_and_ladders() {
        let board = BoardTopology::standard();
        let snake = board.transition(Cell::new(98)).unwrap();
        assert_eq!(snake.kind, TransitionKind::Snake);
        assert_eq!(snake.to, Cell::new(78));
        assert_eq!(snake.step_kind(), StepKind::Snake);

        let ladder = board.transition(Cell::new(28)).unwrap();
        assert_eq!(ladder.kind, TransitionKind::Ladder);
        assert_eq!(ladder.to, Cell::new(84));

        assert_eq!(board.transition(Cell::FINAL), None);
        assert_eq!(board.lookup(Cell::new(50)), None);
    }

    #[test]
    fn transitions_are_sorted_by_start() {
        let board = BoardTopology::standard();
        let starts: Vec<u8> = board.transitions().iter().map(|t| t.from.as_u8()).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);
        assert_eq!(starts.first(), Some(&1));
        assert_eq!(starts.last(), Some(&98));
    }

    #[test]
    fn empty_board() {
        let board = BoardTopology::empty();
        assert!(board.is_empty());
        assert!(board.transitions().is_empty());
        assert!(board.check_invariants().is_ok());
    }

    #[test]
    fn rejects_snake_going_up() {
        let kind = config_kind(BoardTopology::new([(10u8, 20u8)], []));
        assert_eq!(
            kind,
            ConfigurationErrorKind::SnakeNotDescending {
                head: Cell::new(10),
                tail: Cell::new(20)
            }
        );
    }

    #[test]
    fn rejects_ladder_going_down() {
        let kind = config_kind(BoardTopology::new([], [(30u8, 10u8)]));
        assert!(matches!(kind, ConfigurationErrorKind::LadderNotAscending { .. }));
    }

    #[test]
    fn rejects_self_loop() {
        let kind = config_kind(BoardTopology::new([(40u8, 40u8)], []));
        assert_eq!(kind, ConfigurationErrorKind::SelfLoop { cell: Cell::new(40) });
    }

    #[test]
    fn rejects_transition_from_final_cell() {
        let kind = config_kind(BoardTopology::new([(100u8, 1u8)], []));
        assert_eq!(kind, ConfigurationErrorKind::TransitionFromFinalCell);
    }

    #[test]
    fn rejects_cells_outside_board() {
        let kind = config_kind(BoardTopology::new([], [(0u8, 10u8)]));
        assert_eq!(kind, ConfigurationErrorKind::CellOutOfRange { cell: Cell::new(0) });

        let kind = config_kind(BoardTopology::new([], [(90u8, 120u8)]));
        assert_eq!(kind, ConfigurationErrorKind::CellOutOfRange { cell: Cell::new(120) });
    }

    #[test]
    fn rejects_overlapping_keys() {
        let kind = config_kind(BoardTopology::new([(40u8, 10u8)], [(40u8, 60u8)]));
        assert_eq!(
            kind,
            ConfigurationErrorKind::OverlappingTransition { cell: Cell::new(40) }
        );
    }

    #[test]
    fn rejects_duplicate_snake_heads() {
        let kind = config_kind(BoardTopology::new([(40u8, 10u8), (40u8, 20u8)], []));
        assert_eq!(
            kind,
            ConfigurationErrorKind::OverlappingTransition { cell: Cell::new(40) }
        );
    }

    #[test]
    fn rejects_chained_transitions() {
        let kind = config_kind(BoardTopology::new([(60u8, 20u8)], [(10u8, 60u8)]));
        assert_eq!(
            kind,
            ConfigurationErrorKind::ChainedTransition {
                from: Cell::new(10),
                via: Cell::new(60)
            }
        );
    }

    #[test]
    fn unchecked_topology_fails_invariant_check() {
        let board = BoardTopology::new_unchecked(&[(60, 20)], &[(10, 60)]);
        let violation = board.check_invariants().unwrap_err();
        assert_eq!(violation.type_name, "BoardTopology");
        assert!(violation.details.unwrap().contains("60"));
    }

    #[test]
    fn grid_positions_snake_through_rows() {
        let pos = |c: u8| BoardTopology::grid_position(Cell::new(c)).unwrap();
        assert_eq!(pos(1), GridPosition { row: 0, col: 0 });
        assert_eq!(pos(10), GridPosition { row: 0, col: 9 });
        assert_eq!(pos(11), GridPosition { row: 1, col: 9 });
        assert_eq!(pos(20), GridPosition { row: 1, col: 0 });
        assert_eq!(pos(21), GridPosition { row: 2, col: 0 });
        assert_eq!(pos(100), GridPosition { row: 9, col: 0 });
        assert_eq!(BoardTopology::grid_position(Cell::new(101)), None);
    }

    #[test]
    fn consecutive_cells_are_grid_neighbours() {
        for c in 1..BOARD_CELLS {
            let a = BoardTopology::grid_position(Cell::new(c)).unwrap();
            let b = BoardTopology::grid_position(Cell::new(c + 1)).unwrap();
            let distance = a.row.abs_diff(b.row) + a.col.abs_diff(b.col);
            assert_eq!(distance, 1, "cells {c} and {} are not adjacent", c + 1);
        }
    }
}
