use smallvec::SmallVec;

use crate::board::{BoardTopology, Transition};
use crate::{Cell, StepKind};

/// The longest possible path: six hops plus a transition, plus the start cell.
const INLINE_PATH_LEN: usize = 8;

/// Something unexpected the resolver tolerated while computing a path.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PathAnomaly {
    /// A roll of zero was resolved. The token stays put.
    ZeroRoll,
    /// The transition taken ends on the start of another transition, which was not followed.
    ChainedTransition {
        /// Start of the transition that was taken.
        from: Cell,
        /// Its destination, which starts another transition.
        via: Cell,
    },
}

/// The exact sequence of cells a token visits during one move.
///
/// The first entry is the start cell. Then comes every cell up to the landing cell, one hop at a
/// time. If the landing cell starts a snake or ladder, one more entry holds the destination,
/// which is the resting cell. A path of length one means the token did not move.
///
/// # Examples
///
/// ```
/// use ladder_session::{resolve, BoardTopology, Cell, StepKind};
///
/// let board = BoardTopology::standard();
/// let path = resolve(Cell::new(50), 6, &board);
///
/// let cells: Vec<u8> = path.cells().iter().map(|c| c.as_u8()).collect();
/// assert_eq!(cells, vec![50, 51, 52, 53, 54, 55, 56, 53]);
/// assert_eq!(path.landing_cell(), Cell::new(56));
/// assert_eq!(path.resting_cell(), Cell::new(53));
/// assert_eq!(path.step_kind(7), Some(StepKind::Snake));
/// assert!(!path.is_win());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct MovementPath {
    start: Cell,
    roll: u8,
    cells: SmallVec<[Cell; INLINE_PATH_LEN]>,
    transition: Option<Transition>,
    blocked: bool,
    anomaly: Option<PathAnomaly>,
}

impl MovementPath {
    fn stationary(start: Cell, roll: u8) -> Self {
        let mut cells = SmallVec::new();
        cells.push(start);
        Self {
            start,
            roll,
            cells,
            transition: None,
            blocked: false,
            anomaly: None,
        }
    }

    /// All cells of the path, start cell included.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The cell the move started on.
    #[must_use]
    pub fn start(&self) -> Cell {
        self.start
    }

    /// The roll this path was resolved for.
    #[must_use]
    pub fn roll(&self) -> u8 {
        self.roll
    }

    /// The cell reached by hopping, before any snake or ladder is applied.
    #[must_use]
    pub fn landing_cell(&self) -> Cell {
        match self.transition {
            Some(transition) => transition.from,
            None => self.resting_cell(),
        }
    }

    /// Where the token ends up once the move is complete.
    #[must_use]
    pub fn resting_cell(&self) -> Cell {
        self.cells.last().copied().unwrap_or(self.start)
    }

    /// The snake or ladder taken at the end of the move, if any.
    #[must_use]
    pub fn transition(&self) -> Option<Transition> {
        self.transition
    }

    /// Whether the roll would have carried the token past the final cell.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Whether the token stays where it is.
    #[must_use]
    pub fn is_stationary(&self) -> bool {
        self.cells.len() <= 1
    }

    /// Whether the move ends on the final cell. A blocked roll never wins.
    #[must_use]
    pub fn is_win(&self) -> bool {
        !self.blocked && self.resting_cell().is_final()
    }

    /// Anything the resolver had to tolerate.
    #[must_use]
    pub fn anomaly(&self) -> Option<PathAnomaly> {
        self.anomaly
    }

    /// Number of entries, start cell included. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`: a path holds at least its start cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// How the token reaches entry `index`.
    ///
    /// Returns `None` for the start cell (index 0) and for indices past the end.
    #[must_use]
    pub fn step_kind(&self, index: usize) -> Option<StepKind> {
        if index == 0 || index >= self.cells.len() {
            return None;
        }
        match self.transition {
            Some(transition) if index == self.cells.len() - 1 => Some(transition.step_kind()),
            _ => Some(StepKind::Move),
        }
    }
}

/// Computes the path a token takes from `start` for a given `roll`.
///
/// - A move past the final cell is blocked: the path is just `[start]`.
/// - Otherwise the token hops one cell at a time to `start + roll`.
/// - Only the landing cell is checked for a snake or ladder; its destination is appended once.
///   A destination that starts another transition is not followed; the path records it as a
///   [`PathAnomaly::ChainedTransition`].
///
/// ```
/// use ladder_session::{resolve, BoardTopology, Cell};
///
/// let board = BoardTopology::standard();
/// assert!(resolve(Cell::new(98), 2, &board).is_win());
/// assert!(resolve(Cell::new(95), 6, &board).is_blocked());
/// ```
#[must_use]
pub fn resolve(start: Cell, roll: u8, topology: &BoardTopology) -> MovementPath {
    if roll == 0 {
        let mut path = MovementPath::stationary(start, roll);
        path.anomaly = Some(PathAnomaly::ZeroRoll);
        return path;
    }

    let Some(target) = start.checked_advance(roll) else {
        let mut path = MovementPath::stationary(start, roll);
        path.blocked = true;
        return path;
    };

    let mut path = MovementPath::stationary(start, roll);
    let mut cell = start;
    while cell < target {
        let Some(next) = cell.next() else { break };
        path.cells.push(next);
        cell = next;
    }

    if target.is_final() {
        return path;
    }

    if let Some(transition) = topology.transition(target) {
        path.cells.push(transition.to);
        path.transition = Some(transition);

        if topology.transition(transition.to).is_some() {
            path.anomaly = Some(PathAnomaly::ChainedTransition {
                from: transition.from,
                via: transition.to,
            });
        }
    }

    path
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
    use crate::board::TransitionKind;
    use crate::BOARD_CELLS;
    use proptest::prelude::*;

    fn cells(path: &MovementPath) -> Vec<u8> {
        path.cells().iter().map(|c| c.as_u8()).collect()
    }

    #[test]
    fn plain_move_from_first_cell() {
        let path = resolve(Cell::new(1), 1, &BoardTopology::standard());
        assert_eq!(cells(&path), vec![1, 2]);
        assert_eq!(path.transition(), None);
        assert_eq!(path.step_kind(1), Some(StepKind::Move));
    }

    #[test]
    fn exact_landing_on_final_cell_wins() {
        let path = resolve(Cell::new(98), 2, &BoardTopology::standard());
        assert_eq!(cells(&path), vec![98, 99, 100]);
        assert!(path.is_win());
    }

    #[test]
    fn snake_appends_tail() {
        let path = resolve(Cell::new(50), 6, &BoardTopology::standard());
        assert_eq!(cells(&path), vec![50, 51, 52, 53, 54, 55, 56, 53]);
        assert_eq!(path.resting_cell(), Cell::new(53));
        assert_eq!(path.landing_cell(), Cell::new(56));
        assert_eq!(path.transition().unwrap().kind, TransitionKind::Snake);
        assert!(!path.is_win());
    }

    #[test]
    fn ladder_to_final_cell_wins() {
        let path = resolve(Cell::new(77), 3, &BoardTopology::standard());
        assert_eq!(cells(&path), vec![77, 78, 79, 80, 100]);
        assert_eq!(path.step_kind(4), Some(StepKind::Ladder));
        assert!(path.is_win());
    }

    #[test]
    fn overshoot_blocks_move() {
        let path = resolve(Cell::new(95), 6, &BoardTopology::standard());
        assert_eq!(cells(&path), vec![95]);
        assert!(path.is_blocked());
        assert!(path.is_stationary());
        assert!(!path.is_win());
    }

    #[test]
    fn intermediate_cells_never_trigger_transitions() {
        // Passing over the snake head at 16 does nothing.
        let path = resolve(Cell::new(14), 4, &BoardTopology::standard());
        assert_eq!(cells(&path), vec![14, 15, 16, 17, 18]);
        assert_eq!(path.transition(), None);
    }

    #[test]
    fn entering_from_off_board_takes_ladder_on_first_cell() {
        let path = resolve(Cell::OFF_BOARD, 1, &BoardTopology::standard());
        assert_eq!(cells(&path), vec![0, 1, 38]);
        assert_eq!(path.step_kind(2), Some(StepKind::Ladder));
    }

    #[test]
    fn zero_roll_is_tolerated() {
        let path = resolve(Cell::new(10), 0, &BoardTopology::standard());
        assert_eq!(cells(&path), vec![10]);
        assert_eq!(path.anomaly(), Some(PathAnomaly::ZeroRoll));
        assert!(!path.is_blocked());
    }

    #[test]
    fn chained_transition_is_flagged_not_followed() {
        let board = BoardTopology::new_unchecked(&[(60, 20)], &[(10, 60)]);
        let path = resolve(Cell::new(7), 3, &board);
        assert_eq!(cells(&path), vec![7, 8, 9, 10, 60]);
        assert_eq!(
            path.anomaly(),
            Some(PathAnomaly::ChainedTransition {
                from: Cell::new(10),
                via: Cell::new(60)
            })
        );
    }

    #[test]
    fn roll_from_final_cell_is_blocked_and_not_a_win() {
        let path = resolve(Cell::new(100), 1, &BoardTopology::standard());
        assert_eq!(cells(&path), vec![100]);
        assert!(path.is_blocked());
        assert!(!path.is_win());
    }

    #[test]
    fn step_kind_out_of_range() {
        let path = resolve(Cell::new(1), 2, &BoardTopology::empty());
        assert_eq!(path.step_kind(0), None);
        assert_eq!(path.step_kind(3), None);
    }

    proptest! {
        #[test]
        fn prop_overshoot_is_stationary(start in 95u8..=100, roll in 1u8..=6) {
            prop_assume!(u16::from(start) + u16::from(roll) > u16::from(BOARD_CELLS));
            let path = resolve(Cell::new(start), roll, &BoardTopology::standard());
            prop_assert_eq!(cells(&path), vec![start]);
            prop_assert!(!path.is_win());
        }

        #[test]
        fn prop_plain_move_has_roll_plus_one_entries(start in 1u8..=99, roll in 1u8..=6) {
            let board = BoardTopology::standard();
            let target = u16::from(start) + u16::from(roll);
            prop_assume!(target <= u16::from(BOARD_CELLS));
            prop_assume!(board.lookup(Cell::new(target as u8)).is_none());

            let path = resolve(Cell::new(start), roll, &board);
            prop_assert_eq!(path.len(), usize::from(roll) + 1);
            prop_assert_eq!(path.resting_cell().as_u8() as u16, target);
        }

        #[test]
        fn prop_snakes_lead_down_and_ladders_up(start in 1u8..=99, roll in 1u8..=6) {
            let board = BoardTopology::standard();
            let path = resolve(Cell::new(start), roll, &board);
            if let Some(transition) = path.transition() {
                let landing = path.landing_cell();
                prop_assert_eq!(path.resting_cell(), transition.to);
                match transition.kind {
                    TransitionKind::Snake => prop_assert!(path.resting_cell() < landing),
                    TransitionKind::Ladder => prop_assert!(path.resting_cell() > landing),
                }
            }
        }

        #[test]
        fn prop_win_iff_resting_on_final_cell(start in 1u8..=99, roll in 1u8..=6) {
            let path = resolve(Cell::new(start), roll, &BoardTopology::standard());
            prop_assert_eq!(path.is_win(), path.resting_cell() == Cell::FINAL);
            for cell in &path.cells()[..path.len() - 1] {
                prop_assert!(cell.as_u8() <= BOARD_CELLS);
            }
        }

        #[test]
        fn prop_hops_are_single_cells(start in 0u8..=99, roll in 1u8..=6) {
            let path = resolve(Cell::new(start), roll, &BoardTopology::standard());
            let hops = if path.transition().is_some() { path.len() - 1 } else { path.len() };
            for pair in path.cells()[..hops].windows(2) {
                prop_assert_eq!(pair[1].as_u8(), pair[0].as_u8() + 1);
            }
        }
    }
}
