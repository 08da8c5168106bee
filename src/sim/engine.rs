/// Move engine: one directional move over the whole grid.
///
/// Processing order:
///   1. Turn the grid so the move points toward column 0
///   2. Reduce every row (rows are independent)
///   3. Turn the grid back
///
/// No tile is spawned here; that is the caller's next step.

use crate::domain::direction::Direction;
use crate::domain::grid::{Grid, Rank, SIZE};
use crate::domain::row;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    pub changed: bool,
    pub reward: u64,
    /// Rank produced by each merge, in reduction order.
    pub merges: Vec<Rank>,
}

pub fn apply_move(grid: &mut Grid, dir: Direction) -> MoveOutcome {
    let turns = dir.rotations();
    let mut out = MoveOutcome::default();

    grid.rotate_times(turns);
    for r in 0..SIZE {
        let row_out = row::reduce_row_with(grid.row_mut(r), |rank| out.merges.push(rank));
        out.changed |= row_out.changed;
        out.reward += row_out.reward;
    }
    grid.rotate_times(4 - turns);

    out
}

/// Would a move in `dir` change anything? Leaves `grid` untouched.
pub fn can_move(grid: &Grid, dir: Direction) -> bool {
    let mut probe = *grid;
    apply_move(&mut probe, dir).changed
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
