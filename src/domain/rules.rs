/// Game-over detection.
///
/// ┌──────────────────────────────┬──────────────┐
/// │ Condition (checked in order)  │ Terminal?    │
/// ├──────────────────────────────┼──────────────┤
/// │ any empty cell                │ NO           │
/// │ equal neighbours in a row     │ NO           │
/// │ equal neighbours in a column  │ NO           │
/// │ otherwise                     │ YES          │
/// └──────────────────────────────┴──────────────┘
///
/// Columns are checked by turning the board once and reusing the row test,
/// then turning it three more times. The board is identical on return.

use super::grid::{Grid, SIZE};

pub fn is_terminal(grid: &mut Grid) -> bool {
    if grid.count_empty() > 0 {
        return false;
    }
    if grid.has_horizontal_pair() {
        return false;
    }
    grid.rotate_ccw();
    let ended = !grid.has_horizontal_pair();
    grid.rotate_times(3);
    ended
}

/// `!is_terminal` without turning the board, for shared borrows.
pub fn has_moves(grid: &Grid) -> bool {
    if grid.count_empty() > 0 || grid.has_horizontal_pair() {
        return true;
    }
    let rows = grid.rows();
    (0..SIZE - 1).any(|r| (0..SIZE).any(|c| rows[r][c] == rows[r + 1][c]))
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::tests::{any_grid, grid_from};
    use proptest::prelude::*;

    fn checkerboard() -> Grid {
        grid_from(&[
            "1 2 1 2",
            "2 1 2 1",
            "1 2 1 2",
            "2 1 2 1",
        ])
    }

    #[test]
    fn packed_checkerboard_is_terminal() {
        let mut g = checkerboard();
        assert!(is_terminal(&mut g));
        assert_eq!(g, checkerboard());
        assert!(!has_moves(&g));
    }

    #[test]
    fn one_hole_reopens_the_game() {
        let mut g = checkerboard();
        g.set(2, 1, 0);
        assert!(!is_terminal(&mut g));
    }

    #[test]
    fn horizontal_pair_keeps_game_alive() {
        let mut g = grid_from(&[
            "1 2 1 2",
            "2 1 2 1",
            "1 2 2 3",
            "2 1 3 1",
        ]);
        assert!(!is_terminal(&mut g));
    }

    #[test]
    fn vertical_pair_keeps_game_alive() {
        let mut g = grid_from(&[
            "1 2 1 2",
            "2 1 2 1",
            "1 2 1 3",
            "2 1 4 3",
        ]);
        assert!(has_moves(&g));
        assert!(!is_terminal(&mut g));
    }

    #[test]
    fn empty_grid_is_not_terminal() {
        assert!(!is_terminal(&mut Grid::new()));
    }

    proptest! {
        #[test]
        fn check_leaves_grid_untouched(g in any_grid()) {
            let snapshot = g;
            let mut probe = g;
            is_terminal(&mut probe);
            prop_assert_eq!(probe, snapshot);
        }

        #[test]
        fn has_moves_agrees_with_is_terminal(g in any_grid()) {
            let mut probe = g;
            prop_assert_eq!(has_moves(&g), !is_terminal(&mut probe));
        }

        #[test]
        fn has_moves_agrees_on_crowded_boards(
            rows in prop::array::uniform4(prop::array::uniform4(1u8..=4))
        ) {
            let g = Grid::from_rows(rows);
            let mut probe = g;
            prop_assert_eq!(has_moves(&g), !is_terminal(&mut probe));
        }
    }
}
