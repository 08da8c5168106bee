/// The 4×4 board of tile ranks.
///
/// A cell holds a rank, not a face value: 0 is empty, rank r is shown as 2^r.
/// Storage is row-major, `cells[row][col]`, row 0 at the top.
///
/// Rotation is the only way directional code gets reused: every move is
/// "rotate k times, reduce rows toward column 0, rotate 4-k times".

pub const SIZE: usize = 4;

/// Highest rank a cell may hold. `1 << MAX_RANK` still fits the score step.
/// Merging two tiles of this rank is a debug assertion; release builds clamp
/// the result here and the second tile's value is lost.
pub const MAX_RANK: u8 = 31;

/// Rank of the 2048 tile.
pub const WIN_RANK: u8 = 11;

pub type Rank = u8;
pub type Row = [Rank; SIZE];

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Grid {
    cells: [Row; SIZE],
}

impl Grid {
    pub const EMPTY: Grid = Grid { cells: [[0; SIZE]; SIZE] };

    pub fn new() -> Self {
        Self::EMPTY
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn from_rows(cells: [Row; SIZE]) -> Self {
        Grid { cells }
    }

    pub fn rows(&self) -> &[Row; SIZE] {
        &self.cells
    }

    pub fn row_mut(&mut self, row: usize) -> &mut Row {
        &mut self.cells[row]
    }

    pub fn get(&self, row: usize, col: usize) -> Rank {
        self.cells[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, rank: Rank) {
        debug_assert!(rank <= MAX_RANK, "rank {rank} out of range");
        self.cells[row][col] = rank;
    }

    pub fn clear(&mut self) {
        self.cells = [[0; SIZE]; SIZE];
    }

    /// Coordinates of every empty cell, in row-major order.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(SIZE * SIZE);
        for (r, row) in self.cells.iter().enumerate() {
            for (c, &rank) in row.iter().enumerate() {
                if rank == 0 {
                    out.push((r, c));
                }
            }
        }
        out
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().flatten().filter(|&&r| r == 0).count()
    }

    pub fn max_rank(&self) -> Rank {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Sum of face values over the board (2^rank per occupied cell).
    pub fn tile_sum(&self) -> u64 {
        self.cells
            .iter()
            .flatten()
            .filter(|&&r| r > 0)
            .map(|&r| face_value(r))
            .sum()
    }

    /// Rotate 90° counter-clockwise in place.
    ///
    /// Walks each concentric ring and cycles four cells at a time through a
    /// single temporary. The right column becomes the top row.
    pub fn rotate_ccw(&mut self) {
        let n = SIZE;
        let b = &mut self.cells;
        for i in 0..n / 2 {
            for j in i..n - i - 1 {
                let tmp = b[i][j];
                b[i][j] = b[j][n - i - 1];
                b[j][n - i - 1] = b[n - i - 1][n - j - 1];
                b[n - i - 1][n - j - 1] = b[n - j - 1][i];
                b[n - j - 1][i] = tmp;
            }
        }
    }

    /// Rotate counter-clockwise `times` quarter turns (taken mod 4).
    pub fn rotate_times(&mut self, times: usize) {
        for _ in 0..times % 4 {
            self.rotate_ccw();
        }
    }

    /// Any two equal, non-empty cells side by side within a row?
    pub fn has_horizontal_pair(&self) -> bool {
        self.cells
            .iter()
            .any(|row| row.windows(2).any(|w| w[0] != 0 && w[0] == w[1]))
    }
}

/// Face value shown for a rank (0 for empty).
pub fn face_value(rank: Rank) -> u64 {
    if rank == 0 { 0 } else { 1u64 << rank }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Build a grid from rank diagrams, one string per row: "1 0 2 0".
    pub(crate) fn grid_from(rows: &[&str; SIZE]) -> Grid {
        let mut g = Grid::new();
        for (r, line) in rows.iter().enumerate() {
            for (c, tok) in line.split_whitespace().enumerate() {
                g.set(r, c, tok.parse().expect("rank"));
            }
        }
        g
    }

    pub(crate) fn any_grid() -> impl Strategy<Value = Grid> {
        prop::array::uniform4(prop::array::uniform4(0u8..=12)).prop_map(Grid::from_rows)
    }

    #[test]
    fn rotate_moves_right_column_to_top() {
        let mut g = grid_from(&[
            "1 2 3 4",
            "5 6 7 8",
            "9 10 11 12",
            "13 14 15 16",
        ]);
        g.rotate_ccw();
        assert_eq!(g, grid_from(&[
            "4 8 12 16",
            "3 7 11 15",
            "2 6 10 14",
            "1 5 9 13",
        ]));
    }

    #[test]
    fn rotate_times_wraps() {
        let g = grid_from(&["1 2 0 0", "0 3 0 0", "0 0 0 4", "5 0 0 0"]);
        let mut a = g;
        a.rotate_times(5);
        let mut b = g;
        b.rotate_ccw();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_cells_are_row_major() {
        let g = grid_from(&["1 0 1 1", "1 1 1 1", "1 1 1 0", "1 1 1 1"]);
        assert_eq!(g.empty_cells(), vec![(0, 1), (2, 3)]);
        assert_eq!(g.count_empty(), 2);
    }

    #[test]
    fn horizontal_pair_ignores_empties() {
        let g = grid_from(&["0 0 1 2", "0 0 0 0", "0 0 0 0", "0 0 0 0"]);
        assert!(!g.has_horizontal_pair());
        let g = grid_from(&["0 3 3 0", "0 0 0 0", "0 0 0 0", "0 0 0 0"]);
        assert!(g.has_horizontal_pair());
    }

    #[test]
    fn face_values() {
        assert_eq!(face_value(0), 0);
        assert_eq!(face_value(1), 2);
        assert_eq!(face_value(11), 2048);
    }

    proptest! {
        #[test]
        fn four_rotations_are_identity(g in any_grid()) {
            let mut r = g;
            for _ in 0..4 { r.rotate_ccw(); }
            prop_assert_eq!(r, g);
        }

        #[test]
        fn rotation_preserves_contents(g in any_grid()) {
            let mut r = g;
            r.rotate_ccw();
            prop_assert_eq!(r.tile_sum(), g.tile_sum());
            prop_assert_eq!(r.count_empty(), g.count_empty());
        }
    }
}
