/// Row reduction: slide and merge one line of tiles toward index 0.
///
/// Tiles are visited left to right. Each one scans back toward `stop` for
/// its landing cell. After a merge, `stop` moves past the merged cell so a
/// freshly merged tile cannot absorb a third one in the same pass.

use super::grid::{Rank, Row, MAX_RANK, SIZE};

/// What a single reduction did.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct RowOutcome {
    pub changed: bool,
    /// Sum of 2^new_rank over every merge in the row.
    pub reward: u64,
}

/// Landing index for the tile at `x`, never scanning below `stop`.
///
/// Returns `t` when the first occupied cell holds the same rank (merge),
/// `t + 1` when it holds a different rank, `stop` when everything down to
/// `stop` is empty, and `x` itself when `x == 0`.
pub fn find_target(row: &Row, x: usize, stop: usize) -> usize {
    if x == 0 {
        return x;
    }
    let mut t = x - 1;
    loop {
        if row[t] != 0 {
            return if row[t] == row[x] { t } else { t + 1 };
        }
        if t == stop {
            return t;
        }
        t -= 1;
    }
}

/// Slide and merge `row` toward index 0, calling `on_merge` with each new rank.
pub fn reduce_row_with(row: &mut Row, mut on_merge: impl FnMut(Rank)) -> RowOutcome {
    let mut out = RowOutcome::default();
    let mut stop = 0;

    for x in 0..SIZE {
        if row[x] == 0 {
            continue;
        }
        let t = find_target(row, x, stop);
        if t == x {
            continue;
        }
        if row[t] == 0 {
            row[t] = row[x];
        } else {
            // find_target only lands on an occupied cell when ranks match
            debug_assert_eq!(row[t], row[x]);
            debug_assert!(row[t] < MAX_RANK, "merge past MAX_RANK at rank {}", row[t]);
            row[t] = (row[t] + 1).min(MAX_RANK);
            out.reward += 1u64 << row[t];
            on_merge(row[t]);
            stop = t + 1;
        }
        row[x] = 0;
        out.changed = true;
    }

    out
}

pub fn reduce_row(row: &mut Row) -> RowOutcome {
    reduce_row_with(row, |_| {})
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
