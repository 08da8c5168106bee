/// Tile spawner.
///
/// Owns the session's random source. The generator is built once when the
/// session starts and never reseeded, so quick successive spawns do not
/// share a time-derived seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::domain::grid::{Grid, Rank};

/// Chance that a new tile is a 4 (rank 2) rather than a 2.
const FOUR_PROBABILITY: f64 = 0.1;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Spawn {
    pub row: usize,
    pub col: usize,
    pub rank: Rank,
}

pub struct Spawner {
    rng: StdRng,
}

impl Spawner {
    /// Deterministic spawner; the same seed replays the same game.
    pub fn seeded(seed: u64) -> Self {
        Spawner { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Spawner { rng: StdRng::from_entropy() }
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::seeded(s),
            None => Self::from_entropy(),
        }
    }

    /// Drop a 2 (90%) or a 4 (10%) into a uniformly chosen empty cell.
    /// Returns `None` and leaves the grid alone when it is full.
    pub fn spawn(&mut self, grid: &mut Grid) -> Option<Spawn> {
        let empties = grid.empty_cells();
        let &(row, col) = empties.choose(&mut self.rng)?;
        let rank = if self.rng.gen_bool(FOUR_PROBABILITY) { 2 } else { 1 };
        grid.set(row, col, rank);
        Some(Spawn { row, col, rank })
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
