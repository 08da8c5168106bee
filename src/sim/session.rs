/// GameSession: everything one running game owns.
///
/// The grid, the score and the random source live here instead of in
/// process-wide statics; the driver holds the session and passes it by
/// reference to the renderer.
///
/// ## Turn sequencing
///
/// A turn is split in two so the driver can show the board between them:
///   - `play(dir)`: slide/merge, score, mark a spawn as pending
///   - `settle()`:    spawn the pending tile, detect game over
///
/// `play` settles any earlier pending turn first, so a fast player never
/// skips a spawn.

use tracing::{debug, info};

use crate::domain::direction::Direction;
use crate::domain::grid::{Grid, Rank, SIZE, WIN_RANK};
use crate::domain::rules;
use super::engine;
use super::event::GameEvent;
use super::spawn::Spawner;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    ConfirmQuit,
    ConfirmRestart,
    GameOver,
}

pub struct GameSession {
    grid: Grid,
    score: u64,
    best: u64,
    moves: u32,
    spawner: Spawner,
    pending_spawn: bool,
    reached_2048: bool,
    pub phase: Phase,
    pub message: String,
    pub message_timer: u32,
}

impl GameSession {
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_spawner(Spawner::new(seed))
    }

    pub fn with_spawner(spawner: Spawner) -> Self {
        let mut session = GameSession {
            grid: Grid::new(),
            score: 0,
            best: 0,
            moves: 0,
            spawner,
            pending_spawn: false,
            reached_2048: false,
            phase: Phase::Playing,
            message: String::new(),
            message_timer: 0,
        };
        session.new_game();
        session
    }

    /// Empty the grid, reset the score and drop the two opening tiles.
    /// The best score and the random source carry over.
    pub fn new_game(&mut self) {
        self.grid.clear();
        self.score = 0;
        self.moves = 0;
        self.pending_spawn = false;
        self.reached_2048 = false;
        self.phase = Phase::Playing;
        self.message.clear();
        self.message_timer = 0;
        self.spawn();
        self.spawn();
        info!(grid = ?self.grid.rows(), "new game");
    }

    // ── Core contract ──

    /// Slide/merge only. Adds the merge reward to the score.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn move_tiles(&mut self, dir: Direction) -> bool {
        let out = engine::apply_move(&mut self.grid, dir);
        self.add_score(out.reward);
        out.changed
    }

    pub fn spawn(&mut self) {
        self.spawner.spawn(&mut self.grid);
    }

    pub fn is_terminal(&mut self) -> bool {
        rules::is_terminal(&mut self.grid)
    }

    // ── Turn driver ──

    /// First half of a turn. Ignored outside `Phase::Playing`.
    pub fn play(&mut self, dir: Direction) -> Vec<GameEvent> {
        if self.phase != Phase::Playing {
            return vec![];
        }
        let mut events = self.settle();
        if self.phase != Phase::Playing {
            return events;
        }

        let out = engine::apply_move(&mut self.grid, dir);
        if !out.changed {
            debug!(?dir, "move blocked");
            return events;
        }

        self.add_score(out.reward);
        self.moves += 1;
        self.pending_spawn = true;
        events.push(GameEvent::TilesMoved);
        events.extend(out.merges.iter().map(|&rank| GameEvent::TilesMerged { rank }));

        if !self.reached_2048 && out.merges.iter().any(|&r| r >= WIN_RANK) {
            self.reached_2048 = true;
            info!(score = self.score, moves = self.moves, "reached 2048");
            events.push(GameEvent::Reached2048);
        }

        debug!(?dir, reward = out.reward, score = self.score, "move");
        events
    }

    /// Second half of a turn: spawn, then check for game over.
    pub fn settle(&mut self) -> Vec<GameEvent> {
        if !self.pending_spawn {
            return vec![];
        }
        self.pending_spawn = false;

        let mut events = Vec::new();
        if let Some(s) = self.spawner.spawn(&mut self.grid) {
            events.push(GameEvent::TileSpawned { row: s.row, col: s.col, rank: s.rank });
        }
        if self.is_terminal() {
            self.phase = Phase::GameOver;
            info!(score = self.score, moves = self.moves, max = self.grid.max_rank(), sum = self.grid.tile_sum(), "game over");
            events.push(GameEvent::GameOver);
        }
        events
    }

    pub fn has_pending_spawn(&self) -> bool {
        self.pending_spawn
    }

    // ── Accessors ──

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rank_at(&self, row: usize, col: usize) -> Rank {
        debug_assert!(row < SIZE && col < SIZE);
        self.grid.get(row, col)
    }

    pub fn max_rank(&self) -> Rank {
        self.grid.max_rank()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_message(&mut self, msg: &str, ticks: u32) {
        self.message = msg.to_string();
        self.message_timer = ticks;
    }

    /// Count down the status message; a timer of 0 means "until replaced".
    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }

    fn add_score(&mut self, reward: u64) {
        self.score = self.score.saturating_add(reward);
        self.best = self.best.max(self.score);
    }

    #[cfg(test)]
    pub(crate) fn load_grid(&mut self, grid: Grid) {
        self.grid = grid;
        self.pending_spawn = false;
        self.phase = Phase::Playing;
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::tests::grid_from;

    #[test]
    fn new_game_has_two_tiles_and_zero_score() {
        let s = GameSession::new(Some(1));
        assert_eq!(s.grid().count_empty(), SIZE * SIZE - 2);
        assert_eq!(s.score(), 0);
        assert_eq!(s.phase(), Phase::Playing);
        let occupied: Vec<Rank> = s.grid().rows().iter().flatten().copied().filter(|&r| r > 0).collect();
        assert!(occupied.iter().all(|&r| r == 1 || r == 2));
    }

    #[test]
    fn merge_scores_new_tile_value() {
        let mut s = GameSession::new(Some(5));
        s.load_grid(grid_from(&["1 1 0 0", "0 0 0 0", "0 0 0 0", "0 0 0 0"]));
        let events = s.play(Direction::Left);
        assert_eq!(s.score(), 4);
        assert_eq!(s.best(), 4);
        assert_eq!(s.rank_at(0, 0), 2);
        assert!(events.contains(&GameEvent::TilesMoved));
        assert!(events.contains(&GameEvent::TilesMerged { rank: 2 }));
        assert!(s.has_pending_spawn());
    }

    #[test]
    fn spawn_waits_for_settle() {
        let mut s = GameSession::new(Some(5));
        s.load_grid(grid_from(&["0 0 0 1", "0 0 0 0", "0 0 0 0", "0 0 0 0"]));
        s.play(Direction::Left);
        assert_eq!(s.grid().count_empty(), 15);
        let events = s.settle();
        assert_eq!(s.grid().count_empty(), 14);
        assert!(matches!(events[0], GameEvent::TileSpawned { .. }));
        assert!(s.settle().is_empty());
    }

    #[test]
    fn blocked_move_does_not_spawn() {
        let mut s = GameSession::new(Some(5));
        s.load_grid(grid_from(&["1 0 0 0", "0 0 0 0", "0 0 0 0", "0 0 0 0"]));
        let events = s.play(Direction::Left);
        assert!(events.is_empty());
        assert!(!s.has_pending_spawn());
        assert_eq!(s.moves(), 0);
    }

    #[test]
    fn filling_last_gap_without_pairs_ends_game() {
        let mut s = GameSession::new(Some(5));
        // Moving right frees (0,0); whatever spawns there (2 or 4) sits
        // next to an 8 and above a 16, so nothing can merge.
        s.load_grid(grid_from(&[
            "0 3 5 3",
            "4 5 3 5",
            "5 3 5 3",
            "3 5 3 5",
        ]));
        s.play(Direction::Right);
        // no change: the row is already packed to the right
        assert!(!s.has_pending_spawn());

        s.load_grid(grid_from(&[
            "3 0 5 3",
            "4 5 3 5",
            "5 3 5 3",
            "3 5 3 5",
        ]));
        s.play(Direction::Right);
        let events = s.settle();
        assert_eq!(s.phase(), Phase::GameOver);
        assert_eq!(events.last(), Some(&GameEvent::GameOver));
        assert!(s.play(Direction::Left).is_empty());
    }

    #[test]
    fn reaching_2048_is_reported_once() {
        let mut s = GameSession::new(Some(9));
        s.load_grid(grid_from(&["10 10 0 0", "10 10 0 0", "0 0 0 0", "0 0 0 0"]));
        let events = s.play(Direction::Left);
        assert_eq!(events.iter().filter(|e| **e == GameEvent::Reached2048).count(), 1);
        s.settle();
        assert!(!s.play(Direction::Up).contains(&GameEvent::Reached2048));
    }

    #[test]
    fn new_game_keeps_best() {
        let mut s = GameSession::new(Some(3));
        s.load_grid(grid_from(&["4 4 0 0", "0 0 0 0", "0 0 0 0", "0 0 0 0"]));
        s.play(Direction::Left);
        assert_eq!(s.score(), 32);
        s.new_game();
        assert_eq!(s.score(), 0);
        assert_eq!(s.best(), 32);
    }

    #[test]
    fn seeded_sessions_replay_identically() {
        let mut a = GameSession::new(Some(77));
        let mut b = GameSession::new(Some(77));
        for dir in Direction::ALL.iter().cycle().take(40) {
            assert_eq!(a.play(*dir), b.play(*dir));
            assert_eq!(a.settle(), b.settle());
        }
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.score(), b.score());
    }

    #[test]
    fn raw_contract_matches_engine() {
        let mut s = GameSession::new(Some(11));
        s.load_grid(grid_from(&["1 1 1 1", "0 0 0 0", "0 0 0 0", "0 0 0 0"]));
        assert!(s.move_tiles(Direction::Left));
        assert_eq!(s.score(), 8);
        s.spawn();
        assert_eq!(s.grid().count_empty(), 13);
        assert!(!s.is_terminal());
    }

    #[test]
    fn message_timer_expires() {
        let mut s = GameSession::new(Some(1));
        s.set_message("hello", 2);
        s.tick_message();
        assert_eq!(s.message, "hello");
        s.tick_message();
        assert!(s.message.is_empty());
    }
}
