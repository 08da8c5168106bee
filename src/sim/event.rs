/// Events emitted while a turn is played.
/// The presentation layer consumes these for sound and status messages.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    TilesMoved,
    TilesMerged { rank: u8 },
    TileSpawned { row: usize, col: usize, rank: u8 },
    Reached2048,
    GameOver,
}
