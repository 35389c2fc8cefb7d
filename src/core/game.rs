/// Engine contract every board's game state implements
use serde::{Deserialize, Serialize};

use crate::core::world::Point;

/// Player-visible state of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellState {
    Hidden,
    Flagged,
    Bomb,
    Number(u8),
}

impl CellState {
    /// Hidden and flagged cells are still covered; bombs and numbers are shown.
    pub fn is_covered(self) -> bool {
        matches!(self, CellState::Hidden | CellState::Flagged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SweeperError {
    #[error("board dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("{bombs} bombs do not fit on a board with {cells} cells")]
    TooManyBombs { bombs: usize, cells: usize },
    #[error("cell ({x}, {y}) is outside the {width}x{height} field")]
    OutOfBounds { x: i64, y: i64, width: usize, height: usize },
    #[error("a {width}x{height} board at {anchor} would run past the edge of the world")]
    OutsideWorld { anchor: Point, width: usize, height: usize },
    #[error("corrupt game state: {0}")]
    Corrupt(String),
}

/// Minesweeper engine used by a board.
///
/// The registry and dispatcher only ever talk to a board's game through this
/// trait, so alternative generators or shapes can be swapped in without touching
/// them. State goes to disk through serde, nested under the board record's
/// `game` key.
pub trait Sweeper: Serialize + for<'de> Deserialize<'de> + 'static {
    /// Allocate a field. The layout is not generated until [`Sweeper::reset`].
    fn new(width: usize, height: usize, bomb_count: usize) -> Result<Self, SweeperError>
    where
        Self: Sized;

    /// Throw away the current game and generate a fresh random layout
    fn reset(&mut self);

    /// Uncover a cell; cascading is up to the engine
    fn reveal(&mut self, x: usize, y: usize) -> Result<(), SweeperError>;

    /// Flag a covered cell, or unflag it if it already carries a flag
    fn toggle_flag(&mut self, x: usize, y: usize) -> Result<(), SweeperError>;

    fn has_won(&self) -> bool;
    fn has_lost(&self) -> bool;

    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn bomb_count(&self) -> usize;

    fn cell_state(&self, x: usize, y: usize) -> Result<CellState, SweeperError>;

    /// Won or lost; nothing but a reset gets a board out of here
    fn is_over(&self) -> bool {
        self.has_won() || self.has_lost()
    }
}
