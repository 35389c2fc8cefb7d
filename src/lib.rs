pub mod cli;
pub mod config;
pub mod core;
pub mod games;
pub mod session;
pub mod terminal;

// Re-export for convenience
pub use crate::core::board::{Board, BoardId};
pub use crate::core::dispatcher::{Action, ClickDispatcher, Handled, Interaction};
pub use crate::core::game::{CellState, Sweeper, SweeperError};
pub use crate::core::registry::{BoardRegistry, Placement, RegistryError};
pub use crate::games::ClassicSweeper;
