//! Concrete engines a board can run. The registry is generic over
//! [`crate::core::game::Sweeper`], so adding a variant means adding a module here.
pub mod minesweeper;

pub use minesweeper::ClassicSweeper;
