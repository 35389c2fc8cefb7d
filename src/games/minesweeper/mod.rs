pub mod game;
pub use game::ClassicSweeper;
