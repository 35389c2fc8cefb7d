pub mod actor;
pub mod board;
pub mod clock;
pub mod dispatcher;
pub mod game;
pub mod outcome;
pub mod registry;
pub mod renderer;  // Host-side drawing hooks
pub mod schedule;  // Tick-deferred re-renders
pub mod store;
pub mod world;
