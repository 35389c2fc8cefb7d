//! Notifications raised towards the host's messaging side
use std::fmt;

use chrono::{DateTime, Utc};

use crate::core::world::Point;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    BoardCreated { number: usize },
    PlacementConflict,
    BoardReset { actor: String, number: usize, time: DateTime<Utc> },
    BoardRemoved { number: usize },
    NoSuchBoard { number: usize },
    BoardCompleted { actor: String, number: usize, point: Point, time: DateTime<Utc> },
    BoardExploded { actor: String, number: usize, point: Point, time: DateTime<Utc> },
    AlreadyEnded,
    NotPermitted,
    GameNumber { number: usize },
    /// The change happened in memory but could not be written to the store
    NotSaved,
}

impl Outcome {
    /// Good news for whoever caused it
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Outcome::BoardCreated { .. }
                | Outcome::BoardReset { .. }
                | Outcome::BoardRemoved { .. }
                | Outcome::BoardCompleted { .. }
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::BoardCreated { number } => {
                write!(f, "The new minesweeper game has been created with game number {}.", number)
            }
            Outcome::PlacementConflict => {
                f.write_str("There already is a minesweeper game at the specified location!")
            }
            Outcome::BoardReset { number, .. } => write!(f, "Board {} has been reset.", number),
            Outcome::BoardRemoved { number } => write!(f, "Board {} has been deleted.", number),
            Outcome::NoSuchBoard { number } => write!(
                f,
                "There is no game with game number {}! Tip: flag a cell of a game to get its number.",
                number
            ),
            Outcome::BoardCompleted { .. } => {
                f.write_str("You have won the game! Reset the board to play another game.")
            }
            Outcome::BoardExploded { .. } => {
                f.write_str("You have lost the game! Reset the board to play another game.")
            }
            Outcome::AlreadyEnded => {
                f.write_str("The game has already ended. Reset this board to play a new game.")
            }
            Outcome::NotPermitted => f.write_str("You don't have the permission to do that."),
            Outcome::GameNumber { number } => write!(f, "This game has game number {}.", number),
            Outcome::NotSaved => f.write_str("The games could not be saved. Ask an admin to check the logs."),
        }
    }
}

/// Receives every outcome the dispatcher and session raise
pub trait OutcomeSink {
    fn notify(&mut self, outcome: Outcome);
}

impl OutcomeSink for Vec<Outcome> {
    fn notify(&mut self, outcome: Outcome) {
        self.push(outcome);
    }
}
