use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::core::board::{Board, BoardId, BoardRecord};
use crate::core::game::{Sweeper, SweeperError};
use crate::core::renderer::BoardRenderer;
use crate::core::store::{BoardStore, StoreError};
use crate::core::world::{Point, World, WorldLookup};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("there already is a minesweeper game at the specified location")]
    PlacementConflict,
    #[error("there is no game with game number {0}")]
    NoSuchBoard(usize),
    #[error(transparent)]
    Sweeper(#[from] SweeperError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a successful [`BoardRegistry::create`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Game number at the time of creation
    pub number: usize,
    pub id: BoardId,
    /// Whether the registry made it to the store afterwards
    pub saved: bool,
}

/// Top-level save document
#[derive(Debug, Serialize, Deserialize)]
struct SaveDocument<G> {
    #[serde(rename = "sweeperGames", default = "Vec::new")]
    sweeper_games: Vec<BoardRecord<G>>,
}

/// Every board in play, in creation order.
///
/// A board's position in the list is its game number. Numbers are not stable:
/// removing board `k` renumbers every board after it, so callers holding on to a
/// board should keep its [`BoardId`] and ask [`BoardRegistry::number_of`] again.
pub struct BoardRegistry<S> {
    boards: Vec<Board<S>>,
    store: Box<dyn BoardStore>,
}

impl<S: Sweeper> BoardRegistry<S> {
    /// Empty registry saving to `store`. Nothing is read from the store.
    pub fn new(store: impl BoardStore + 'static) -> Self {
        Self {
            boards: Vec::new(),
            store: Box::new(store),
        }
    }

    /// Read the whole save document from `store` and rebuild every board in it.
    ///
    /// A store that was never written, an empty document and a document without
    /// `sweeperGames` all give an empty registry.
    pub fn load(store: impl BoardStore + 'static, worlds: &dyn WorldLookup) -> Result<Self, RegistryError> {
        let contents = store.read()?.unwrap_or_default();
        let contents = if contents.trim().is_empty() { "{}" } else { contents.as_str() };

        let document: SaveDocument<S> = serde_json::from_str(contents).map_err(StoreError::from)?;
        let boards: Vec<Board<S>> = document
            .sweeper_games
            .into_iter()
            .map(|record| Board::from_record(record, worlds))
            .collect();

        let unresolved = boards.iter().filter(|b| b.world().is_none()).count();
        if unresolved > 0 {
            warn!(unresolved, "some boards are in worlds that could not be found");
        }
        info!(boards = boards.len(), "games loaded");

        Ok(Self {
            boards,
            store: Box::new(store),
        })
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn boards(&self) -> &[Board<S>] {
        &self.boards
    }

    /// Does any existing board clash with the proposed placement?
    pub fn any_intersects(&self, world: &World, anchor: Point, width: usize, height: usize) -> bool {
        self.boards
            .iter()
            .any(|board| board.intersects(world, anchor, width, height))
    }

    /// Place a new board and save.
    ///
    /// Drawing the new board is left to the caller.
    pub fn create(
        &mut self,
        world: &World,
        anchor: Point,
        width: usize,
        height: usize,
        bomb_count: usize,
    ) -> Result<Placement, RegistryError> {
        if self.any_intersects(world, anchor, width, height) {
            info!(world = %world.name, %anchor, width, height, "placement rejected, overlaps another board");
            return Err(RegistryError::PlacementConflict);
        }

        let board = Board::create(anchor, world, width, height, bomb_count)?;
        let id = board.id();
        let number = self.boards.len();
        self.boards.push(board);
        info!(number, board = %id, world = %world.name, %anchor, width, height, bomb_count, "board created");

        let saved = self.save();
        Ok(Placement { number, id, saved })
    }

    /// Game number of the first board covering `point`
    pub fn lookup_by_point(&self, world: &World, point: Point) -> Option<usize> {
        self.boards.iter().position(|board| board.contains(world, point))
    }

    pub fn board_at(&self, world: &World, point: Point) -> Option<&Board<S>> {
        self.lookup_by_point(world, point).map(|number| &self.boards[number])
    }

    /// Current game number of a board, `None` once it has been removed
    pub fn number_of(&self, id: BoardId) -> Option<usize> {
        self.boards.iter().position(|board| board.id() == id)
    }

    pub fn find(&self, id: BoardId) -> Option<&Board<S>> {
        self.boards.iter().find(|board| board.id() == id)
    }

    pub fn get(&self, number: usize) -> Result<&Board<S>, RegistryError> {
        self.boards.get(number).ok_or(RegistryError::NoSuchBoard(number))
    }

    pub fn get_mut(&mut self, number: usize) -> Result<&mut Board<S>, RegistryError> {
        self.boards.get_mut(number).ok_or(RegistryError::NoSuchBoard(number))
    }

    /// Clear the board's visuals, drop it and save. Every later board moves down
    /// one number.
    ///
    /// Returns `None` when there is no such board, otherwise whether the save
    /// went through.
    pub fn remove(&mut self, number: usize, renderer: &mut dyn BoardRenderer) -> Option<bool> {
        if number >= self.boards.len() {
            return None;
        }
        let board = self.boards.remove(number);
        board.clear(renderer);
        info!(number, board = %board.id(), "board removed");
        Some(self.save())
    }

    /// Start a new game on an existing board. Returns whether the save succeeded.
    pub fn reset(&mut self, number: usize) -> Result<bool, RegistryError> {
        let board = self.get_mut(number)?;
        board.game_mut().reset();
        info!(number, board = %board.id(), "board reset");
        Ok(self.save())
    }

    /// The whole registry as a save document
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let document = SaveDocument {
            sweeper_games: self.boards.iter().map(Board::to_record).collect(),
        };
        serde_json::to_string(&document)
    }

    /// Write the whole registry to the store
    pub fn try_save(&mut self) -> Result<(), StoreError> {
        let json = self.to_json()?;
        self.store.write(&json)
    }

    /// Like [`BoardRegistry::try_save`], but a failure is only logged. In-memory
    /// state is kept either way; returns whether the write went through.
    pub fn save(&mut self) -> bool {
        match self.try_save() {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, boards = self.boards.len(), "couldn't save games");
                false
            }
        }
    }
}
