use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::core::game::{SweeperError, Sweeper};
use crate::core::renderer::BoardRenderer;
use crate::core::world::{Point, World, WorldLookup, WorldRef};

/// Permanent identity of a board. Unlike the game number it survives removals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardId(Uuid);

impl BoardId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for BoardId {
    fn from(uid: Uuid) -> Self {
        Self(uid)
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// On-disk shape of one board inside `sweeperGames`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardRecord<G> {
    /// Absent in saves written before boards had stable ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BoardId>,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    /// World uid, or a plain world name in legacy saves
    pub world: String,
    pub game: G,
}

/// One minesweeper game placed flat in a world.
///
/// The field spans `width` cells along world x and `height` cells along world z,
/// starting at `anchor`. World y only selects the plane the board lies in.
#[derive(Debug)]
pub struct Board<S> {
    id: BoardId,
    anchor: Point,
    world_ref: WorldRef,
    /// `None` when the saved world could not be found; geometry then matches nothing
    world: Option<World>,
    game: S,
}

impl<S: Sweeper> Board<S> {
    /// Place a brand new game, ready to play
    pub fn create(
        anchor: Point,
        world: &World,
        width: usize,
        height: usize,
        bomb_count: usize,
    ) -> Result<Self, SweeperError> {
        let mut game = S::new(width, height, bomb_count)?;
        let far_corner = |origin: i32, cells: usize| {
            i32::try_from(cells - 1).ok().and_then(|span| origin.checked_add(span))
        };
        if far_corner(anchor.x, width).is_none() || far_corner(anchor.z, height).is_none() {
            return Err(SweeperError::OutsideWorld { anchor, width, height });
        }
        game.reset();
        Ok(Self::with_game(anchor, world, game))
    }

    /// Place an already prepared game state
    pub fn with_game(anchor: Point, world: &World, game: S) -> Self {
        Self {
            id: BoardId::generate(),
            anchor,
            world_ref: WorldRef::from(world),
            world: Some(world.clone()),
            game,
        }
    }

    pub fn id(&self) -> BoardId {
        self.id
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn world_ref(&self) -> &WorldRef {
        &self.world_ref
    }

    pub fn game(&self) -> &S {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut S {
        &mut self.game
    }

    pub fn width(&self) -> usize {
        self.game.width()
    }

    pub fn height(&self) -> usize {
        self.game.height()
    }

    fn in_world(&self, world: &World) -> bool {
        self.world.as_ref() == Some(world)
    }

    /// Would a `width` x `height` board at `anchor` clash with this one?
    ///
    /// Edges count: two boards that merely touch on the same plane intersect.
    pub fn intersects(&self, world: &World, anchor: Point, width: usize, height: usize) -> bool {
        if !self.in_world(world) || anchor.y != self.anchor.y {
            return false;
        }
        let (x, z) = (i64::from(anchor.x), i64::from(anchor.z));
        let (own_x, own_z) = (i64::from(self.anchor.x), i64::from(self.anchor.z));
        let (own_w, own_h) = (self.width() as i64, self.height() as i64);

        x + width as i64 >= own_x
            && own_x + own_w >= x
            && z + height as i64 >= own_z
            && own_z + own_h >= z
    }

    /// Is `point` one of this board's cells?
    pub fn contains(&self, world: &World, point: Point) -> bool {
        if !self.in_world(world) || point.y != self.anchor.y {
            return false;
        }
        let (dx, dz) = self.offset(point);
        (0..self.width() as i64).contains(&dx) && (0..self.height() as i64).contains(&dz)
    }

    fn offset(&self, point: Point) -> (i64, i64) {
        (
            i64::from(point.x) - i64::from(self.anchor.x),
            i64::from(point.z) - i64::from(self.anchor.z),
        )
    }

    /// Translate a world position into engine coordinates: world x is the field's
    /// x axis and world z is the field's y axis.
    pub fn local_coords(&self, point: Point) -> Result<(usize, usize), SweeperError> {
        let (dx, dz) = self.offset(point);
        match (usize::try_from(dx), usize::try_from(dz)) {
            (Ok(x), Ok(y)) if x < self.width() && y < self.height() => Ok((x, y)),
            _ => Err(SweeperError::OutOfBounds {
                x: dx,
                y: dz,
                width: self.width(),
                height: self.height(),
            }),
        }
    }

    /// World position of engine cell (x, y), or `None` past the edge of the world
    pub fn world_point(&self, x: usize, y: usize) -> Option<Point> {
        let wx = i32::try_from(x).ok().and_then(|x| self.anchor.x.checked_add(x))?;
        let wz = i32::try_from(y).ok().and_then(|y| self.anchor.z.checked_add(y))?;
        Some(Point::new(wx, self.anchor.y, wz))
    }

    /// Push every cell's current state to the renderer
    pub fn render(&self, renderer: &mut dyn BoardRenderer) {
        let Some(world) = &self.world else { return };
        for x in 0..self.width() {
            for y in 0..self.height() {
                if let (Ok(cell), Some(point)) = (self.game.cell_state(x, y), self.world_point(x, y)) {
                    renderer.place_visual(world, point, cell);
                }
            }
        }
    }

    /// Remove every visual this board placed
    pub fn clear(&self, renderer: &mut dyn BoardRenderer) {
        let Some(world) = &self.world else { return };
        for x in 0..self.width() {
            for y in 0..self.height() {
                if let Some(point) = self.world_point(x, y) {
                    renderer.clear_visual(world, point);
                }
            }
        }
    }

    pub fn to_record(&self) -> BoardRecord<&S> {
        let world = match &self.world {
            Some(world) => world.uid.to_string(),
            None => self.world_ref.to_string(),
        };
        BoardRecord {
            id: Some(self.id),
            x: self.anchor.x,
            y: self.anchor.y,
            z: self.anchor.z,
            world,
            game: &self.game,
        }
    }

    /// Rebuild a board from its record. A world that cannot be found leaves the
    /// board loaded but unreachable by any geometric query.
    pub fn from_record(record: BoardRecord<S>, worlds: &dyn WorldLookup) -> Self {
        let world_ref = WorldRef::parse(&record.world);
        let world = worlds.resolve(&world_ref);
        let id = record.id.unwrap_or_else(BoardId::generate);
        if world.is_none() {
            warn!(board = %id, world = %world_ref, "board references an unknown world");
        }
        Self {
            id,
            anchor: Point::new(record.x, record.y, record.z),
            world_ref,
            world,
            game: record.game,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::world::WorldDirectory;
    use crate::games::minesweeper::ClassicSweeper;

    fn overworld() -> World {
        World::new(Uuid::from_u128(1), "world")
    }

    fn nether() -> World {
        World::new(Uuid::from_u128(2), "world_nether")
    }

    fn board_at(anchor: Point, width: usize, height: usize) -> Board<ClassicSweeper> {
        Board::create(anchor, &overworld(), width, height, 0).unwrap()
    }

    #[test]
    fn touching_edges_intersect() {
        let board = board_at(Point::new(0, 64, 0), 4, 4);
        // flush against the +x edge
        assert!(board.intersects(&overworld(), Point::new(4, 64, 0), 2, 2));
        // flush against the -z edge
        assert!(board.intersects(&overworld(), Point::new(0, 64, -2), 2, 2));
        // one cell gap
        assert!(!board.intersects(&overworld(), Point::new(5, 64, 0), 2, 2));
        assert!(!board.intersects(&overworld(), Point::new(-3, 64, 0), 2, 2));
    }

    #[test]
    fn other_plane_or_world_never_intersects() {
        let board = board_at(Point::new(0, 64, 0), 4, 4);
        assert!(!board.intersects(&overworld(), Point::new(0, 65, 0), 4, 4));
        assert!(!board.intersects(&nether(), Point::new(0, 64, 0), 4, 4));
    }

    #[test]
    fn contains_uses_inclusive_cell_bounds() {
        let board = board_at(Point::new(10, 5, -3), 3, 2);
        assert!(board.contains(&overworld(), Point::new(10, 5, -3)));
        assert!(board.contains(&overworld(), Point::new(12, 5, -2)));
        assert!(!board.contains(&overworld(), Point::new(13, 5, -3)));
        assert!(!board.contains(&overworld(), Point::new(10, 5, -1)));
        assert!(!board.contains(&overworld(), Point::new(10, 6, -3)));
        assert!(!board.contains(&nether(), Point::new(10, 5, -3)));
    }

    #[test]
    fn local_coords_map_z_to_field_y() {
        let board = board_at(Point::new(10, 5, -3), 3, 2);
        assert_eq!(board.local_coords(Point::new(11, 5, -2)).unwrap(), (1, 1));
        assert!(matches!(
            board.local_coords(Point::new(9, 5, -3)),
            Err(SweeperError::OutOfBounds { x: -1, y: 0, .. })
        ));
        assert_eq!(board.world_point(2, 1), Some(Point::new(12, 5, -2)));
    }

    #[test]
    fn placement_must_fit_inside_the_world() {
        let edge = Point::new(i32::MAX - 2, 0, i32::MIN);
        let board = board_at(edge, 3, 1);
        assert_eq!(board.world_point(2, 0), Some(Point::new(i32::MAX, 0, i32::MIN)));

        let past_edge = Board::<ClassicSweeper>::create(Point::new(i32::MAX - 1, 0, 0), &overworld(), 3, 3, 0);
        assert!(matches!(past_edge, Err(SweeperError::OutsideWorld { width: 3, height: 3, .. })));
        let past_z = Board::<ClassicSweeper>::create(Point::new(0, 0, i32::MAX), &overworld(), 1, 2, 0);
        assert!(matches!(past_z, Err(SweeperError::OutsideWorld { .. })));
    }

    #[test]
    fn unresolved_world_matches_nothing_but_keeps_its_reference() {
        let record = BoardRecord {
            id: None,
            x: 0,
            y: 0,
            z: 0,
            world: "world_the_end".to_string(),
            game: ClassicSweeper::new(2, 2, 0).unwrap(),
        };
        let board = Board::from_record(record, &WorldDirectory::new().with(overworld()));

        assert!(board.world().is_none());
        assert!(!board.contains(&overworld(), Point::new(0, 0, 0)));
        assert!(!board.intersects(&overworld(), Point::new(0, 0, 0), 2, 2));
        assert_eq!(board.to_record().world, "world_the_end");
    }

    #[test]
    fn legacy_name_is_rewritten_as_uid() {
        let record = BoardRecord {
            id: None,
            x: 1,
            y: 2,
            z: 3,
            world: "world".to_string(),
            game: ClassicSweeper::new(2, 2, 0).unwrap(),
        };
        let board = Board::from_record(record, &WorldDirectory::new().with(overworld()));

        assert_eq!(board.world(), Some(&overworld()));
        assert_eq!(board.to_record().world, overworld().uid.to_string());
        assert_eq!(board.anchor(), Point::new(1, 2, 3));
    }
}
