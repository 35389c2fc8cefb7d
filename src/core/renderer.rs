/// Rendering collaborator the host plugs in
use crate::core::game::CellState;
use crate::core::world::{Point, World};

/// Projects board cells onto world positions. Purely a projection: nothing drawn
/// here ever feeds back into game state.
pub trait BoardRenderer {
    /// Show `cell` at `point`, replacing whatever was there
    fn place_visual(&mut self, world: &World, point: Point, cell: CellState);

    /// Remove the visual at `point`
    fn clear_visual(&mut self, world: &World, point: Point);
}

/// Renderer that draws nothing, for hosts without a visual side
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl BoardRenderer for NullRenderer {
    fn place_visual(&mut self, _world: &World, _point: Point, _cell: CellState) {}
    fn clear_visual(&mut self, _world: &World, _point: Point) {}
}
