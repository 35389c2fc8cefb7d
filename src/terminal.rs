/// Terminal side of the host: a text canvas standing in for world cells
use std::collections::HashMap;
use std::io::{self, Write};

use crossterm::style::{Color, ResetColor, SetForegroundColor};
use crossterm::QueueableCommand;
use uuid::Uuid;

use crate::core::board::Board;
use crate::core::game::{CellState, Sweeper};
use crate::core::renderer::BoardRenderer;
use crate::core::world::{Point, World};

/// Line-oriented writer with colour support
pub struct TerminalContext<W: Write> {
    out: W,
}

impl<W: Write> TerminalContext<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn print_line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)
    }

    /// Print colored text with automatic reset
    pub fn print_colored(&mut self, text: &str, color: Color) -> io::Result<()> {
        self.out.queue(SetForegroundColor(color))?;
        write!(self.out, "{}", text)?;
        self.out.queue(ResetColor)?;
        Ok(())
    }

    pub fn print_colored_line(&mut self, text: &str, color: Color) -> io::Result<()> {
        self.print_colored(text, color)?;
        writeln!(self.out)
    }

    pub fn empty_line(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// One glyph per cell state, with the colour it is drawn in
pub fn glyph(cell: CellState) -> (char, Color) {
    match cell {
        CellState::Hidden => ('#', Color::DarkGrey),
        CellState::Flagged => ('F', Color::Red),
        CellState::Bomb => ('*', Color::Red),
        CellState::Number(0) => ('.', Color::Reset),
        CellState::Number(1) => ('1', Color::Blue),
        CellState::Number(2) => ('2', Color::Green),
        CellState::Number(3) => ('3', Color::Red),
        CellState::Number(n) => (char::from_digit(u32::from(n), 10).unwrap_or('?'), Color::Magenta),
    }
}

/// Renderer that remembers what was placed where.
///
/// Cells show what was last rendered, not the live game state, so a reveal
/// whose re-render is still queued shows up as stale until the next tick.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    cells: HashMap<(Uuid, Point), CellState>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visual_at(&self, world: &World, point: Point) -> Option<CellState> {
        self.cells.get(&(world.uid, point)).copied()
    }

    pub fn visual_count(&self) -> usize {
        self.cells.len()
    }

    /// Draw what is currently shown for `board`, one row per world z
    pub fn draw<S: Sweeper, W: Write>(
        &self,
        board: &Board<S>,
        number: usize,
        ctx: &mut TerminalContext<W>,
    ) -> io::Result<()> {
        let game = board.game();
        let status = if game.has_won() {
            "won"
        } else if game.has_lost() {
            "lost"
        } else {
            "in progress"
        };
        let world = match board.world() {
            Some(world) => world.name.clone(),
            None => format!("{} (unresolved)", board.world_ref()),
        };
        ctx.print_colored_line(
            &format!(
                "Game {} at {} in {}: {}x{}, {} bombs, {}",
                number,
                board.anchor(),
                world,
                board.width(),
                board.height(),
                game.bomb_count(),
                status
            ),
            Color::Cyan,
        )?;

        let Some(world) = board.world() else {
            return ctx.empty_line();
        };
        for y in 0..board.height() {
            for x in 0..board.width() {
                let cell = board.world_point(x, y).and_then(|point| self.visual_at(world, point));
                let (ch, color) = match cell {
                    Some(cell) => glyph(cell),
                    None => (' ', Color::Reset),
                };
                ctx.print_colored(&ch.to_string(), color)?;
            }
            ctx.empty_line()?;
        }
        Ok(())
    }
}

impl BoardRenderer for TerminalRenderer {
    fn place_visual(&mut self, world: &World, point: Point, cell: CellState) {
        self.cells.insert((world.uid, point), cell);
    }

    fn clear_visual(&mut self, world: &World, point: Point) {
        self.cells.remove(&(world.uid, point));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::minesweeper::ClassicSweeper;

    #[test]
    fn draws_rendered_cells_row_by_row() {
        let world = World::new(Uuid::from_u128(1), "world");
        let board = Board::with_game(
            Point::new(0, 0, 0),
            &world,
            ClassicSweeper::with_bombs(2, 2, &[(1, 1)]).unwrap(),
        );
        let mut renderer = TerminalRenderer::new();
        board.render(&mut renderer);
        assert_eq!(renderer.visual_count(), 4);

        let mut ctx = TerminalContext::new(Vec::new());
        renderer.draw(&board, 0, &mut ctx).unwrap();
        let text = String::from_utf8(ctx.into_inner()).unwrap();
        assert!(text.contains("Game 0 at (0, 0, 0) in world: 2x2, 1 bombs, in progress"));
        assert_eq!(text.matches('#').count(), 4);

        board.clear(&mut renderer);
        assert_eq!(renderer.visual_count(), 0);
    }
}
