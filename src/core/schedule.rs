use tracing::trace;

use crate::core::board::BoardId;
use crate::core::game::Sweeper;
use crate::core::registry::BoardRegistry;
use crate::core::renderer::BoardRenderer;

/// Re-renders waiting for a later tick of the host loop.
///
/// Runs on the same thread as everything else; a job simply fires when the host
/// has advanced far enough. Jobs for boards removed in the meantime are dropped.
#[derive(Debug, Default)]
pub struct RenderQueue {
    tick: u64,
    pending: Vec<(u64, BoardId)>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks elapsed since the queue was created
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_scheduled(&self, id: BoardId) -> bool {
        self.pending.iter().any(|(_, board)| *board == id)
    }

    /// Re-render `id` once `delay` more ticks have passed
    pub fn schedule(&mut self, id: BoardId, delay: u64) {
        let due = self.tick + delay;
        if !self.pending.contains(&(due, id)) {
            self.pending.push((due, id));
        }
    }

    pub fn cancel(&mut self, id: BoardId) {
        self.pending.retain(|(_, board)| *board != id);
    }

    /// Move time forward and render every board whose job came due.
    /// Returns the number of boards rendered.
    pub fn advance<S: Sweeper>(
        &mut self,
        ticks: u64,
        registry: &BoardRegistry<S>,
        renderer: &mut dyn BoardRenderer,
    ) -> usize {
        self.tick += ticks;
        let now = self.tick;

        let mut due: Vec<BoardId> = Vec::new();
        self.pending.retain(|&(at, id)| {
            if at <= now {
                if !due.contains(&id) {
                    due.push(id);
                }
                false
            } else {
                true
            }
        });

        let mut rendered = 0;
        for id in due {
            match registry.find(id) {
                Some(board) => {
                    board.render(renderer);
                    rendered += 1;
                }
                None => trace!(board = %id, "dropping render for removed board"),
            }
        }
        rendered
    }
}
