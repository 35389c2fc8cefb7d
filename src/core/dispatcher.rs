use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::core::actor::{Actor, Permission};
use crate::core::board::BoardId;
use crate::core::clock::{Clock, SystemClock};
use crate::core::game::{Sweeper, SweeperError};
use crate::core::outcome::{Outcome, OutcomeSink};
use crate::core::registry::BoardRegistry;
use crate::core::renderer::BoardRenderer;
use crate::core::schedule::RenderQueue;
use crate::core::world::{Point, World};

/// Flags arriving this close together on one board are treated as one click
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Ticks between a reveal and its re-render
pub const DEFAULT_RENDER_DELAY: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Primary click: uncover the cell
    Reveal,
    /// Secondary click: toggle a flag on the cell
    Flag,
}

/// Someone clicked a position in a world
#[derive(Debug, Clone)]
pub struct Interaction {
    pub actor: Actor,
    pub world: World,
    pub point: Point,
    pub action: Action,
}

/// What became of an interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// The position is not part of any board
    NoBoard,
    NotPermitted,
    /// Duplicate flag inside the debounce window
    Debounced,
    /// Board already over, or the cell can't take a flag
    Rejected { number: usize },
    Revealed { number: usize, saved: bool },
    Flagged { number: usize, saved: bool },
}

/// Turns clicks into game moves.
///
/// Every accepted move is written through to the store before the host hears
/// about it. Reveals are re-rendered a few ticks later through the internal
/// [`RenderQueue`]; call [`ClickDispatcher::tick`] from the host loop.
pub struct ClickDispatcher<C = SystemClock> {
    clock: C,
    debounce: Duration,
    render_delay: u64,
    last_flagged: HashMap<BoardId, Instant>,
    renders: RenderQueue,
}

impl ClickDispatcher<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for ClickDispatcher<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ClickDispatcher<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            debounce: DEFAULT_DEBOUNCE,
            render_delay: DEFAULT_RENDER_DELAY,
            last_flagged: HashMap::new(),
            renders: RenderQueue::new(),
        }
    }

    pub fn debounce(mut self, window: Duration) -> Self {
        self.debounce = window;
        self
    }

    /// 0 renders reveals immediately
    pub fn render_delay(mut self, ticks: u64) -> Self {
        self.render_delay = ticks;
        self
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn current_tick(&self) -> u64 {
        self.renders.current_tick()
    }

    pub fn pending_renders(&self) -> usize {
        self.renders.pending()
    }

    /// Advance the host's tick counter and run due re-renders
    pub fn tick<S: Sweeper>(
        &mut self,
        ticks: u64,
        registry: &BoardRegistry<S>,
        renderer: &mut dyn BoardRenderer,
    ) -> usize {
        self.renders.advance(ticks, registry, renderer)
    }

    /// Drop everything remembered about a board that is being removed
    pub fn forget(&mut self, id: BoardId) {
        self.last_flagged.remove(&id);
        self.renders.cancel(id);
    }

    /// Handle one click.
    ///
    /// Clicks outside every board are ignored. Engine failures come back as
    /// errors; nothing is retried.
    pub fn dispatch<S: Sweeper>(
        &mut self,
        registry: &mut BoardRegistry<S>,
        interaction: &Interaction,
        renderer: &mut dyn BoardRenderer,
        sink: &mut dyn OutcomeSink,
    ) -> Result<Handled, SweeperError> {
        let Some(number) = registry.lookup_by_point(&interaction.world, interaction.point) else {
            return Ok(Handled::NoBoard);
        };
        if !interaction.actor.can(Permission::Interact) {
            sink.notify(Outcome::NotPermitted);
            return Ok(Handled::NotPermitted);
        }

        match interaction.action {
            Action::Reveal => self.reveal(registry, number, interaction, renderer, sink),
            Action::Flag => self.flag(registry, number, interaction, renderer, sink),
        }
    }

    fn reveal<S: Sweeper>(
        &mut self,
        registry: &mut BoardRegistry<S>,
        number: usize,
        interaction: &Interaction,
        renderer: &mut dyn BoardRenderer,
        sink: &mut dyn OutcomeSink,
    ) -> Result<Handled, SweeperError> {
        let Ok(board) = registry.get_mut(number) else {
            return Ok(Handled::NoBoard);
        };
        let id = board.id();

        if board.game().is_over() {
            sink.notify(Outcome::AlreadyEnded);
            // the clicked cell may have been redrawn client side; put it back
            self.schedule_render(id, registry, renderer);
            return Ok(Handled::Rejected { number });
        }

        let (x, y) = board.local_coords(interaction.point)?;
        board.game_mut().reveal(x, y)?;
        let (won, lost) = (board.game().has_won(), board.game().has_lost());
        debug!(number, board = %id, x, y, "cell revealed");

        let saved = registry.save();
        if !saved {
            sink.notify(Outcome::NotSaved);
        }
        self.schedule_render(id, registry, renderer);

        let actor = interaction.actor.name.clone();
        let point = interaction.point;
        if won {
            info!(number, board = %id, actor = %actor, "board completed");
            sink.notify(Outcome::BoardCompleted { actor, number, point, time: self.clock.wall() });
        } else if lost {
            info!(number, board = %id, actor = %actor, "board exploded");
            sink.notify(Outcome::BoardExploded { actor, number, point, time: self.clock.wall() });
        }

        Ok(Handled::Revealed { number, saved })
    }

    fn flag<S: Sweeper>(
        &mut self,
        registry: &mut BoardRegistry<S>,
        number: usize,
        interaction: &Interaction,
        renderer: &mut dyn BoardRenderer,
        sink: &mut dyn OutcomeSink,
    ) -> Result<Handled, SweeperError> {
        let Ok(board) = registry.get_mut(number) else {
            return Ok(Handled::NoBoard);
        };
        let id = board.id();

        let now = self.clock.now();
        if let Some(last) = self.last_flagged.get(&id) {
            if now.saturating_duration_since(*last) < self.debounce {
                debug!(number, board = %id, "flag debounced");
                return Ok(Handled::Debounced);
            }
        }
        self.last_flagged.insert(id, now);

        let (x, y) = board.local_coords(interaction.point)?;
        if board.game().is_over() || !board.game().cell_state(x, y)?.is_covered() {
            if interaction.actor.can(Permission::Lookup) {
                sink.notify(Outcome::GameNumber { number });
            }
            return Ok(Handled::Rejected { number });
        }

        board.game_mut().toggle_flag(x, y)?;
        debug!(number, board = %id, x, y, "flag toggled");

        let saved = registry.save();
        if !saved {
            sink.notify(Outcome::NotSaved);
        }
        if let Ok(board) = registry.get(number) {
            board.render(renderer);
        }

        Ok(Handled::Flagged { number, saved })
    }

    fn schedule_render<S: Sweeper>(
        &mut self,
        id: BoardId,
        registry: &BoardRegistry<S>,
        renderer: &mut dyn BoardRenderer,
    ) {
        if self.render_delay == 0 {
            if let Some(board) = registry.find(id) {
                board.render(renderer);
            }
        } else {
            self.renders.schedule(id, self.render_delay);
        }
    }
}
