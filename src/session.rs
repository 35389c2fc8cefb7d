//! Host glue: the registry, dispatcher, renderer and outcome queue under one roof
use tracing::info;

use crate::config::Config;
use crate::core::actor::{Actor, Permission};
use crate::core::clock::{Clock, SystemClock};
use crate::core::dispatcher::{ClickDispatcher, Handled, Interaction};
use crate::core::game::{Sweeper, SweeperError};
use crate::core::outcome::Outcome;
use crate::core::registry::{BoardRegistry, RegistryError};
use crate::core::renderer::BoardRenderer;
use crate::core::store::JsonFileStore;
use crate::core::world::{Point, World, WorldDirectory, WorldLookup, WorldRef};

pub struct Session<S, R, C = SystemClock> {
    registry: BoardRegistry<S>,
    dispatcher: ClickDispatcher<C>,
    worlds: WorldDirectory,
    renderer: R,
    render_passes: u32,
    outcomes: Vec<Outcome>,
}

impl<S: Sweeper, R: BoardRenderer> Session<S, R, SystemClock> {
    /// Load the save file named in `config` and draw every board once
    pub fn open(config: &Config, renderer: R) -> Result<Self, RegistryError> {
        let worlds = config.world_directory();
        let registry = BoardRegistry::load(JsonFileStore::new(config.save_file.clone()), &worlds)?;
        let dispatcher = ClickDispatcher::new()
            .debounce(config.debounce())
            .render_delay(config.render_delay_ticks);
        let mut session = Self::from_parts(registry, dispatcher, worlds, renderer, config.render_passes());
        session.render_all();
        Ok(session)
    }
}

impl<S: Sweeper, R: BoardRenderer, C: Clock> Session<S, R, C> {
    pub fn from_parts(
        registry: BoardRegistry<S>,
        dispatcher: ClickDispatcher<C>,
        worlds: WorldDirectory,
        renderer: R,
        render_passes: u32,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            worlds,
            renderer,
            render_passes: render_passes.max(1),
            outcomes: Vec::new(),
        }
    }

    pub fn registry(&self) -> &BoardRegistry<S> {
        &self.registry
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn dispatcher(&self) -> &ClickDispatcher<C> {
        &self.dispatcher
    }

    /// Look a world up by name, or by uid string
    pub fn world(&self, name: &str) -> Option<World> {
        self.worlds.resolve(&WorldRef::parse(name))
    }

    pub fn worlds(&self) -> &WorldDirectory {
        &self.worlds
    }

    /// Everything raised since the last call
    pub fn drain_outcomes(&mut self) -> Vec<Outcome> {
        std::mem::take(&mut self.outcomes)
    }

    pub fn render_all(&mut self) {
        for board in self.registry.boards() {
            board.render(&mut self.renderer);
        }
    }

    /// Place a new board. Returns its game number, or `None` when it was refused.
    pub fn create(
        &mut self,
        actor: &Actor,
        world: &World,
        anchor: Point,
        width: usize,
        height: usize,
        bomb_count: usize,
    ) -> Result<Option<usize>, RegistryError> {
        if !actor.can(Permission::Manage) {
            self.outcomes.push(Outcome::NotPermitted);
            return Ok(None);
        }
        let placement = match self.registry.create(world, anchor, width, height, bomb_count) {
            Ok(placement) => placement,
            Err(RegistryError::PlacementConflict) => {
                self.outcomes.push(Outcome::PlacementConflict);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        // some renderers drop textures on the first pass
        if let Ok(board) = self.registry.get(placement.number) {
            for _ in 0..self.render_passes {
                board.render(&mut self.renderer);
            }
        }
        if !placement.saved {
            self.outcomes.push(Outcome::NotSaved);
        }
        self.outcomes.push(Outcome::BoardCreated { number: placement.number });
        Ok(Some(placement.number))
    }

    /// Start a new game on board `number`. Returns `false` if there is no such board
    /// or the actor may not reset.
    pub fn reset(&mut self, actor: &Actor, number: usize) -> bool {
        if !actor.can(Permission::Reset) {
            self.outcomes.push(Outcome::NotPermitted);
            return false;
        }
        let saved = match self.registry.reset(number) {
            Ok(saved) => saved,
            Err(_) => {
                self.outcomes.push(Outcome::NoSuchBoard { number });
                return false;
            }
        };
        if let Ok(board) = self.registry.get(number) {
            board.render(&mut self.renderer);
        }
        if !saved {
            self.outcomes.push(Outcome::NotSaved);
        }
        self.outcomes.push(Outcome::BoardReset {
            actor: actor.name.clone(),
            number,
            time: self.dispatcher.clock().wall(),
        });
        true
    }

    /// Remove board `number` and its visuals. Later boards are renumbered.
    pub fn delete(&mut self, actor: &Actor, number: usize) -> bool {
        if !actor.can(Permission::Manage) {
            self.outcomes.push(Outcome::NotPermitted);
            return false;
        }
        let Ok(id) = self.registry.get(number).map(|board| board.id()) else {
            self.outcomes.push(Outcome::NoSuchBoard { number });
            return false;
        };
        let Some(saved) = self.registry.remove(number, &mut self.renderer) else {
            self.outcomes.push(Outcome::NoSuchBoard { number });
            return false;
        };
        self.dispatcher.forget(id);
        info!(number, board = %id, actor = %actor.name, "board deleted");
        if !saved {
            self.outcomes.push(Outcome::NotSaved);
        }
        self.outcomes.push(Outcome::BoardRemoved { number });
        true
    }

    pub fn interact(&mut self, interaction: &Interaction) -> Result<Handled, SweeperError> {
        self.dispatcher
            .dispatch(&mut self.registry, interaction, &mut self.renderer, &mut self.outcomes)
    }

    /// Advance the host loop; returns how many deferred renders ran
    pub fn tick(&mut self, ticks: u64) -> usize {
        self.dispatcher.tick(ticks, &self.registry, &mut self.renderer)
    }
}
