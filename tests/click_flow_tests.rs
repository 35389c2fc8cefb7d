use std::time::Duration;

use headsweeper::core::actor::{Actor, Permission};
use headsweeper::core::clock::ManualClock;
use headsweeper::core::outcome::Outcome;
use headsweeper::core::store::MemoryStore;
use headsweeper::core::world::{Point, World};
use headsweeper::terminal::TerminalRenderer;
use headsweeper::{
    Action, BoardRegistry, CellState, ClassicSweeper, ClickDispatcher, Handled, Interaction, Sweeper,
};
use uuid::Uuid;

struct Host {
    world: World,
    store: MemoryStore,
    clock: ManualClock,
    registry: BoardRegistry<ClassicSweeper>,
    dispatcher: ClickDispatcher<ManualClock>,
    renderer: TerminalRenderer,
    outcomes: Vec<Outcome>,
}

impl Host {
    fn new() -> Self {
        let store = MemoryStore::new();
        let clock = ManualClock::new();
        Self {
            world: World::new(Uuid::from_u128(7), "world"),
            store: store.clone(),
            clock: clock.clone(),
            registry: BoardRegistry::new(store),
            dispatcher: ClickDispatcher::with_clock(clock),
            renderer: TerminalRenderer::new(),
            outcomes: Vec::new(),
        }
    }

    fn click(&mut self, actor: &Actor, point: Point, action: Action) -> Handled {
        let interaction = Interaction {
            actor: actor.clone(),
            world: self.world.clone(),
            point,
            action,
        };
        self.dispatcher
            .dispatch(&mut self.registry, &interaction, &mut self.renderer, &mut self.outcomes)
            .unwrap()
    }
}

#[test]
fn empty_board_is_won_by_a_single_reveal() {
    let mut host = Host::new();
    let world = host.world.clone();
    let placement = host.registry.create(&world, Point::new(0, 64, 0), 3, 3, 0).unwrap();
    assert_eq!(placement.number, 0);

    let player = Actor::player("alex");
    let handled = host.click(&player, Point::new(1, 64, 1), Action::Reveal);
    assert_eq!(handled, Handled::Revealed { number: 0, saved: true });

    assert_eq!(host.outcomes.len(), 1);
    match &host.outcomes[0] {
        Outcome::BoardCompleted { actor, number, point, .. } => {
            assert_eq!(actor, "alex");
            assert_eq!(*number, 0);
            assert_eq!(*point, Point::new(1, 64, 1));
        }
        other => panic!("expected a completed board, got {:?}", other),
    }

    // further reveals are refused
    host.outcomes.clear();
    let handled = host.click(&player, Point::new(0, 64, 0), Action::Reveal);
    assert_eq!(handled, Handled::Rejected { number: 0 });
    assert_eq!(host.outcomes, vec![Outcome::AlreadyEnded]);
}

#[test]
fn reveal_render_is_deferred_until_ticks_pass() {
    let mut host = Host::new();
    let world = host.world.clone();
    host.registry.create(&world, Point::new(0, 0, 0), 3, 3, 0).unwrap();

    host.click(&Actor::player("p"), Point::new(0, 0, 0), Action::Reveal);
    assert_eq!(host.renderer.visual_at(&world, Point::new(2, 0, 2)), None);
    assert_eq!(host.dispatcher.pending_renders(), 1);

    assert_eq!(host.dispatcher.tick(1, &host.registry, &mut host.renderer), 0);
    assert_eq!(host.dispatcher.tick(1, &host.registry, &mut host.renderer), 1);
    assert_eq!(
        host.renderer.visual_at(&world, Point::new(2, 0, 2)),
        Some(CellState::Number(0))
    );
}

#[test]
fn flags_inside_the_debounce_window_are_dropped_without_saving() {
    let mut host = Host::new();
    let world = host.world.clone();
    host.registry.create(&world, Point::new(0, 0, 0), 4, 4, 2).unwrap();
    let player = Actor::player("p");
    let cell = Point::new(3, 0, 3);

    assert!(matches!(host.click(&player, cell, Action::Flag), Handled::Flagged { number: 0, .. }));
    let writes = host.store.writes();

    host.clock.advance(Duration::from_millis(100));
    assert_eq!(host.click(&player, cell, Action::Flag), Handled::Debounced);
    assert_eq!(host.store.writes(), writes);
    assert_eq!(host.registry.get(0).unwrap().game().cell_state(3, 3).unwrap(), CellState::Flagged);

    host.clock.advance(Duration::from_millis(200));
    assert!(matches!(host.click(&player, cell, Action::Flag), Handled::Flagged { .. }));
    assert_eq!(host.store.writes(), writes + 1);
    assert_eq!(host.registry.get(0).unwrap().game().cell_state(3, 3).unwrap(), CellState::Hidden);
}

#[test]
fn debounce_is_per_board() {
    let mut host = Host::new();
    let world = host.world.clone();
    host.registry.create(&world, Point::new(0, 0, 0), 3, 3, 1).unwrap();
    host.registry.create(&world, Point::new(10, 0, 0), 3, 3, 1).unwrap();
    let player = Actor::player("p");

    assert!(matches!(host.click(&player, Point::new(0, 0, 0), Action::Flag), Handled::Flagged { number: 0, .. }));
    assert!(matches!(host.click(&player, Point::new(10, 0, 0), Action::Flag), Handled::Flagged { number: 1, .. }));
}

#[test]
fn clicks_off_any_board_are_ignored() {
    let mut host = Host::new();
    let world = host.world.clone();
    let writes = host.store.writes();
    host.registry.create(&world, Point::new(0, 0, 0), 3, 3, 1).unwrap();

    assert_eq!(host.click(&Actor::new("guest"), Point::new(50, 0, 50), Action::Reveal), Handled::NoBoard);
    assert_eq!(host.click(&Actor::player("p"), Point::new(1, 1, 1), Action::Flag), Handled::NoBoard);
    assert!(host.outcomes.is_empty());
    assert_eq!(host.store.writes(), writes + 1);
}

#[test]
fn actors_without_interact_are_turned_away() {
    let mut host = Host::new();
    let world = host.world.clone();
    host.registry.create(&world, Point::new(0, 0, 0), 3, 3, 1).unwrap();

    let guest = Actor::new("guest").with(Permission::Lookup);
    assert_eq!(host.click(&guest, Point::new(1, 0, 1), Action::Reveal), Handled::NotPermitted);
    assert_eq!(host.outcomes, vec![Outcome::NotPermitted]);
    assert!(!host.registry.get(0).unwrap().game().is_over());
}

#[test]
fn flagging_an_open_cell_reports_the_game_number_to_lookups() {
    let mut host = Host::new();
    let world = host.world.clone();
    host.registry.create(&world, Point::new(0, 0, 0), 3, 3, 0).unwrap();
    host.registry.create(&world, Point::new(0, 5, 0), 4, 1, 2).unwrap();
    *host.registry.get_mut(1).unwrap().game_mut() = ClassicSweeper::with_bombs(4, 1, &[(0, 0), (3, 0)]).unwrap();
    let player = Actor::player("p").with(Permission::Lookup);

    // (1, 0) touches one bomb, so only that cell opens and the game goes on
    assert_eq!(
        host.click(&player, Point::new(1, 5, 0), Action::Reveal),
        Handled::Revealed { number: 1, saved: true }
    );
    assert!(host.outcomes.is_empty());

    assert_eq!(host.click(&player, Point::new(1, 5, 0), Action::Flag), Handled::Rejected { number: 1 });
    assert_eq!(host.outcomes, vec![Outcome::GameNumber { number: 1 }]);
    assert!(!host.registry.get(1).unwrap().game().is_over());
}

#[test]
fn flagging_an_exploded_board_is_rejected() {
    let mut host = Host::new();
    let world = host.world.clone();
    host.registry.create(&world, Point::new(0, 0, 0), 2, 2, 1).unwrap();
    *host.registry.get_mut(0).unwrap().game_mut() = ClassicSweeper::with_bombs(2, 2, &[(0, 0)]).unwrap();
    let player = Actor::player("p").with(Permission::Lookup);

    host.click(&player, Point::new(0, 0, 0), Action::Reveal);
    assert!(matches!(host.outcomes.as_slice(), [Outcome::BoardExploded { number: 0, .. }]));
    assert!(host.registry.get(0).unwrap().game().has_lost());
    host.outcomes.clear();

    assert_eq!(host.click(&player, Point::new(1, 0, 1), Action::Flag), Handled::Rejected { number: 0 });
    assert_eq!(host.outcomes, vec![Outcome::GameNumber { number: 0 }]);
    assert_eq!(host.registry.get(0).unwrap().game().cell_state(1, 1).unwrap(), CellState::Hidden);
}
