use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::style::Color;
use tracing::debug;

use crate::config::{Config, DEFAULT_WORLD_NAME};
use crate::core::actor::Actor;
use crate::core::dispatcher::{Action, Handled, Interaction};
use crate::core::outcome::Outcome;
use crate::core::world::{Point, World};
use crate::games::ClassicSweeper;
use crate::session::Session;
use crate::terminal::{TerminalContext, TerminalRenderer};

type HostSession = Session<ClassicSweeper, TerminalRenderer>;

#[derive(Parser)]
#[command(name = "headsweeper")]
#[command(about = "Minesweeper boards laid out in a block world")]
#[command(version)]
pub struct Cli {
    /// TOML config file
    #[arg(short, long, default_value = "headsweeper.toml")]
    pub config: PathBuf,

    /// Save file, overriding the config
    #[arg(long)]
    pub save_file: Option<PathBuf>,

    /// Name to act as
    #[arg(long = "as", default_value = "console")]
    pub actor: String,

    /// Act with player permissions only (play, but not manage or reset)
    #[arg(long)]
    pub player: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Place a new board with its corner at x y z
    #[command(allow_negative_numbers = true)]
    Create {
        x: i32,
        y: i32,
        z: i32,
        /// Cells along x
        width: usize,
        /// Cells along z
        height: usize,
        bombs: usize,
        #[arg(short, long, default_value = DEFAULT_WORLD_NAME)]
        world: String,
    },
    /// Start a new game on a board
    Reset { number: usize },
    /// Remove a board
    Delete { number: usize },
    /// Left-click the cell at x y z
    #[command(allow_negative_numbers = true)]
    Reveal {
        x: i32,
        y: i32,
        z: i32,
        #[arg(short, long, default_value = DEFAULT_WORLD_NAME)]
        world: String,
    },
    /// Right-click the cell at x y z
    #[command(allow_negative_numbers = true)]
    Flag {
        x: i32,
        y: i32,
        z: i32,
        #[arg(short, long, default_value = DEFAULT_WORLD_NAME)]
        world: String,
    },
    /// Advance the host loop
    Tick {
        #[arg(default_value_t = 1)]
        ticks: u64,
    },
    /// List all boards
    List,
    /// Draw one board, or all of them
    Show { number: Option<usize> },
    /// Read commands from stdin, one per line, against a single session
    Shell,
}

/// One line typed into the shell
#[derive(Parser)]
#[command(no_binary_name = true, disable_help_flag = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Command,
}

pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(save_file) = cli.save_file {
        config.save_file = save_file;
    }
    let actor = if cli.player {
        Actor::player(cli.actor)
    } else {
        Actor::operator(cli.actor)
    };

    let mut session: HostSession = Session::open(&config, TerminalRenderer::new())
        .with_context(|| format!("failed to load games from {}", config.save_file.display()))?;
    let stdout = io::stdout();
    let mut ctx = TerminalContext::new(stdout.lock());

    match cli.command {
        Command::Shell => run_shell(&mut session, &actor, &mut ctx)?,
        command => {
            let deferred = run_command(&mut session, &actor, command, &mut ctx)?;
            // a one-shot run has no loop to wait for, so run pending renders now
            session.tick(config.render_delay_ticks);
            if let Some(number) = deferred {
                show(&session, Some(number), &mut ctx)?;
            }
        }
    }
    ctx.flush()?;
    Ok(())
}

fn run_shell<W: Write>(session: &mut HostSession, actor: &Actor, ctx: &mut TerminalContext<W>) -> Result<()> {
    ctx.print_colored_line("HeadSweeper shell. Type a command, `help`, or `quit`.", Color::Yellow)?;
    for line in io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }

        match ShellLine::try_parse_from(line.split_whitespace()) {
            Ok(ShellLine { command: Command::Shell }) => {
                ctx.print_colored_line("Already in a shell.", Color::Red)?;
            }
            Ok(ShellLine { command }) => match run_command(session, actor, command, ctx) {
                Ok(Some(number)) => ctx.print_line(&format!(
                    "Game {} will redraw shortly, `show {}` to look.",
                    number, number
                ))?,
                Ok(None) => {}
                Err(e) => ctx.print_colored_line(&format!("error: {:#}", e), Color::Red)?,
            },
            Err(e) => ctx.print_line(&e.render().to_string())?,
        }

        // every line is one pass of the host loop
        let rendered = session.tick(1);
        if rendered > 0 {
            debug!(rendered, tick = session.dispatcher().current_tick(), "deferred renders ran");
        }
        ctx.flush()?;
    }
    Ok(())
}

/// Run one command. Returns the board to draw once deferred renders have run.
fn run_command<W: Write>(
    session: &mut HostSession,
    actor: &Actor,
    command: Command,
    ctx: &mut TerminalContext<W>,
) -> Result<Option<usize>> {
    match command {
        Command::Create { x, y, z, width, height, bombs, world } => {
            let world = find_world(session, &world)?;
            let created = session.create(actor, &world, Point::new(x, y, z), width, height, bombs)?;
            report(session, ctx)?;
            if let Some(number) = created {
                show(session, Some(number), ctx)?;
            }
        }
        Command::Reset { number } => {
            let reset = session.reset(actor, number);
            report(session, ctx)?;
            if reset {
                show(session, Some(number), ctx)?;
            }
        }
        Command::Delete { number } => {
            session.delete(actor, number);
            report(session, ctx)?;
        }
        Command::Reveal { x, y, z, world } => {
            return interact(session, actor, &world, Point::new(x, y, z), Action::Reveal, ctx);
        }
        Command::Flag { x, y, z, world } => {
            return interact(session, actor, &world, Point::new(x, y, z), Action::Flag, ctx);
        }
        Command::Tick { ticks } => {
            let rendered = session.tick(ticks);
            ctx.print_line(&format!("{} board(s) re-rendered", rendered))?;
        }
        Command::List => list(session, ctx)?,
        Command::Show { number } => show(session, number, ctx)?,
        Command::Shell => return Err(anyhow!("shell cannot be nested")),
    }
    Ok(None)
}

fn find_world(session: &HostSession, name: &str) -> Result<World> {
    session.world(name).ok_or_else(|| {
        let known: Vec<&str> = session.worlds().iter().map(|w| w.name.as_str()).collect();
        anyhow!("unknown world '{}' (known: {})", name, known.join(", "))
    })
}

fn interact<W: Write>(
    session: &mut HostSession,
    actor: &Actor,
    world: &str,
    point: Point,
    action: Action,
    ctx: &mut TerminalContext<W>,
) -> Result<Option<usize>> {
    let world = find_world(session, world)?;
    let interaction = Interaction { actor: actor.clone(), world, point, action };
    let handled = session.interact(&interaction)?;
    report(session, ctx)?;

    match handled {
        Handled::NoBoard => ctx.print_line(&format!("Nothing to click at {}.", point))?,
        Handled::Debounced => ctx.print_line("Ignored, flagged too quickly.")?,
        // reveals are redrawn a few ticks later
        Handled::Revealed { number, .. } => return Ok(Some(number)),
        Handled::Flagged { number, .. } => show(session, Some(number), ctx)?,
        Handled::NotPermitted | Handled::Rejected { .. } => {}
    }
    Ok(None)
}

/// Print the outcomes raised by the last command
fn report<W: Write>(session: &mut HostSession, ctx: &mut TerminalContext<W>) -> Result<()> {
    for outcome in session.drain_outcomes() {
        ctx.print_colored("[", Color::DarkCyan)?;
        ctx.print_colored("Head", Color::DarkYellow)?;
        ctx.print_colored("Sweeper", Color::Red)?;
        ctx.print_colored("] ", Color::DarkCyan)?;
        let color = if outcome.is_success() {
            Color::Green
        } else if matches!(outcome, Outcome::GameNumber { .. }) {
            Color::Reset
        } else {
            Color::Red
        };
        ctx.print_colored_line(&outcome.to_string(), color)?;
    }
    Ok(())
}

fn list<W: Write>(session: &HostSession, ctx: &mut TerminalContext<W>) -> Result<()> {
    if session.registry().is_empty() {
        ctx.print_line("No boards yet.")?;
        return Ok(());
    }
    for (number, board) in session.registry().boards().iter().enumerate() {
        let world = board
            .world()
            .map(|w| w.name.clone())
            .unwrap_or_else(|| format!("{} (unresolved)", board.world_ref()));
        ctx.print_line(&format!(
            "{:>3}  {}  {}  {}x{}  id {}",
            number,
            world,
            board.anchor(),
            board.width(),
            board.height(),
            board.id()
        ))?;
    }
    Ok(())
}

fn show<W: Write>(session: &HostSession, number: Option<usize>, ctx: &mut TerminalContext<W>) -> Result<()> {
    let registry = session.registry();
    match number {
        Some(number) => {
            let board = registry.get(number)?;
            session.renderer().draw(board, number, ctx)?;
        }
        None => {
            for (number, board) in registry.boards().iter().enumerate() {
                session.renderer().draw(board, number, ctx)?;
            }
        }
    }
    Ok(())
}
