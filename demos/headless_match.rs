//! # Headless Match
//!
//! Plays a complete game of Snakes and Ladders in the terminal and prints every event.
//! The program plays the part of a presentation layer: it rolls for whoever is active, feeds the
//! session frame times and reads back events and snapshots.
//!
//! Run with: `cargo run --example headless_match -- --seed 7 Ada Grace Edsger`
//!
//! Add `--paced` to play in real time with the classic timing, and `--log-level debug` to see
//! the engine's own logs.

// Allow example-specific patterns
#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::disallowed_macros,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]

use clap::Parser;
use ladder_session::prelude::*;
use ladder_session::telemetry::{
    CollectingObserver, CompositeObserver, TracingObserver, ViolationObserver,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use web_time::{Duration, Instant};

const FPS: f64 = 60.0;

#[derive(Parser)]
#[command(about = "Play a headless game of Snakes and Ladders")]
struct Opt {
    /// Player names, 2 to 4, in turn order.
    #[arg(default_values = ["Ada", "Grace"])]
    players: Vec<String>,
    /// Seed for the dice. Random if omitted.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Play in real time with the classic pacing instead of instantly.
    #[arg(short, long)]
    paced: bool,
    /// Start tokens off the board.
    #[arg(long)]
    off_board: bool,
    /// Give up after this many turns.
    #[arg(long, default_value_t = 1_000)]
    max_turns: usize,
    /// Log filter, e.g. `info` or `ladder_session=debug`.
    #[arg(short, long, default_value = "warn")]
    log_level: String,
    /// Print the final snapshot as JSON (needs the `json` feature).
    #[arg(long)]
    json: bool,
}

fn describe(session: &GameSession, event: GameEvent) -> String {
    let name = |id: PlayerId| {
        session
            .player(id)
            .map_or_else(|| id.to_string(), |p| format!("{} ({})", p.name(), p.token()))
    };
    match event {
        GameEvent::DiceRolled { player, value } => format!("{} rolls a {value}", name(player)),
        GameEvent::PlayerMoved { to, .. } => format!("  hop to {to}"),
        GameEvent::SnakeHit { head, tail, .. } => format!("  snake! slides from {head} to {tail}"),
        GameEvent::LadderHit { bottom, top, .. } => {
            format!("  ladder! climbs from {bottom} to {top}")
        },
        GameEvent::MoveBlocked { player, cell, roll } => {
            let needed = 100 - cell.as_u8();
            format!("  {} needs exactly {needed} from {cell}, not {roll}", name(player))
        },
        GameEvent::TurnAdvanced { to, .. } => format!("-- {}'s turn", name(to)),
        GameEvent::PlayerWon { player } => format!("*** {} wins! ***", name(player)),
        GameEvent::GameRestarted => "game restarted".to_owned(),
        _ => format!("{event:?}"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opt = Opt::parse();

    // configure logging: the engine logs through tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&opt.log_level)?)
        .init();

    let timing = if opt.paced {
        TimingConfig::classic()
    } else {
        TimingConfig::instant()
    };
    // log violations as they happen and keep them for the summary
    let observer = Arc::new(CollectingObserver::new());
    let composite = CompositeObserver::from_observers(vec![
        Arc::new(TracingObserver::new()) as Arc<dyn ViolationObserver>,
        observer.clone() as Arc<dyn ViolationObserver>,
    ]);

    let mut builder = SessionBuilder::new()
        .with_timing(timing)
        .with_violation_observer(Arc::new(composite));
    if let Some(seed) = opt.seed {
        builder = builder.with_seed(seed);
    }
    if opt.off_board {
        builder = builder.with_start_position(StartPosition::OffBoard);
    }
    for name in &opt.players {
        builder = builder.add_player(name)?;
    }
    let mut session = builder.start_session()?;

    println!(
        "{} players on a board with {} snakes and {} ladders",
        session.players().len(),
        session.topology().snakes().count(),
        session.topology().ladders().count()
    );

    // time variables for tick rate
    let fps_delta = Duration::from_secs_f64(1. / FPS);
    let mut last_update = Instant::now();
    let mut turns = 0;

    while session.state() != TurnState::GameOver {
        if session.state() == TurnState::AwaitingRoll {
            // only stop between turns so the last one plays out
            if turns >= opt.max_turns {
                break;
            }
            session.roll_dice()?;
            turns += 1;
        }

        if opt.paced {
            std::thread::sleep(fps_delta);
            let now = Instant::now();
            session.tick(now.duration_since(last_update));
            last_update = now;
        } else {
            session.tick(Tick::Advance);
        }

        let events: Vec<GameEvent> = session.events().collect();
        for event in events {
            println!("{}", describe(&session, event));
        }
    }

    let snapshot = session.snapshot();
    match snapshot.winner {
        Some(_) => println!("game over after {} turns", snapshot.turns_completed),
        None => println!("no winner after {} turns", snapshot.turns_completed),
    }
    for player in &snapshot.players {
        println!("  {:<15} {:>6} on {}", player.name, player.token.to_string(), player.position);
    }
    if !observer.is_empty() {
        eprintln!("{} rule violations:", observer.len());
        for violation in observer.violations() {
            eprintln!("  {violation}");
        }
    }

    if opt.json {
        print_json(&snapshot);
    }
    Ok(())
}

#[cfg(feature = "json")]
fn print_json(snapshot: &GameSnapshot) {
    if let Some(json) = snapshot.to_json() {
        println!("{json}");
    }
}

#[cfg(not(feature = "json"))]
fn print_json(_snapshot: &GameSnapshot) {
    eprintln!("rebuild with --features json to print the snapshot as JSON");
}
