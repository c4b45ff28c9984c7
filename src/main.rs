//! Isana: a Go engine speaking GTP.
//!
//! ## Usage
//!
//! - `isana` - Start the GTP server (default)
//! - `isana gtp` - Start the GTP server for GUI integration
//! - `isana demo` - Search an empty 9x9 board and print the result

use std::io;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};

use isana::board::{Size, Stone};
use isana::constants::{DEFAULT_KOMI, DEFAULT_TRIALS};
use isana::gtp::{GtpEngine, render, str_vertex};
use isana::mcts::{Config, Engine, SearchMode};
use isana::position::Position;

/// Isana: a bitboard Go engine with parallel UCT search
#[derive(Parser)]
#[command(name = "isana")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Number of UCT descents per move
    #[arg(short, long, default_value_t = DEFAULT_TRIALS)]
    trials: usize,

    /// Worker threads for the search (defaults to the number of CPUs)
    #[arg(short, long)]
    parallels: Option<usize>,

    /// Seed for the search's random generators
    #[arg(long)]
    seed: Option<u64>,

    /// Run descents one after another on a single thread
    #[arg(long)]
    sequential: bool,

    /// Initial board size (9, 11, 13, 15 or 19)
    #[arg(long, default_value_t = 19)]
    size: usize,

    /// Initial komi
    #[arg(long, default_value_t = DEFAULT_KOMI)]
    komi: f64,

    /// Log more to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp,
    /// Search an empty 9x9 board and print the chosen move
    Demo,
}

fn setup_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(io::stderr())
        .apply()
        .context("failed to install logger")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    if let Some(threads) = cli.parallels {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure the search thread pool")?;
    }

    let size =
        Size::from_line(cli.size).ok_or_else(|| anyhow!("unsupported board size {}", cli.size))?;
    let config = Config {
        komi: cli.komi,
        trials: cli.trials,
        mode: if cli.sequential {
            SearchMode::Sequential
        } else {
            SearchMode::Parallel
        },
        seed: cli.seed,
        ..Config::default()
    };

    match cli.command {
        Some(Commands::Gtp) | None => GtpEngine::new(config, size).run(),
        Some(Commands::Demo) => {
            run_demo(config);
            Ok(())
        }
    }
}

fn run_demo(config: Config) {
    println!("Isana: bitboard Go engine with UCT search\n");

    let trials = config.trials;
    let engine = Engine::new(config);
    let mut pos = Position::new(Size::B9x9, engine.config.komi);

    println!("Running {trials} descents on an empty 9x9 board...");
    let best = engine.ponder(&mut pos, Stone::Black);
    println!(
        "Best move: {} (visits {}, rate {:.2})",
        str_vertex(best.vertex, pos.size),
        best.visits,
        best.rate
    );

    if let Ok(next) = pos.apply(&best) {
        println!("{}", render(&next));
    }
}
