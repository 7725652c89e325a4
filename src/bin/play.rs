use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use slide_match::config::EngineConfig;
use slide_match::error::EngineError;
use slide_match::matching::MatchPolicy;
use slide_match::movement::{Direction, MovePolicy};
use slide_match::session::Session;
use slide_match::visual::{RandomTileSource, RecordingVisuals};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Play the sliding tile-matching game in the terminal", long_about = None)]
struct Args {
    /// JSON configuration file; command-line options override its values
    #[clap(long)]
    config: Option<PathBuf>,

    /// Board width in cells
    #[clap(long)]
    width: Option<usize>,

    /// Board height in cells
    #[clap(long)]
    height: Option<usize>,

    /// Number of distinct tile types
    #[clap(long)]
    palette: Option<u8>,

    /// How far tiles slide per move
    #[clap(long, value_enum)]
    move_policy: Option<MovePolicy>,

    /// Which adjacency patterns are eliminated
    #[clap(long, value_enum)]
    match_policy: Option<MatchPolicy>,

    /// Seconds a tile takes to reach its target
    #[clap(long)]
    duration: Option<f32>,

    /// Keep sliding in the same direction after every clear
    #[clap(long)]
    cascade: bool,

    /// Seed for the board generator; random if omitted
    #[clap(long)]
    seed: Option<u64>,
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            EngineConfig::from_json_str(&text)?
        }
        None => EngineConfig::default(),
    };

    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(palette) = args.palette {
        config.palette_size = palette;
    }
    if let Some(policy) = args.move_policy {
        config.move_policy = policy;
    }
    if let Some(policy) = args.match_policy {
        config.match_policy = policy;
    }
    if let Some(duration) = args.duration {
        config.move_duration = duration;
    }
    config.cascade |= args.cascade;

    config.validate()?;
    Ok(config)
}

fn new_source(config: &EngineConfig, seed: Option<u64>) -> RandomTileSource {
    match seed {
        Some(seed) => RandomTileSource::with_seed(config.palette_size, seed),
        None => RandomTileSource::from_entropy(config.palette_size),
    }
}

// Plays one direction to completion, cascades included.
fn play_move(session: &mut Session<RecordingVisuals>, direction: Direction) -> Result<()> {
    let report = match session.apply(direction) {
        Ok(report) => report,
        Err(err @ EngineError::ConcurrentMoveRejected { .. }) => {
            warn!(%err, "input ignored");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    println!("Moved {} tile(s) {}.", report.moved, direction);

    loop {
        let wait = session.settle_after();
        session.visuals_mut().advance(wait);
        let settled = session.settle();
        if settled.removed_any() {
            println!("Cleared {} tile(s):", settled.cleared.len());
            println!("{}", session.board().to_string_with_highlight(&settled.cleared));
        }
        if !settled.cascading {
            return Ok(());
        }
        println!("Cascade moved {} tile(s).", settled.moved);
        if settled.late > 0 {
            warn!(late = settled.late, "cascade started before tiles arrived");
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let mut source = new_source(&config, args.seed);
    let mut session = Session::new(config, RecordingVisuals::new())?;
    session.reset(&mut source);

    println!("Welcome to Slide Match!");

    loop {
        println!("---------------------");
        println!("Tiles on board: {}", session.board().occupied_count());
        println!("{}", session.board());

        print!("Enter a direction (w/a/s/d or up/left/down/right), 'r' to reset, 'q' to quit: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        match input.trim() {
            "q" => {
                println!("Thanks for playing!");
                break;
            }
            "r" => {
                let cleared = session.reset(&mut source);
                println!("Board reset ({} tile(s) cleared on spawn).", cleared.len());
            }
            "" => continue,
            other => match other.parse::<Direction>() {
                Ok(direction) => play_move(&mut session, direction)?,
                Err(err) => println!("{}", err),
            },
        }
    }

    Ok(())
}
