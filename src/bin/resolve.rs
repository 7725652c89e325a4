use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use slide_match::config::EngineConfig;
use slide_match::matching::MatchPolicy;
use slide_match::movement::{Direction, MovePolicy};
use slide_match::session::Session;
use slide_match::utils::{board_from_str_array, board_to_str_rows};
use slide_match::visual::RecordingVisuals;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Apply a sequence of moves to a board file", long_about = None)]
struct Args {
    /// How far tiles slide per move
    #[clap(long, value_enum, default_value_t = MovePolicy::AllToEnd)]
    move_policy: MovePolicy,

    /// Which adjacency patterns are eliminated
    #[clap(long, value_enum, default_value_t = MatchPolicy::Connected3)]
    match_policy: MatchPolicy,

    /// Keep sliding in the same direction after every clear
    #[clap(long)]
    cascade: bool,

    /// Run one elimination pass before the first move
    #[clap(long)]
    clear_first: bool,

    /// Path to the board file: one row per line, top row first, digits for tiles and '.' for empty
    board_file: PathBuf,

    /// Directions to apply in order (up/down/left/right or w/a/s/d)
    #[clap(required = true)]
    moves: Vec<Direction>,
}

fn read_board_file(path: &PathBuf) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read board file {}", path.display()))?;

    let lines: Vec<String> = content
        .lines()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    Ok(lines)
}

fn print_rows(label: &str, session: &Session<RecordingVisuals>) {
    println!("{}:", label);
    for row in board_to_str_rows(session.board()) {
        println!("  {}", row);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let rows = read_board_file(&args.board_file)?;
    let row_refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let board = board_from_str_array(&row_refs)
        .with_context(|| format!("invalid board in {}", args.board_file.display()))?;

    let config = EngineConfig {
        width: board.width(),
        height: board.height(),
        palette_size: 10,
        move_policy: args.move_policy,
        match_policy: args.match_policy,
        cascade: args.cascade,
        ..EngineConfig::default()
    };
    let mut session = Session::new(config, RecordingVisuals::new())?;
    session.load_board(board)?;
    print_rows("Initial board", &session);

    if args.clear_first {
        let cleared = session.clear_matches()?;
        println!("Initial clear removed {} tile(s).", cleared.len());
        print_rows("After initial clear", &session);
    }

    for (i, direction) in args.moves.iter().enumerate() {
        let report = session.apply(*direction)?;
        println!("\nMove {}: {} ({} tile(s) moved)", i + 1, direction, report.moved);
        print_rows("After move", &session);

        loop {
            let wait = session.settle_after();
            session.visuals_mut().advance(wait);
            let settled = session.settle();
            if settled.removed_any() {
                let cleared: Vec<String> = settled.cleared.iter().map(|p| p.to_string()).collect();
                println!("Cleared: {}", cleared.join(" "));
                print_rows("After clear", &session);
            }
            if !settled.cascading {
                break;
            }
            println!("Cascade moved {} tile(s).", settled.moved);
            print_rows("After cascade", &session);
        }
    }

    println!("\nTiles remaining: {}", session.board().occupied_count());
    Ok(())
}
