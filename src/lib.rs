//! # Slide Match Library
//!
//! This library provides the board logic for a sliding tile-matching game:
//! tiles on a rectangular grid slide in one of four directions, and runs of
//! same-typed tiles are eliminated once they settle.
//!
//! It is used by two binaries:
//! - `play`: Interactive gameplay on the command line.
//! - `resolve`: Loads a board file, applies a list of directions and prints
//!   every intermediate board.
//!
//! ## Modules
//! - `board`: The grid (`Board`), its cells (`Slot`) and tile identities (`TileType`, `TileHandle`).
//! - `movement`: Directions, move policies and `compute_move`, the slide resolver.
//! - `matching`: Match policies and `compute_matches`, the elimination resolver.
//! - `session`: The `Session` state machine that sequences moves, animations and clears.
//! - `visual`: Collaborator traits for the presentation layer, plus tile sources.
//! - `config`: `EngineConfig` and its validation.
//! - `error`: `EngineError` and the crate `Result` alias.
//! - `utils`: Text fixtures for boards.
//!
//! Items are accessed via their module path, e.g. `slide_match::movement::compute_move`.

pub mod board;
pub mod config;
pub mod error;
pub mod matching;
pub mod movement;
pub mod session;
pub mod utils;
pub mod visual;
