//! Move resolution: how tiles slide when a direction is applied.
//!
//! `compute_move` is a pure function over a board snapshot. It walks the grid
//! in an order where the downstream neighbor of every slot (the slot it would
//! move into) is visited first, so each slot's reach can be derived from the
//! reach already computed for that neighbor. A second pass in the same order
//! relocates the tiles into a fresh board.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::board::{Board, Pos, Slot, TileHandle, TileType};
use crate::error::{EngineError, Result};

/// One of the four unit move directions. `Up` is `+y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Returns the unit vector `(dx, dy)` for this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Builds a direction from a raw input vector.
    ///
    /// Diagonal movement is not allowed: when both components are non-zero
    /// the vertical one is dropped and the horizontal one kept. Magnitudes are
    /// normalised, so `(3, 0)` is `Right`.
    ///
    /// # Returns
    /// * `Ok(Direction)` for any non-zero vector.
    /// * `Err(EngineError::InvalidDirection)` for `(0, 0)`.
    ///
    /// # Examples
    /// ```
    /// use slide_match::movement::Direction;
    /// assert_eq!(Direction::from_delta(0, 1).unwrap(), Direction::Up);
    /// assert_eq!(Direction::from_delta(-1, 1).unwrap(), Direction::Left);
    /// assert!(Direction::from_delta(0, 0).is_err());
    /// ```
    pub fn from_delta(dx: i32, dy: i32) -> Result<Direction> {
        let dy = if dx != 0 { 0 } else { dy };
        match (dx.signum(), dy.signum()) {
            (1, _) => Ok(Direction::Right),
            (-1, _) => Ok(Direction::Left),
            (_, 1) => Ok(Direction::Up),
            (_, -1) => Ok(Direction::Down),
            _ => Err(EngineError::InvalidDirection { dx, dy }),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

impl FromStr for Direction {
    type Err = EngineError;

    /// Accepts direction names and the `w`/`a`/`s`/`d` keys.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "w" => Ok(Direction::Up),
            "down" | "s" => Ok(Direction::Down),
            "left" | "a" => Ok(Direction::Left),
            "right" | "d" => Ok(Direction::Right),
            other => Err(EngineError::Parse(format!("unknown direction '{}'", other))),
        }
    }
}

/// How far each tile slides per move request.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum MovePolicy {
    /// A tile advances one slot, only into an empty slot.
    RowOneStep,
    /// A tile slides through the run of empty slots directly ahead of it.
    RowToEnd,
    /// Like `RowOneStep`, but a tile directly behind a tile that moves one
    /// step also moves one step, so whole chains advance together.
    AllOneStep,
    /// Full compaction: every tile advances by the total gap ahead of it.
    #[default]
    AllToEnd,
}

/// Per-slot travel distance along the move direction.
///
/// Empty slots always report 0. A no-op move produces an empty map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplacementMap {
    width: usize,
    height: usize,
    distances: Vec<usize>,
}

impl DisplacementMap {
    fn empty(width: usize, height: usize) -> Self {
        DisplacementMap {
            width,
            height,
            distances: Vec::new(),
        }
    }

    /// Returns `true` when the map holds no entries (the no-op case).
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Returns the distance the tile at `pos` travels.
    ///
    /// Off-board positions and every position of an empty map report 0.
    pub fn get(&self, pos: Pos) -> usize {
        if self.distances.is_empty() || pos.x >= self.width || pos.y >= self.height {
            return 0;
        }
        self.distances[pos.y * self.width + pos.x]
    }

    /// The largest distance in the map, 0 when nothing moves.
    pub fn max(&self) -> usize {
        self.distances.iter().copied().max().unwrap_or(0)
    }
}

/// A single tile relocation, recorded for the visual mover.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileMove {
    pub handle: TileHandle,
    pub tile: TileType,
    pub from: Pos,
    pub to: Pos,
    pub distance: usize,
}

/// Result of resolving one move request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The board after every relocation has been applied.
    pub board: Board,
    /// The direction actually used, `None` for a no-op request.
    pub direction: Option<Direction>,
    pub displacements: DisplacementMap,
    /// Relocations in resolution order (downstream tiles first).
    pub moves: Vec<TileMove>,
}

impl MoveOutcome {
    fn unchanged(board: &Board) -> Self {
        MoveOutcome {
            board: board.clone(),
            direction: None,
            displacements: DisplacementMap::empty(board.width(), board.height()),
            moves: Vec::new(),
        }
    }

    /// Returns `true` if no tile moved.
    pub fn is_noop(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Resolves a move from a raw input vector.
///
/// The vector goes through `Direction::from_delta`, so a diagonal collapses to
/// its horizontal component. The zero vector is not an error here: the board
/// is returned unchanged with an empty displacement map.
///
/// # Arguments
/// * `board`: The board snapshot. It is not modified.
/// * `dx`, `dy`: The requested direction.
/// * `policy`: How far tiles slide.
pub fn compute_move(board: &Board, dx: i32, dy: i32, policy: MovePolicy) -> MoveOutcome {
    match Direction::from_delta(dx, dy) {
        Ok(direction) => resolve_move(board, direction, policy),
        Err(err) => {
            trace!(%err, "ignoring move request");
            MoveOutcome::unchanged(board)
        }
    }
}

/// Resolves a move in `direction` under `policy`.
///
/// # Returns
/// A `MoveOutcome` holding the new board, the displacement of every slot and
/// the list of relocations. The input board is left untouched.
pub fn resolve_move(board: &Board, direction: Direction, policy: MovePolicy) -> MoveOutcome {
    let (dx, dy) = direction.delta();
    let (width, height) = (board.width(), board.height());

    // Descending when moving toward +x/+y so the neighbor ahead is visited first.
    let mut iter_x: Vec<usize> = (0..width).collect();
    let mut iter_y: Vec<usize> = (0..height).collect();
    if dx > 0 || dy > 0 {
        iter_x.reverse();
        iter_y.reverse();
    }

    // Reach is computed for empty slots too; tiles behind them chain off it.
    let mut reach = vec![0usize; width * height];
    for &x in &iter_x {
        for &y in &iter_y {
            let nx = x as isize + dx as isize;
            let ny = y as isize + dy as isize;
            if !board.in_bounds(nx, ny) {
                continue; // wall
            }
            let (nx, ny) = (nx as usize, ny as usize);
            let next_empty = board.slot_at(nx, ny).is_empty();
            let next_reach = reach[ny * width + nx];

            reach[y * width + x] = match policy {
                MovePolicy::RowOneStep => usize::from(next_empty),
                MovePolicy::RowToEnd => {
                    if next_empty {
                        next_reach + 1
                    } else {
                        0
                    }
                }
                MovePolicy::AllOneStep => usize::from(next_empty || next_reach == 1),
                MovePolicy::AllToEnd => {
                    if next_empty {
                        next_reach + 1
                    } else {
                        next_reach
                    }
                }
            };
        }
    }

    let mut next = board.clone();
    next.clear();
    let mut distances = vec![0usize; width * height];
    let mut moves = Vec::new();

    for &x in &iter_x {
        for &y in &iter_y {
            let slot = board.slot_at(x, y);
            let Slot::Occupied { tile, handle } = slot else {
                continue;
            };
            let idx = y * width + x;
            let distance = reach[idx];
            let from = Pos::new(x, y);
            let to = from
                .offset(dx, dy, distance)
                .expect("displacement never runs past the board edge");

            debug_assert!(
                next.slot_at(to.x, to.y).is_empty(),
                "two tiles resolved to {}",
                to
            );
            next.put(to, slot);
            distances[idx] = distance;

            if distance > 0 {
                trace!(?handle, %from, %to, distance, "tile relocated");
                moves.push(TileMove {
                    handle,
                    tile,
                    from,
                    to,
                    distance,
                });
            }
        }
    }

    debug!(%direction, ?policy, moved = moves.len(), "resolved move");

    MoveOutcome {
        board: next,
        direction: Some(direction),
        displacements: DisplacementMap {
            width,
            height,
            distances,
        },
        moves,
    }
}
