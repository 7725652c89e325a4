//! Match resolution: which tiles are eliminated after a move.
//!
//! Every occupied slot is treated as a potential center. Its four orthogonal
//! neighbors are compared by tile type and the active `MatchPolicy` decides
//! whether the center qualifies. A qualifying center marks itself and every
//! neighbor that still counts. This is a single pass: runs longer than three
//! are covered by the union over all qualifying centers, not by iterating to
//! a fixed point.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::board::{Board, Pos, TileHandle};
use crate::error::Result;

/// Adjacency rule for elimination.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum MatchPolicy {
    /// Any pair of adjacent same-type tiles is cleared.
    Connected2,
    /// A tile with at least two same-type neighbors is cleared together with
    /// those neighbors. L-shapes count.
    #[default]
    Connected3,
    /// Only straight runs of three or more are cleared.
    Straight3,
}

/// Coordinates to clear, in `Pos` order.
pub type MatchSet = BTreeSet<Pos>;

// Neighbor order: right, up, left, down. Index 0/2 is the horizontal pair,
// 1/3 the vertical pair.
const NEIGHBORS: [(isize, isize); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Computes the set of slots to clear under `policy`.
///
/// Read-only over `board`.
///
/// # Examples
/// ```
/// use slide_match::matching::{compute_matches, MatchPolicy};
/// use slide_match::utils::board_from_str_array;
///
/// let board = board_from_str_array(&["000"]).unwrap();
/// assert_eq!(compute_matches(&board, MatchPolicy::Connected3).len(), 3);
/// ```
pub fn compute_matches(board: &Board, policy: MatchPolicy) -> MatchSet {
    let mut matches = MatchSet::new();

    for (pos, tile, _) in board.occupied() {
        let mut same_type = [false; 4];
        for (dir, &(dx, dy)) in NEIGHBORS.iter().enumerate() {
            let nx = pos.x as isize + dx;
            let ny = pos.y as isize + dy;
            if !board.in_bounds(nx, ny) {
                continue;
            }
            same_type[dir] = board.slot_at(nx as usize, ny as usize).tile() == Some(tile);
        }

        if policy == MatchPolicy::Straight3 {
            if !(same_type[0] && same_type[2]) {
                same_type[0] = false;
                same_type[2] = false;
            }
            if !(same_type[1] && same_type[3]) {
                same_type[1] = false;
                same_type[3] = false;
            }
        }

        let count = same_type.iter().filter(|&&b| b).count();
        let required = match policy {
            MatchPolicy::Connected2 => 1,
            MatchPolicy::Connected3 | MatchPolicy::Straight3 => 2,
        };
        if count < required {
            continue;
        }

        trace!(%pos, ?tile, count, "match center");
        matches.insert(pos);
        for (dir, &(dx, dy)) in NEIGHBORS.iter().enumerate() {
            if same_type[dir] {
                let neighbor = Pos::new(
                    (pos.x as isize + dx) as usize,
                    (pos.y as isize + dy) as usize,
                );
                matches.insert(neighbor);
            }
        }
    }

    debug!(?policy, matched = matches.len(), "resolved matches");
    matches
}

/// Clears every slot in `matches` and returns the handles that were released.
///
/// Positions that are already empty are skipped. The caller forwards the
/// handles to the visual remover.
///
/// # Returns
/// * `Ok(handles)` of the tiles removed.
/// * `Err(EngineError::OutOfRange)` if any position is off the board; the
///   board is left untouched in that case.
pub fn apply_matches(board: &mut Board, matches: &MatchSet) -> Result<Vec<TileHandle>> {
    for pos in matches {
        board.at(*pos)?;
    }

    let mut released = Vec::with_capacity(matches.len());
    for pos in matches {
        if let Some(handle) = board.take(pos.x, pos.y)?.handle() {
            released.push(handle);
        }
    }
    Ok(released)
}
