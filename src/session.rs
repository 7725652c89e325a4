//! Driver-side state machine for one game session.
//!
//! A `Session` owns the board and the visuals and sequences the
//! move/eliminate cycle:
//!
//! ```text
//! Idle --apply_direction--> Resolving --settle--> Clearing --> Idle
//!                               ^                     |
//!                               +------ cascade ------+
//! ```
//!
//! The board's logical state is always fully updated before any animation is
//! requested. While a cycle is in flight (`Resolving`), further input is
//! rejected with `EngineError::ConcurrentMoveRejected`; the caller is expected
//! to drop that input, not to retry it.
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::board::{Board, Pos, Slot, TileHandle};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::matching::{apply_matches, compute_matches};
use crate::movement::{compute_move, resolve_move, Direction, MoveOutcome};
use crate::visual::{TileSource, Visuals};

/// Where a session is in the move/eliminate cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// Ready for input.
    #[default]
    Idle,
    /// Tiles have been relocated and are animating toward their targets.
    Resolving,
    /// Matched tiles are being removed.
    Clearing,
}

/// Summary of an accepted move request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MoveReport {
    /// The direction used, `None` when the request was the zero vector.
    pub direction: Option<Direction>,
    /// Number of tiles relocated.
    pub moved: usize,
    /// Moves the visual mover refused because the tile was still travelling.
    pub late: usize,
    /// Seconds the driver should wait before calling `settle`.
    pub settle_after: f32,
}

/// Summary of one `settle` call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SettleReport {
    /// Matched positions, in `Pos` order.
    pub cleared: Vec<Pos>,
    /// `true` if a cascade move was started; the driver must settle again.
    pub cascading: bool,
    /// Tiles relocated by the cascade move, 0 when not cascading.
    pub moved: usize,
    /// Cascade moves the visual mover refused because the tile was still
    /// travelling.
    pub late: usize,
}

impl SettleReport {
    /// Returns `true` if anything was eliminated.
    pub fn removed_any(&self) -> bool {
        !self.cleared.is_empty()
    }
}

/// One game in progress: the board, its visuals and the cycle state.
///
/// `V` receives every spawn, move and destroy request; the board itself is
/// only changed through the session's operations.
pub struct Session<V> {
    config: EngineConfig,
    board: Board,
    visuals: V,
    state: SessionState,
    next_handle: u64,
    last_direction: Option<Direction>,
    settle_after: f32,
}

impl<V: Visuals> Session<V> {
    /// Creates a session with an empty board.
    ///
    /// # Returns
    /// * `Ok(Session)` in the `Idle` state.
    /// * `Err(EngineError::InvalidConfig)` if `config` does not validate.
    pub fn new(config: EngineConfig, visuals: V) -> Result<Self> {
        config.validate()?;
        let board = Board::new(config.width, config.height)?;
        Ok(Session {
            config,
            board,
            visuals,
            state: SessionState::Idle,
            next_handle: 0,
            last_direction: None,
            settle_after: 0.0,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn visuals(&self) -> &V {
        &self.visuals
    }

    pub fn visuals_mut(&mut self) -> &mut V {
        &mut self.visuals
    }

    /// Seconds until every animation requested by the last move has finished.
    pub fn settle_after(&self) -> f32 {
        self.settle_after
    }

    fn allocate_handle(&mut self) -> TileHandle {
        let handle = TileHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn release_all(&mut self) {
        for handle in self.board.clear() {
            self.visuals.destroy(handle);
        }
    }

    fn force_idle(&mut self) {
        self.state = SessionState::Idle;
        self.last_direction = None;
        self.settle_after = 0.0;
    }

    /// Repopulates the board from `source` and runs one elimination pass.
    ///
    /// Every existing tile is destroyed first. A reset is allowed in any
    /// state and always leaves the session `Idle`.
    ///
    /// # Returns
    /// The positions cleared by the initial elimination pass.
    pub fn reset(&mut self, source: &mut impl TileSource) -> Vec<Pos> {
        self.release_all();
        self.force_idle();

        for x in 0..self.board.width() {
            for y in 0..self.board.height() {
                if let Some(tile) = source.next_tile() {
                    let handle = self.allocate_handle();
                    let pos = Pos::new(x, y);
                    self.board.put(pos, Slot::occupied(tile, handle));
                    self.visuals
                        .spawn(handle, tile, self.config.cell_to_world(pos));
                }
            }
        }

        let cleared = self.eliminate();
        info!(
            tiles = self.board.occupied_count(),
            cleared = cleared.len(),
            "board populated"
        );
        cleared
    }

    /// Replaces the board with `board`, spawning visuals for its tiles.
    ///
    /// Handles already on `board` are kept; new handles are allocated above
    /// the largest one seen. No elimination pass is run.
    ///
    /// # Returns
    /// `Err(EngineError::InvalidConfig)` if the board's dimensions differ
    /// from the configured ones.
    pub fn load_board(&mut self, board: Board) -> Result<()> {
        if board.width() != self.config.width || board.height() != self.config.height {
            return Err(EngineError::InvalidConfig(format!(
                "board is {}x{}, session expects {}x{}",
                board.width(),
                board.height(),
                self.config.width,
                self.config.height
            )));
        }
        self.release_all();
        self.force_idle();

        for (pos, tile, handle) in board.occupied() {
            self.visuals
                .spawn(handle, tile, self.config.cell_to_world(pos));
            self.next_handle = self.next_handle.max(handle.0 + 1);
        }
        self.board = board;
        debug!(tiles = self.board.occupied_count(), "board loaded");
        Ok(())
    }

    /// Applies a directional input.
    ///
    /// The input vector is interpreted like `movement::compute_move`: the zero
    /// vector is accepted as a no-op and leaves the session `Idle`; a
    /// diagonal keeps its horizontal component. Any other input moves the
    /// session to `Resolving` and `settle` must be called once the
    /// animations have had `settle_after` seconds to finish.
    ///
    /// # Returns
    /// * `Ok(MoveReport)` describing the accepted move.
    /// * `Err(EngineError::ConcurrentMoveRejected)` if a cycle is in flight.
    pub fn apply_direction(&mut self, dx: i32, dy: i32) -> Result<MoveReport> {
        if self.state != SessionState::Idle {
            warn!(state = ?self.state, dx, dy, "input rejected while busy");
            return Err(EngineError::ConcurrentMoveRejected { state: self.state });
        }

        let outcome = compute_move(&self.board, dx, dy, self.config.move_policy);
        let Some(direction) = outcome.direction else {
            return Ok(MoveReport::default());
        };

        self.state = SessionState::Resolving;
        self.last_direction = Some(direction);
        let (moved, late) = self.commit_move(outcome);
        Ok(MoveReport {
            direction: Some(direction),
            moved,
            late,
            settle_after: self.settle_after,
        })
    }

    /// Convenience wrapper over `apply_direction` for a typed direction.
    pub fn apply(&mut self, direction: Direction) -> Result<MoveReport> {
        let (dx, dy) = direction.delta();
        self.apply_direction(dx, dy)
    }

    // Adopts the resolved board, then requests the animations.
    fn commit_move(&mut self, outcome: MoveOutcome) -> (usize, usize) {
        self.board = outcome.board;

        let duration = self.config.move_duration;
        let mut late = 0;
        for tile_move in &outcome.moves {
            let target = self.config.cell_to_world(tile_move.to);
            if !self.visuals.request_move(tile_move.handle, target, duration) {
                debug!(handle = ?tile_move.handle, "tile still moving, it will settle late");
                late += 1;
            }
        }

        self.settle_after = if outcome.moves.is_empty() { 0.0 } else { duration };
        (outcome.moves.len(), late)
    }

    /// Finishes the cycle started by `apply_direction`.
    ///
    /// Runs the match resolver, clears the matched slots and destroys their
    /// visuals. With `cascade` enabled and something cleared, the last
    /// direction is applied again; if that moves any tile the session stays
    /// `Resolving` and `settle` must be called again.
    ///
    /// Calling `settle` while `Idle` does nothing.
    pub fn settle(&mut self) -> SettleReport {
        if self.state != SessionState::Resolving {
            debug!(state = ?self.state, "settle without a pending move");
            return SettleReport::default();
        }

        self.state = SessionState::Clearing;
        let cleared = self.eliminate();

        if self.config.cascade && !cleared.is_empty() {
            if let Some(direction) = self.last_direction {
                let outcome = resolve_move(&self.board, direction, self.config.move_policy);
                if !outcome.is_noop() {
                    self.state = SessionState::Resolving;
                    let (moved, late) = self.commit_move(outcome);
                    debug!(%direction, moved, late, "cascade move");
                    return SettleReport {
                        cleared,
                        cascading: true,
                        moved,
                        late,
                    };
                }
            }
        }

        self.force_idle();
        SettleReport {
            cleared,
            cascading: false,
            ..SettleReport::default()
        }
    }

    /// Runs a standalone elimination pass on the current board.
    ///
    /// Used after `load_board`, which does not eliminate on its own.
    ///
    /// # Returns
    /// * `Ok(positions)` cleared, possibly empty.
    /// * `Err(EngineError::ConcurrentMoveRejected)` unless the session is `Idle`.
    pub fn clear_matches(&mut self) -> Result<Vec<Pos>> {
        if self.state != SessionState::Idle {
            warn!(state = ?self.state, "clear rejected while busy");
            return Err(EngineError::ConcurrentMoveRejected { state: self.state });
        }
        Ok(self.eliminate())
    }

    /// Runs one match pass and removes what it finds.
    fn eliminate(&mut self) -> Vec<Pos> {
        let matches = compute_matches(&self.board, self.config.match_policy);
        // Matches come from this board, so every position is on it.
        let released = match apply_matches(&mut self.board, &matches) {
            Ok(released) => released,
            Err(err) => {
                error!(%err, "match set does not fit the board");
                return Vec::new();
            }
        };
        for handle in released {
            self.visuals.destroy(handle);
        }
        if !matches.is_empty() {
            debug!(cleared = matches.len(), "tiles eliminated");
        }
        matches.into_iter().collect()
    }
}
