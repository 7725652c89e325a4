//! Collaborator interfaces between the engine and the presentation layer.
//!
//! The engine never renders anything. It announces new tiles, asks for tiles
//! to travel to a world position over a duration, and asks for removed tiles
//! to be destroyed. What a `TileHandle` denotes is up to the implementor.
//!
//! `RecordingVisuals` is a headless implementation that tracks in-flight
//! moves on a simulated clock; the binaries and tests drive sessions with it.
use std::collections::BTreeMap;

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::board::{TileHandle, TileType};

/// Creates the visual entity for a newly placed tile.
pub trait VisualSpawner {
    fn spawn(&mut self, handle: TileHandle, tile: TileType, at: Vec2);
}

/// Animates a tile toward a world position.
pub trait VisualMover {
    /// Starts moving `handle` to `target` over `duration` seconds.
    ///
    /// Returns `false` if the handle is still mid-move. The engine treats that
    /// as "this tile settles later than the rest of the batch", not as an error.
    fn request_move(&mut self, handle: TileHandle, target: Vec2, duration: f32) -> bool;
}

/// Removes the visual entity of an eliminated tile. Fire-and-forget.
pub trait VisualRemover {
    fn destroy(&mut self, handle: TileHandle);
}

/// Everything a session needs from the presentation layer.
pub trait Visuals: VisualSpawner + VisualMover + VisualRemover {}

impl<T: VisualSpawner + VisualMover + VisualRemover> Visuals for T {}

/// Supplies tile types during board population. `None` leaves the slot empty.
pub trait TileSource {
    fn next_tile(&mut self) -> Option<TileType>;
}

/// Uniform draw over the palette plus one extra "empty" outcome.
#[derive(Clone, Debug)]
pub struct RandomTileSource {
    rng: SmallRng,
    palette_size: u8,
}

impl RandomTileSource {
    /// Creates a seeded source. The same seed always yields the same sequence.
    pub fn with_seed(palette_size: u8, seed: u64) -> Self {
        RandomTileSource {
            rng: SmallRng::seed_from_u64(seed),
            palette_size,
        }
    }

    /// Creates a source seeded from OS entropy.
    pub fn from_entropy(palette_size: u8) -> Self {
        RandomTileSource {
            rng: SmallRng::from_entropy(),
            palette_size,
        }
    }
}

impl TileSource for RandomTileSource {
    fn next_tile(&mut self) -> Option<TileType> {
        // `palette_size` itself stands for "empty".
        let draw = self.rng.gen_range(0..=self.palette_size);
        if draw == self.palette_size {
            None
        } else {
            Some(TileType(draw))
        }
    }
}

/// Replays a fixed list of draws, cycling when it runs out.
#[derive(Clone, Debug)]
pub struct SequenceTileSource {
    draws: Vec<Option<TileType>>,
    next: usize,
}

impl SequenceTileSource {
    pub fn new(draws: Vec<Option<TileType>>) -> Self {
        SequenceTileSource { draws, next: 0 }
    }
}

impl TileSource for SequenceTileSource {
    fn next_tile(&mut self) -> Option<TileType> {
        if self.draws.is_empty() {
            return None;
        }
        let draw = self.draws[self.next % self.draws.len()];
        self.next += 1;
        draw
    }
}

/// Something the engine asked the presentation layer to do.
#[derive(Clone, Debug, PartialEq)]
pub enum VisualEvent {
    Spawned {
        handle: TileHandle,
        tile: TileType,
        at: Vec2,
    },
    MoveStarted {
        handle: TileHandle,
        target: Vec2,
        duration: f32,
    },
    /// The handle was already moving; the request was refused.
    MoveRefused { handle: TileHandle },
    Destroyed { handle: TileHandle },
}

#[derive(Clone, Copy, Debug)]
struct Flight {
    target: Vec2,
    remaining: f32,
}

/// Headless visuals: records every request and simulates travel time.
///
/// Positions jump to the target once `advance` has covered the duration of a
/// move; until then the handle counts as busy and further moves are refused.
#[derive(Clone, Debug, Default)]
pub struct RecordingVisuals {
    events: Vec<VisualEvent>,
    positions: BTreeMap<TileHandle, Vec2>,
    in_flight: BTreeMap<TileHandle, Flight>,
}

impl RecordingVisuals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[VisualEvent] {
        &self.events
    }

    /// Returns and forgets the recorded events.
    pub fn drain_events(&mut self) -> Vec<VisualEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current world position of a live handle.
    pub fn position(&self, handle: TileHandle) -> Option<Vec2> {
        self.positions.get(&handle).copied()
    }

    pub fn live_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_moving(&self, handle: TileHandle) -> bool {
        self.in_flight.contains_key(&handle)
    }

    /// Returns `true` once every requested move has finished.
    pub fn is_settled(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Advances the simulated clock by `dt` seconds, landing finished moves.
    pub fn advance(&mut self, dt: f32) {
        let mut landed = Vec::new();
        for (handle, flight) in self.in_flight.iter_mut() {
            flight.remaining -= dt;
            if flight.remaining <= 0.0 {
                landed.push((*handle, flight.target));
            }
        }
        for (handle, target) in landed {
            self.in_flight.remove(&handle);
            self.positions.insert(handle, target);
        }
    }
}

impl VisualSpawner for RecordingVisuals {
    fn spawn(&mut self, handle: TileHandle, tile: TileType, at: Vec2) {
        self.positions.insert(handle, at);
        self.events.push(VisualEvent::Spawned { handle, tile, at });
    }
}

impl VisualMover for RecordingVisuals {
    fn request_move(&mut self, handle: TileHandle, target: Vec2, duration: f32) -> bool {
        if self.in_flight.contains_key(&handle) {
            self.events.push(VisualEvent::MoveRefused { handle });
            return false;
        }
        self.in_flight.insert(
            handle,
            Flight {
                target,
                remaining: duration,
            },
        );
        self.events.push(VisualEvent::MoveStarted {
            handle,
            target,
            duration,
        });
        true
    }
}

impl VisualRemover for RecordingVisuals {
    fn destroy(&mut self, handle: TileHandle) {
        self.positions.remove(&handle);
        self.in_flight.remove(&handle);
        self.events.push(VisualEvent::Destroyed { handle });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_source_is_deterministic() {
        let mut a = RandomTileSource::with_seed(4, 514514);
        let mut b = RandomTileSource::with_seed(4, 514514);
        let draws_a: Vec<_> = (0..50).map(|_| a.next_tile()).collect();
        let draws_b: Vec<_> = (0..50).map(|_| b.next_tile()).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn test_random_source_covers_palette_and_empty() {
        let mut source = RandomTileSource::with_seed(3, 7);
        let mut seen_empty = false;
        let mut seen = [false; 3];
        for _ in 0..500 {
            match source.next_tile() {
                None => seen_empty = true,
                Some(TileType(t)) => {
                    assert!(t < 3, "tile type {} outside palette", t);
                    seen[t as usize] = true;
                }
            }
        }
        assert!(seen_empty);
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_sequence_source_cycles() {
        let mut source = SequenceTileSource::new(vec![Some(TileType(1)), None]);
        assert_eq!(source.next_tile(), Some(TileType(1)));
        assert_eq!(source.next_tile(), None);
        assert_eq!(source.next_tile(), Some(TileType(1)));

        let mut empty = SequenceTileSource::new(Vec::new());
        assert_eq!(empty.next_tile(), None);
    }

    #[test]
    fn test_recording_visuals_refuses_busy_handle() {
        let mut visuals = RecordingVisuals::new();
        let h = TileHandle(1);
        visuals.spawn(h, TileType(0), Vec2::ZERO);

        assert!(visuals.request_move(h, Vec2::new(2.0, 0.0), 0.3));
        assert!(visuals.is_moving(h));
        assert!(!visuals.request_move(h, Vec2::new(3.0, 0.0), 0.3));
        assert_eq!(
            visuals.events().last(),
            Some(&VisualEvent::MoveRefused { handle: h })
        );

        visuals.advance(0.1);
        assert_eq!(visuals.position(h), Some(Vec2::ZERO));
        visuals.advance(0.25);
        assert!(visuals.is_settled());
        assert_eq!(visuals.position(h), Some(Vec2::new(2.0, 0.0)));
    }

    #[test]
    fn test_recording_visuals_destroy() {
        let mut visuals = RecordingVisuals::new();
        visuals.spawn(TileHandle(1), TileType(0), Vec2::ZERO);
        visuals.spawn(TileHandle(2), TileType(1), Vec2::X);
        visuals.request_move(TileHandle(2), Vec2::ZERO, 1.0);

        visuals.destroy(TileHandle(2));
        assert_eq!(visuals.live_count(), 1);
        assert!(visuals.is_settled());
        assert_eq!(visuals.drain_events().len(), 4);
        assert!(visuals.events().is_empty());
    }
}
