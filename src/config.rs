//! Engine configuration.
//!
//! `EngineConfig` collects every recognised option. It deserialises from JSON
//! with missing fields filled from `Default`, and the binaries layer clap
//! arguments on top of it. Call `validate` before building a session;
//! `Session::new` does so itself.
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::board::Pos;
use crate::error::{EngineError, Result};
use crate::matching::MatchPolicy;
use crate::movement::MovePolicy;

/// Largest palette that still renders as single digits in text fixtures.
pub const MAX_PALETTE_SIZE: u8 = 10;

/// Board size, palette, resolver policies and animation timing for a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Board width in cells.
    pub width: usize,
    /// Board height in cells.
    pub height: usize,
    /// Number of distinct tile types.
    pub palette_size: u8,
    pub move_policy: MovePolicy,
    pub match_policy: MatchPolicy,
    /// Seconds a tile takes to reach its target.
    pub move_duration: f32,
    /// World-space size of one cell.
    pub cell_size: Vec2,
    /// Re-apply the last direction after every clear until nothing matches.
    pub cascade: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            width: 6,
            height: 5,
            palette_size: 4,
            move_policy: MovePolicy::AllToEnd,
            match_policy: MatchPolicy::Connected3,
            move_duration: 0.3,
            cell_size: Vec2::ONE,
            cascade: false,
        }
    }
}

impl EngineConfig {
    /// Checks every option against its accepted range.
    ///
    /// # Returns
    /// * `Ok(())` if the configuration is usable.
    /// * `Err(EngineError::InvalidConfig)` naming the first offending option.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidConfig(format!(
                "board dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.palette_size == 0 || self.palette_size > MAX_PALETTE_SIZE {
            return Err(EngineError::InvalidConfig(format!(
                "palette size must be between 1 and {}, got {}",
                MAX_PALETTE_SIZE, self.palette_size
            )));
        }
        // Written so that NaN fails too.
        if !(self.move_duration > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "move duration must be positive, got {}",
                self.move_duration
            )));
        }
        if !(self.cell_size.x > 0.0 && self.cell_size.y > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "cell size must be positive, got {}",
                self.cell_size
            )));
        }
        Ok(())
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Examples
    /// ```
    /// use slide_match::config::EngineConfig;
    /// use slide_match::movement::MovePolicy;
    ///
    /// let config = EngineConfig::from_json_str(r#"{"width": 8, "move_policy": "RowToEnd"}"#).unwrap();
    /// assert_eq!(config.width, 8);
    /// assert_eq!(config.height, 5);
    /// assert_eq!(config.move_policy, MovePolicy::RowToEnd);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidConfig(format!("malformed JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Converts a cell coordinate to its world-space position.
    pub fn cell_to_world(&self, pos: Pos) -> Vec2 {
        Vec2::new(pos.x as f32, pos.y as f32) * self.cell_size
    }
}
