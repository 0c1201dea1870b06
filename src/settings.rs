//! Match settings
//!
//! Supplied in memory by whoever starts the game; there are no command-line
//! flags. Serializable so a front end can keep them between sessions.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{GameError, Result};
use crate::sim::state::PLAYER_PALETTE;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Match ===
    /// Number of players taking turns
    pub player_count: u32,
    /// Tanks each player starts a round with
    pub tanks_per_player: u32,
    /// RNG seed for terrain, colors and placement
    pub seed: u64,

    // === Field ===
    pub field_width: u32,
    pub field_height: u32,
    /// Highest ground surface allowed at generation (smallest y)
    pub terrain_min_y: i32,
    /// Lowest ground surface allowed at generation (largest y)
    pub terrain_max_y: i32,

    // === Pacing ===
    pub turn_tick_hz: u32,
    pub firing_tick_hz: u32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_count: 2,
            tanks_per_player: 2,
            seed: 0,

            field_width: DISPLAY_WIDTH,
            field_height: DISPLAY_HEIGHT,
            terrain_min_y: (DISPLAY_HEIGHT as i32) * 9 / 20,
            terrain_max_y: (DISPLAY_HEIGHT as i32) * 9 / 10,

            turn_tick_hz: TURN_TICK_HZ,
            firing_tick_hz: FIRING_TICK_HZ,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Total tanks on the field at round start
    pub fn total_tanks(&self) -> u32 {
        self.player_count.saturating_mul(self.tanks_per_player)
    }

    /// Check the settings can produce a playable round
    pub fn validate(&self) -> Result<()> {
        if self.player_count == 0 {
            return Err(GameError::InvalidPlayerCount(self.player_count));
        }
        if self.player_count as usize > PLAYER_PALETTE.len() {
            return Err(GameError::TooManyPlayers {
                requested: self.player_count,
                available: PLAYER_PALETTE.len(),
            });
        }
        if self.tanks_per_player == 0 {
            return Err(GameError::InvalidTankCount(self.tanks_per_player));
        }
        let min_width = (2 * PLACEMENT_MARGIN) as u32;
        if self.field_width <= min_width || self.field_height == 0 {
            return Err(GameError::InvalidField {
                width: self.field_width,
                height: self.field_height,
            });
        }
        if self.terrain_min_y < 0
            || self.terrain_min_y > self.terrain_max_y
            || self.terrain_max_y > self.field_height as i32
        {
            return Err(GameError::InvalidTerrainRange {
                min: self.terrain_min_y,
                max: self.terrain_max_y,
                height: self.field_height,
            });
        }
        // The evenly spaced fallback must be able to seat every tank
        let tanks = self.total_tanks();
        let spacing = self.field_width / tanks.saturating_add(1);
        if spacing < MIN_TANK_SPACING as u32 {
            return Err(GameError::FieldTooCrowded {
                tanks,
                width: self.field_width,
            });
        }
        Ok(())
    }

    /// Parse and validate settings from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
