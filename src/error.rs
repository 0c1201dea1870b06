//! Crate error type
//!
//! Only configuration problems are errors. Missed shots, empty explosions and
//! exhausted placement attempts are normal outcomes handled in the simulation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("player count must be at least 1 (got {0})")]
    InvalidPlayerCount(u32),

    #[error("tanks per player must be at least 1 (got {0})")]
    InvalidTankCount(u32),

    #[error("{requested} players requested but only {available} distinct colors exist")]
    TooManyPlayers { requested: u32, available: usize },

    #[error("invalid play field {width}x{height}")]
    InvalidField { width: u32, height: u32 },

    #[error("terrain range {min}..={max} does not fit a field of height {height}")]
    InvalidTerrainRange { min: i32, max: i32, height: u32 },

    #[error("{tanks} tanks cannot be spaced across a field {width} wide")]
    FieldTooCrowded { tanks: u32, width: u32 },

    #[error("malformed settings: {0}")]
    Settings(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
