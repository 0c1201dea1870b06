//! Scorched Earth - A turn-based artillery game on destructible terrain
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, ballistics, damage, turns)
//! - `renderer`: Render-surface interface and scene composition
//! - `platform`: Input commands and frame pacing
//! - `audio`: Sound effect requests
//! - `game`: Tick-driven loop tying the simulation to its collaborators

pub mod audio;
pub mod error;
pub mod game;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::GameError;
pub use game::{ExitReason, GameLoop};
pub use settings::Settings;

use glam::{IVec2, Vec2};

/// Game configuration constants
pub mod consts {
    use std::f32::consts::PI;

    /// Default play-field dimensions (pixels)
    pub const DISPLAY_WIDTH: u32 = 1600;
    pub const DISPLAY_HEIGHT: u32 = 900;

    /// Turn logic rate (ticks per second)
    pub const TURN_TICK_HZ: u32 = 15;
    /// Shell flight and explosion animation rate
    pub const FIRING_TICK_HZ: u32 = 60;

    /// Tank hull
    pub const TANK_WIDTH: i32 = 40;
    pub const TANK_HALF_WIDTH: i32 = TANK_WIDTH / 2;
    pub const TANK_HEIGHT: i32 = 12;
    pub const WHEEL_RADIUS: i32 = 5;
    /// Hull plus wheels: distance from the tank position to the ground it rests on
    pub const FULL_TANK_HEIGHT: i32 = TANK_HEIGHT + WHEEL_RADIUS;
    pub const TURRET_LENGTH: i32 = TANK_HALF_WIDTH + 5;
    /// Turret pivots slightly above the hull top
    pub const TURRET_PIVOT_LIFT: i32 = 2;

    /// Tank controls
    pub const MOVE_STEP: i32 = 3;
    pub const ANGLE_STEP: f32 = PI / 64.0;
    pub const POWER_STEP: i32 = 1;
    pub const INITIAL_TURRET_ANGLE: f32 = PI / 4.0;
    pub const INITIAL_TANK_HEALTH: i32 = 100;
    pub const INITIAL_TANK_POWER: i32 = 50;
    pub const MAX_TANK_POWER: i32 = 100;

    /// Tank placement
    pub const PLACEMENT_MARGIN: i32 = 5 + TANK_HALF_WIDTH;
    pub const MIN_TANK_SPACING: i32 = TANK_WIDTH + 10;
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 1000;

    /// Shell ballistics
    pub const MIN_SHELL_SPEED: f32 = 12.0;
    pub const MAX_SHELL_SPEED: f32 = 22.0;
    pub const SHELL_SPEED_STEP: f32 = (MAX_SHELL_SPEED - MIN_SHELL_SPEED) / 100.0;
    pub const GRAVITY: f32 = 10.0;
    pub const SHELL_TIME_STEP: f32 = 0.1;
    /// Upper bound on integration steps for a single shot
    pub const MAX_SHELL_STEPS: u32 = 5000;

    /// Explosions
    pub const SHELL_EXPLOSION_POWER: i32 = 20;
    pub const SHELL_EXPLOSION_RADIUS: f32 = 50.0;
    pub const TANK_EXPLOSION_POWER: i32 = 30;
    pub const TANK_EXPLOSION_RADIUS: f32 = 60.0;

    /// Animation lengths, in firing ticks
    pub const EXPLOSION_FRAMES: u32 = 20;
    pub const SLOUGH_FRAMES: u32 = 30;

    /// Terrain generation
    pub const TERRAIN_CONTROL_POINTS: usize = 11;

    /// Health bars (screen layout)
    pub const HEALTH_BAR_LENGTH: i32 = 100;
    pub const HEALTH_BAR_HEIGHT: i32 = 25;
    pub const HEALTH_BAR_GAP: i32 = 10;
    pub const HEALTH_BAR_MARGIN: i32 = 10;
}

/// Convert an integer pixel position to float space for geometry
#[inline]
pub fn to_vec2(p: IVec2) -> Vec2 {
    Vec2::new(p.x as f32, p.y as f32)
}

/// Snap a float position to the nearest pixel
#[inline]
pub fn to_pixel(p: Vec2) -> IVec2 {
    p.round().as_ivec2()
}
