//! Presentation helpers shared by render surfaces
//!
//! Pure functions: no surface state, only the numbers an animation frame needs.

use std::f32::consts::PI;

use crate::consts::{HEALTH_BAR_LENGTH, INITIAL_TANK_HEALTH};
use crate::sim::{Color, SloughColumn};

/// Health bar tint bands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthLevel {
    Good,
    Normal,
    Low,
}

impl HealthLevel {
    pub fn from_health(health: i32) -> Self {
        if health > 65 {
            HealthLevel::Good
        } else if health > 40 {
            HealthLevel::Normal
        } else {
            HealthLevel::Low
        }
    }

    pub fn color(self) -> Color {
        match self {
            HealthLevel::Good => Color::GREEN,
            HealthLevel::Normal => Color::ORANGE,
            HealthLevel::Low => Color::RED,
        }
    }
}

/// Filled width of a health bar in pixels
pub fn health_bar_fill(health: i32) -> i32 {
    health.clamp(0, INITIAL_TANK_HEALTH) * HEALTH_BAR_LENGTH / INITIAL_TANK_HEALTH
}

/// Radius of an explosion on animation frame `frame` of `frames`.
///
/// The blast grows to full size over the first half and shrinks away over the
/// second.
pub fn explosion_frame_radius(radius: f32, frame: u32, frames: u32) -> f32 {
    if frames == 0 || radius <= 0.0 {
        return 0.0;
    }
    if frame >= frames {
        return 0.0;
    }
    let t = frame as f32 / frames as f32;
    (radius * (t * PI).sin()).max(0.0)
}

/// Top of a falling debris column on frame `frame` of `frames`; reaches the
/// landing position on the last frame
pub fn debris_top(column: &SloughColumn, frame: u32, frames: u32) -> i32 {
    if frames == 0 || frame >= frames {
        return column.top + column.fall_distance();
    }
    let t = frame as f32 / frames as f32;
    // Accelerating fall
    column.top + (column.fall_distance() as f32 * t * t).round() as i32
}
