//! Shell ballistics
//!
//! A shell is integrated with a fixed time step. Each step moves the shell by
//! its current velocity times the elapsed flight time, truncated to whole
//! pixels, and checks the travelled segment against every tank hull (roster
//! order), then the terrain, then the field floor.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::geometry::Segment;
use super::player::Player;
use super::state::{Color, Impact, ImpactTarget};
use super::terrain::Terrain;
use crate::audio::SoundEffect;
use crate::consts::*;

/// Everything needed to launch a shell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireRequest {
    pub power: i32,
    /// Radians from vertical, negative aims left
    pub angle: f32,
    pub muzzle: IVec2,
    pub color: Color,
    pub sound: SoundEffect,
}

impl FireRequest {
    /// Launch speed in pixels per unit time, linear in power
    #[inline]
    pub fn launch_speed(&self) -> f32 {
        MIN_SHELL_SPEED + SHELL_SPEED_STEP * self.power as f32
    }
}

/// One integration step of a shell in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellStep {
    pub position: IVec2,
    pub impact: Option<Impact>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shell {
    position: IVec2,
    angle: f32,
    speed: f32,
    elapsed: f32,
    steps: u32,
    finished: bool,
}

impl Shell {
    pub fn launch(request: &FireRequest) -> Self {
        Self {
            position: request.muzzle,
            angle: request.angle,
            speed: request.launch_speed(),
            elapsed: SHELL_TIME_STEP,
            steps: 0,
            finished: false,
        }
    }

    #[inline]
    pub fn position(&self) -> IVec2 {
        self.position
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Velocity at the current flight time (screen space, y down)
    pub fn velocity(&self) -> Vec2 {
        Vec2::new(
            self.speed * self.angle.sin(),
            -(self.speed * self.angle.cos() - GRAVITY * self.elapsed / 2.0),
        )
    }

    /// Advance one step.
    ///
    /// Returns `None` once the shell has hit something, dropped below the
    /// field, left it sideways or run out of steps.
    pub fn step(&mut self, terrain: &Terrain, players: &[Player]) -> Option<ShellStep> {
        if self.finished {
            return None;
        }

        let previous = self.position;
        let travel = self.velocity() * self.elapsed;
        self.position += IVec2::new(travel.x as i32, travel.y as i32);
        self.elapsed += SHELL_TIME_STEP;
        self.steps += 1;

        let segment = Segment::from_pixels(previous, self.position);
        if let Some(impact) = find_impact(&segment, terrain, players) {
            self.finished = true;
            return Some(ShellStep {
                position: self.position,
                impact: Some(impact),
            });
        }

        let width = terrain.width() as i32;
        if self.position.y > terrain.field_height()
            || self.position.x < 0
            || self.position.x >= width
            || self.steps >= MAX_SHELL_STEPS
        {
            self.finished = true;
            return None;
        }

        Some(ShellStep {
            position: self.position,
            impact: None,
        })
    }
}

/// First thing a step segment runs into: tanks in roster order, then ground
pub fn find_impact(segment: &Segment, terrain: &Terrain, players: &[Player]) -> Option<Impact> {
    if segment.is_degenerate() {
        return None;
    }
    for player in players {
        if let Some((tank, point)) = player.check_collision_with_tanks(segment) {
            return Some(Impact {
                point,
                target: ImpactTarget::Tank {
                    player: player.index,
                    tank,
                },
            });
        }
    }
    terrain.collide_segment(segment)
}

/// Lazy shell flight over a fixed field
pub struct Trajectory<'a> {
    shell: Shell,
    terrain: &'a Terrain,
    players: &'a [Player],
}

impl Trajectory<'_> {
    /// Last position the shell reached
    pub fn position(&self) -> IVec2 {
        self.shell.position()
    }
}

impl Iterator for Trajectory<'_> {
    type Item = ShellStep;

    fn next(&mut self) -> Option<ShellStep> {
        self.shell.step(self.terrain, self.players)
    }
}

/// Fire a shell; the trajectory ends after the impact step, or without one
/// when the shell is wasted
pub fn fire<'a>(request: &FireRequest, terrain: &'a Terrain, players: &'a [Player]) -> Trajectory<'a> {
    Trajectory {
        shell: Shell::launch(request),
        terrain,
        players,
    }
}
