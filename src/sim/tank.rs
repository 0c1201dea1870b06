//! Tank entity
//!
//! `position` is the top-centre of the hull. The hull box spans
//! `TANK_WIDTH` x `TANK_HEIGHT` below it and the wheels add `WHEEL_RADIUS`,
//! so a tank resting on ground `g` has `position.y == g - FULL_TANK_HEIGHT`.

use std::f32::consts::FRAC_PI_2;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::geometry::{Segment, segment_intersection};
use super::projectile::FireRequest;
use super::state::Color;
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::{to_pixel, to_vec2};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    pub id: u32,
    pub position: IVec2,
    /// 0..=100, never increases within a round
    pub health: i32,
    /// Radians from vertical, negative aims left
    pub turret_angle: f32,
    /// 0..=100, scales shell launch speed
    pub power: i32,
    pub color: Color,
    /// Screen position of this tank's health bar
    pub health_bar_slot: IVec2,
}

impl Tank {
    pub fn new(id: u32, position: IVec2, color: Color, health_bar_slot: IVec2) -> Self {
        Self {
            id,
            position,
            health: INITIAL_TANK_HEALTH,
            turret_angle: INITIAL_TURRET_ANGLE,
            power: INITIAL_TANK_POWER,
            color,
            health_bar_slot,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Columns under the hull, as a half-open range
    #[inline]
    pub fn footprint(&self) -> (i32, i32) {
        (
            self.position.x - TANK_HALF_WIDTH,
            self.position.x + TANK_HALF_WIDTH,
        )
    }

    /// Hull edges in test order: top, left, right, bottom
    pub fn hull_edges(&self) -> [Segment; 4] {
        let (left, right) = self.footprint();
        let top = self.position.y;
        let bottom = self.position.y + TANK_HEIGHT;
        let top_left = IVec2::new(left, top);
        let top_right = IVec2::new(right, top);
        let bottom_left = IVec2::new(left, bottom);
        let bottom_right = IVec2::new(right, bottom);
        [
            Segment::from_pixels(top_left, top_right),
            Segment::from_pixels(top_left, bottom_left),
            Segment::from_pixels(top_right, bottom_right),
            Segment::from_pixels(bottom_left, bottom_right),
        ]
    }

    /// First hull edge the segment crosses
    pub fn check_collision(&self, segment: &Segment) -> Option<IVec2> {
        self.hull_edges()
            .iter()
            .find_map(|edge| segment_intersection(segment, edge))
            .map(to_pixel)
    }

    pub fn distance_to(&self, point: IVec2) -> f32 {
        to_vec2(self.position).distance(to_vec2(point))
    }

    /// Apply an explosion; true only on the call that takes health to zero
    pub fn apply_damage(&mut self, point: IVec2, power: i32, radius: f32) -> bool {
        if !self.is_alive() {
            return false;
        }
        let damage = explosion_damage(self.distance_to(point), power, radius);
        self.health = (self.health - damage).max(0);
        self.health == 0
    }

    pub fn update_turret_angle(&mut self, delta: f32) {
        self.turret_angle = (self.turret_angle + delta).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    pub fn update_power(&mut self, delta: i32) {
        self.power = (self.power + delta).clamp(0, MAX_TANK_POWER);
    }

    /// Drive sideways, staying fully inside the field
    pub fn update_position_x(&mut self, delta: i32, field_width: i32) {
        let max_x = (field_width - TANK_HALF_WIDTH).max(TANK_HALF_WIDTH);
        self.position.x = (self.position.x + delta).clamp(TANK_HALF_WIDTH, max_x);
    }

    /// Rest the wheels on `ground_y`; returns the previous hull top
    pub fn settle_onto(&mut self, ground_y: i32) -> i32 {
        let previous = self.position.y;
        self.position.y = ground_y - FULL_TANK_HEIGHT;
        previous
    }

    /// Ground level the tank currently rests on
    #[inline]
    pub fn ground_y(&self) -> i32 {
        self.position.y + FULL_TANK_HEIGHT
    }

    #[inline]
    pub fn turret_pivot(&self) -> IVec2 {
        IVec2::new(self.position.x, self.position.y - TURRET_PIVOT_LIFT)
    }

    /// Tip of the turret, where shells leave
    pub fn muzzle(&self) -> IVec2 {
        let pivot = self.turret_pivot();
        let reach = Vec2::new(self.turret_angle.sin(), self.turret_angle.cos()) * TURRET_LENGTH as f32;
        IVec2::new(pivot.x + reach.x as i32, pivot.y - reach.y as i32)
    }

    pub fn fire_request(&self) -> FireRequest {
        FireRequest {
            power: self.power,
            angle: self.turret_angle,
            muzzle: self.muzzle(),
            color: self.color,
            sound: SoundEffect::Fire,
        }
    }
}

/// Area damage at `distance` from an explosion centre.
///
/// Zero at or beyond `radius`, `power` at the centre, linear in between and
/// rounded to whole hit points.
pub fn explosion_damage(distance: f32, power: i32, radius: f32) -> i32 {
    if radius <= 0.0 || power <= 0 || distance >= radius {
        return 0;
    }
    let falloff = (radius - distance.max(0.0)) / radius;
    ((falloff * power as f32).round() as i32).clamp(0, power)
}
