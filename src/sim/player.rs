//! Players and their tank rosters

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::geometry::Segment;
use super::state::{Color, GameEvent};
use super::tank::Tank;
use super::terrain::Terrain;
use crate::consts::*;

/// A tank that moved to new footing after terrain settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reseat {
    pub tank: u32,
    pub from_y: i32,
    pub to_y: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub index: usize,
    pub color: Color,
    /// Surviving tanks in their original order
    pub tanks: Vec<Tank>,
    /// Tank that takes this player's next turn
    next_tank: Option<u32>,
    in_game: bool,
}

impl Player {
    pub fn new(index: usize, color: Color) -> Self {
        Self {
            index,
            color,
            tanks: Vec::new(),
            next_tank: None,
            in_game: false,
        }
    }

    pub fn add_tank(&mut self, tank: Tank) {
        if self.next_tank.is_none() {
            self.next_tank = Some(tank.id);
        }
        self.tanks.push(tank);
        self.in_game = true;
    }

    /// True while the player has at least one tank
    #[inline]
    pub fn is_in_game(&self) -> bool {
        self.in_game
    }

    pub fn tank(&self, id: u32) -> Option<&Tank> {
        self.tanks.iter().find(|t| t.id == id)
    }

    pub fn tank_mut(&mut self, id: u32) -> Option<&mut Tank> {
        self.tanks.iter_mut().find(|t| t.id == id)
    }

    /// Tank queued for this player's next turn, without advancing
    pub fn peek_next_tank(&self) -> Option<u32> {
        self.next_tank
    }

    /// Hand out the queued tank and queue the one after it
    pub fn next_active_tank(&mut self) -> Option<u32> {
        let current = self.next_tank?;
        let index = self.tanks.iter().position(|t| t.id == current)?;
        self.next_tank = Some(self.tanks[(index + 1) % self.tanks.len()].id);
        Some(current)
    }

    /// First of this player's hulls the segment crosses
    pub fn check_collision_with_tanks(&self, segment: &Segment) -> Option<(u32, IVec2)> {
        self.tanks
            .iter()
            .find_map(|tank| tank.check_collision(segment).map(|point| (tank.id, point)))
    }

    /// Damage every tank in roster order; returns the tanks destroyed by this
    /// explosion with their positions
    pub fn apply_damage(
        &mut self,
        point: IVec2,
        power: i32,
        radius: f32,
        events: &mut Vec<GameEvent>,
    ) -> Vec<(u32, IVec2)> {
        let mut destroyed = Vec::new();
        for tank in &mut self.tanks {
            let before = tank.health;
            let killed = tank.apply_damage(point, power, radius);
            if tank.health < before {
                events.push(GameEvent::TankDamaged {
                    player: self.index,
                    tank: tank.id,
                    damage: before - tank.health,
                    health: tank.health,
                });
            }
            if killed {
                destroyed.push((tank.id, tank.position));
            }
        }
        destroyed
    }

    /// Drop dead tanks from the roster.
    ///
    /// If the queued tank died the queue moves on to the next survivor in the
    /// original order, wrapping around.
    pub fn remove_destroyed(&mut self) -> Vec<Tank> {
        if self.tanks.iter().all(Tank::is_alive) {
            return Vec::new();
        }

        if let Some(queued) = self.next_tank {
            let order: Vec<(u32, bool)> = self.tanks.iter().map(|t| (t.id, t.is_alive())).collect();
            let start = order.iter().position(|&(id, _)| id == queued).unwrap_or(0);
            self.next_tank = (0..order.len())
                .map(|k| order[(start + k) % order.len()])
                .find(|&(_, alive)| alive)
                .map(|(id, _)| id);
        }

        let (alive, dead): (Vec<Tank>, Vec<Tank>) =
            std::mem::take(&mut self.tanks).into_iter().partition(Tank::is_alive);
        self.tanks = alive;
        if self.tanks.is_empty() {
            self.next_tank = None;
            self.in_game = false;
        }
        dead
    }

    /// Seat every tank on the mean ground under it and level its footprint
    pub fn reseat_tanks(&mut self, terrain: &mut Terrain) -> Vec<Reseat> {
        let mut moved = Vec::new();
        for tank in &mut self.tanks {
            let (left, right) = tank.footprint();
            let ground = terrain.average_height(left, right);
            let from_y = tank.settle_onto(ground);
            terrain.correct_height_range(left, right, ground);
            if from_y != tank.position.y {
                moved.push(Reseat {
                    tank: tank.id,
                    from_y,
                    to_y: tank.position.y,
                });
            }
        }
        moved
    }
}

/// Ground level a tank centred on `x` should rest on
pub fn seat_height(terrain: &Terrain, x: i32) -> i32 {
    terrain.average_height(x - TANK_HALF_WIDTH, x + TANK_HALF_WIDTH)
}

/// Screen slot for a tank's health bar.
///
/// Even players fill rows from the top-left corner rightward, odd players from
/// the top-right corner leftward; each pair of players gets its own row.
pub fn health_bar_slot(player_index: usize, tank_index: usize, field_width: i32) -> IVec2 {
    let row = (player_index / 2) as i32;
    let y = HEALTH_BAR_MARGIN + row * (HEALTH_BAR_HEIGHT + HEALTH_BAR_GAP);
    let offset = tank_index as i32 * (HEALTH_BAR_LENGTH + HEALTH_BAR_GAP);
    let x = if player_index % 2 == 0 {
        HEALTH_BAR_MARGIN + offset
    } else {
        field_width - HEALTH_BAR_MARGIN - HEALTH_BAR_LENGTH - offset
    };
    IVec2::new(x, y)
}
