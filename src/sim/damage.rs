//! Explosion damage resolution
//!
//! A shell impact starts a chain: the explosion carves the terrain and damages
//! every tank, each tank it destroys blows up in turn, and so on. Explosions are
//! processed from a FIFO worklist. Terrain cut loose along the way is held back
//! until `settle`, when it lands and the surviving tanks are re-seated.

use std::collections::VecDeque;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::player::Player;
use super::state::{Explosion, ExplosionSource, GameEvent, Impact};
use super::terrain::{SloughColumn, Terrain};
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResolverPhase {
    #[default]
    Idle,
    /// An explosion is carving the terrain
    ImpactReceived,
    /// Tanks have taken damage from the current explosion
    TankDamageApplied,
    /// All explosions are done; loose terrain is waiting to land
    PendingSettle,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DamageResolver {
    phase: ResolverPhase,
    worklist: VecDeque<Explosion>,
    sloughing: Vec<SloughColumn>,
}

impl DamageResolver {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn phase(&self) -> ResolverPhase {
        self.phase
    }

    /// Loose terrain reported so far, not yet landed
    pub fn pending_sloughing(&self) -> &[SloughColumn] {
        &self.sloughing
    }

    /// Run a shell impact and every chained wreck explosion to completion.
    ///
    /// Returns the number of explosions processed. The resolver is left in
    /// `PendingSettle`; call `settle` to land the debris.
    pub fn resolve(
        &mut self,
        impact: &Impact,
        terrain: &mut Terrain,
        players: &mut [Player],
        events: &mut Vec<GameEvent>,
    ) -> usize {
        self.worklist.push_back(Explosion {
            point: impact.point,
            power: SHELL_EXPLOSION_POWER,
            radius: SHELL_EXPLOSION_RADIUS,
            source: ExplosionSource::Shell(impact.target),
        });

        let mut processed = 0;
        while let Some(explosion) = self.worklist.pop_front() {
            processed += 1;
            self.explode(explosion, terrain, players, events);
        }

        self.phase = ResolverPhase::PendingSettle;
        if !self.sloughing.is_empty() {
            events.push(GameEvent::Sloughing {
                columns: self.sloughing.clone(),
            });
        }
        processed
    }

    fn explode(
        &mut self,
        explosion: Explosion,
        terrain: &mut Terrain,
        players: &mut [Player],
        events: &mut Vec<GameEvent>,
    ) {
        events.push(GameEvent::Explosion(explosion));
        if explosion.is_degenerate() {
            return;
        }
        debug!(
            "explosion at {:?} power {} radius {} ({:?})",
            explosion.point, explosion.power, explosion.radius, explosion.source
        );

        self.phase = ResolverPhase::ImpactReceived;
        self.sloughing
            .extend(terrain.apply_explosion(explosion.point, explosion.radius));

        for player in players.iter_mut() {
            let destroyed =
                player.apply_damage(explosion.point, explosion.power, explosion.radius, events);
            for (tank, position) in destroyed {
                debug!("player {} tank {tank} destroyed at {position:?}", player.index);
                events.push(GameEvent::TankDestroyed {
                    player: player.index,
                    tank,
                    position,
                });
                self.worklist.push_back(Explosion {
                    point: position,
                    power: TANK_EXPLOSION_POWER,
                    radius: TANK_EXPLOSION_RADIUS,
                    source: ExplosionSource::Wreck {
                        player: player.index,
                        tank,
                    },
                });
            }

            let was_in_game = player.is_in_game();
            player.remove_destroyed();
            if was_in_game && !player.is_in_game() {
                info!("player {} eliminated", player.index);
                events.push(GameEvent::PlayerEliminated {
                    player: player.index,
                });
            }
        }
        self.phase = ResolverPhase::TankDamageApplied;
    }

    /// Land pending debris and re-seat every surviving tank
    pub fn settle(
        &mut self,
        terrain: &mut Terrain,
        players: &mut [Player],
        events: &mut Vec<GameEvent>,
    ) {
        terrain.settle_columns(&self.sloughing);
        self.sloughing.clear();

        for player in players.iter_mut() {
            for moved in player.reseat_tanks(terrain) {
                events.push(GameEvent::TankSettled {
                    player: player.index,
                    tank: moved.tank,
                    from_y: moved.from_y,
                    to_y: moved.to_y,
                });
            }
        }
        self.phase = ResolverPhase::Idle;
    }
}
