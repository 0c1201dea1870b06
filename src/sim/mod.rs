//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed time step shell integration
//! - Seeded RNG only, owned by the turn controller
//! - Stable iteration order (player order, then tank order)
//! - No rendering or platform dependencies

pub mod damage;
pub mod geometry;
pub mod player;
pub mod projectile;
pub mod state;
pub mod tank;
pub mod terrain;
pub mod turn;

pub use damage::{DamageResolver, ResolverPhase};
pub use geometry::{Segment, segment_intersection, vertical_probe_circle};
pub use player::{Player, Reseat, health_bar_slot, seat_height};
pub use projectile::{FireRequest, Shell, ShellStep, Trajectory, fire, find_impact};
pub use state::{
    Color, Explosion, ExplosionSource, GameEvent, Impact, ImpactTarget, PLAYER_PALETTE, TurnPhase,
};
pub use tank::{Tank, explosion_damage};
pub use terrain::{SloughColumn, Terrain};
pub use turn::{TickInput, TurnController};
