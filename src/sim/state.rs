//! Shared simulation value types
//!
//! Phases, explosions and the events the simulation reports to its caller.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::projectile::FireRequest;
use super::terrain::SloughColumn;

/// An RGB color identifying a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const ORANGE: Color = Color::rgb(0xff, 0x91, 0x00);
    pub const PINK: Color = Color::rgb(0xfd, 0x30, 0xd5);
    pub const DARK_GREEN: Color = Color::rgb(0x13, 0x70, 0x2c);
}

/// Player colors; each player in a round gets a distinct one
pub const PLAYER_PALETTE: [Color; 6] = [
    Color::RED,
    Color::BLUE,
    Color::PINK,
    Color::ORANGE,
    Color::rgb(0x00, 0xc8, 0xff),
    Color::rgb(0xf5, 0xe6, 0x42),
];

/// Turn controller phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Terrain and roster are being built
    RoundSetup,
    /// Active tank accepts aim, power and move input
    AwaitingInput,
    /// A shell is in flight
    Firing,
    /// Damage has been applied, terrain debris still has to land
    Resolving,
    /// At most one player has tanks left
    GameOver,
}

/// What a shell struck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactTarget {
    Tank { player: usize, tank: u32 },
    Terrain,
    /// The bottom edge of the field, reached between terrain columns
    Floor,
}

/// A shell collision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Impact {
    pub point: IVec2,
    pub target: ImpactTarget,
}

/// Where an explosion came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplosionSource {
    Shell(ImpactTarget),
    /// A destroyed tank blowing up
    Wreck { player: usize, tank: u32 },
}

/// A single explosion event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub point: IVec2,
    pub power: i32,
    pub radius: f32,
    pub source: ExplosionSource,
}

impl Explosion {
    /// Degenerate explosions do nothing
    pub fn is_degenerate(&self) -> bool {
        self.radius <= 0.0
    }
}

/// Something the front end may want to show or play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted { round: u32, players: usize },
    TurnChanged { player: usize, tank: u32 },
    Fired { player: usize, tank: u32, request: FireRequest },
    ShellMoved { position: IVec2 },
    /// Shell left the field without hitting anything
    ShellWasted { last_position: IVec2 },
    Explosion(Explosion),
    TankDamaged { player: usize, tank: u32, damage: i32, health: i32 },
    TankDestroyed { player: usize, tank: u32, position: IVec2 },
    PlayerEliminated { player: usize },
    /// Undercut terrain that will fall before the turn ends
    Sloughing { columns: Vec<SloughColumn> },
    TankSettled { player: usize, tank: u32, from_y: i32, to_y: i32 },
    GameOver { winner: Option<usize> },
}
