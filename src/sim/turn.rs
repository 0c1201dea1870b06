//! Turn controller
//!
//! Owns the terrain, the player roster and the RNG for one match and advances
//! them one tick at a time:
//!
//! `RoundSetup -> AwaitingInput -> Firing -> Resolving -> AwaitingInput | GameOver`
//!
//! A shell advances one integration step per `Firing` tick so the caller can
//! animate it. The impact and its whole explosion chain are resolved in the
//! tick that finds the impact; the following `Resolving` tick lands the debris,
//! re-seats the tanks and hands the turn on.

use std::f32::consts::FRAC_PI_2;

use glam::IVec2;
use log::{debug, error, info, warn};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::damage::DamageResolver;
use super::player::{Player, health_bar_slot, seat_height};
use super::projectile::{Shell, ShellStep};
use super::state::{GameEvent, PLAYER_PALETTE, TurnPhase};
use super::tank::Tank;
use super::terrain::Terrain;
use crate::consts::*;
use crate::error::Result;
use crate::settings::Settings;

/// Input for a single turn tick, already reduced to directions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// -1 left, +1 right
    pub move_dir: i32,
    /// -1 counter-clockwise, +1 clockwise
    pub angle_dir: i32,
    pub power_dir: i32,
    /// Fire the active tank (edge-triggered)
    pub fire: bool,
    /// Start a new round once the game is over
    pub restart: bool,
}

pub struct TurnController {
    settings: Settings,
    rng: Pcg32,
    phase: TurnPhase,
    round: u32,
    terrain: Terrain,
    players: Vec<Player>,
    /// (player index, tank id) whose turn it is
    active: Option<(usize, u32)>,
    shell: Option<Shell>,
    resolver: DamageResolver,
    winner: Option<usize>,
}

impl TurnController {
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let mut rng = Pcg32::seed_from_u64(settings.seed);
        let terrain = Terrain::generate(
            settings.field_width as usize,
            settings.field_height as i32,
            settings.terrain_min_y,
            settings.terrain_max_y,
            &mut rng,
        )?;
        Ok(Self {
            settings,
            rng,
            phase: TurnPhase::RoundSetup,
            round: 0,
            terrain,
            players: Vec::new(),
            active: None,
            shell: None,
            resolver: DamageResolver::new(),
            winner: None,
        })
    }

    #[inline]
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// (player index, tank id) whose turn it is
    pub fn active(&self) -> Option<(usize, u32)> {
        self.active
    }

    pub fn active_tank(&self) -> Option<&Tank> {
        let (player, tank) = self.active?;
        self.players.get(player)?.tank(tank)
    }

    /// True for the tank that should be drawn highlighted
    pub fn is_active(&self, player: usize, tank: u32) -> bool {
        self.active == Some((player, tank))
    }

    /// Shell position while one is in flight
    pub fn shell_position(&self) -> Option<IVec2> {
        self.shell.as_ref().map(Shell::position)
    }

    /// Winning player once the game is over; `None` if nobody survived
    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    /// Advance the match by one tick and report what happened
    pub fn tick(&mut self, input: &TickInput) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match self.phase {
            TurnPhase::RoundSetup => self.run_setup(&mut events),
            TurnPhase::AwaitingInput => self.tick_input(input, &mut events),
            TurnPhase::Firing => self.tick_firing(&mut events),
            TurnPhase::Resolving => self.tick_resolving(&mut events),
            TurnPhase::GameOver => {
                if input.restart {
                    self.phase = TurnPhase::RoundSetup;
                    self.run_setup(&mut events);
                }
            }
        }
        events
    }

    fn run_setup(&mut self, events: &mut Vec<GameEvent>) {
        if let Err(err) = self.setup_round(events) {
            error!("round setup failed: {err}");
        }
    }

    /// Build a fresh round: new terrain (after the first round), player colors,
    /// tank placement and the first turn
    pub fn setup_round(&mut self, events: &mut Vec<GameEvent>) -> Result<()> {
        if self.round > 0 {
            self.terrain.reinitialize(&mut self.rng)?;
        }
        self.round += 1;
        self.shell = None;
        self.resolver = DamageResolver::new();
        self.winner = None;

        let mut palette = PLAYER_PALETTE;
        palette.shuffle(&mut self.rng);

        let player_count = self.settings.player_count as usize;
        let tanks_per_player = self.settings.tanks_per_player as usize;
        let xs = place_tanks(&self.terrain, player_count * tanks_per_player, &mut self.rng);
        let width = self.terrain.width() as i32;

        self.players = Vec::with_capacity(player_count);
        let mut next_id = 0;
        for (index, &color) in palette.iter().take(player_count).enumerate() {
            let mut player = Player::new(index, color);
            for slot in 0..tanks_per_player {
                let x = xs[next_id as usize];
                let ground = seat_height(&self.terrain, x);
                self.terrain
                    .correct_height_range(x - TANK_HALF_WIDTH, x + TANK_HALF_WIDTH, ground);
                let mut tank = Tank::new(
                    next_id,
                    IVec2::new(x, ground - FULL_TANK_HEIGHT),
                    color,
                    health_bar_slot(index, slot, width),
                );
                tank.turret_angle = self.rng.random_range(0..=64) as f32 * ANGLE_STEP - FRAC_PI_2;
                player.add_tank(tank);
                next_id += 1;
            }
            self.players.push(player);
        }

        info!(
            "round {} started: {} players, {} tanks each",
            self.round, player_count, tanks_per_player
        );
        events.push(GameEvent::RoundStarted {
            round: self.round,
            players: player_count,
        });

        self.active = None;
        self.begin_turn(0, events);
        Ok(())
    }

    fn begin_turn(&mut self, player: usize, events: &mut Vec<GameEvent>) {
        let Some(tank) = self.players.get_mut(player).and_then(Player::next_active_tank) else {
            warn!("player {player} has no tank to take the turn");
            return;
        };
        self.active = Some((player, tank));
        self.phase = TurnPhase::AwaitingInput;
        debug!("turn: player {player} tank {tank}");
        events.push(GameEvent::TurnChanged { player, tank });
    }

    fn tick_input(&mut self, input: &TickInput, events: &mut Vec<GameEvent>) {
        let Some((player, id)) = self.active else {
            return;
        };
        let width = self.terrain.width() as i32;
        let Some(tank) = self.players.get_mut(player).and_then(|p| p.tank_mut(id)) else {
            return;
        };

        if input.move_dir != 0 {
            tank.update_position_x(input.move_dir.signum() * MOVE_STEP, width);
            tank.settle_onto(seat_height(&self.terrain, tank.position.x));
        }
        if input.angle_dir != 0 {
            tank.update_turret_angle(input.angle_dir.signum() as f32 * ANGLE_STEP);
        }
        if input.power_dir != 0 {
            tank.update_power(input.power_dir.signum() * POWER_STEP);
        }

        if input.fire {
            let request = tank.fire_request();
            debug!(
                "player {player} tank {id} fires: power {} angle {:.3} from {:?}",
                request.power, request.angle, request.muzzle
            );
            self.shell = Some(Shell::launch(&request));
            self.phase = TurnPhase::Firing;
            events.push(GameEvent::Fired {
                player,
                tank: id,
                request,
            });
        }
    }

    fn tick_firing(&mut self, events: &mut Vec<GameEvent>) {
        let Some(shell) = self.shell.as_mut() else {
            self.phase = TurnPhase::Resolving;
            return;
        };

        match shell.step(&self.terrain, &self.players) {
            Some(ShellStep {
                position,
                impact: None,
            }) => events.push(GameEvent::ShellMoved { position }),
            Some(ShellStep {
                impact: Some(impact),
                ..
            }) => {
                debug!("shell hit {:?} at {:?}", impact.target, impact.point);
                events.push(GameEvent::ShellMoved {
                    position: impact.point,
                });
                self.shell = None;
                self.resolver
                    .resolve(&impact, &mut self.terrain, &mut self.players, events);
                self.phase = TurnPhase::Resolving;
            }
            None => {
                let last_position = shell.position();
                debug!("shell wasted at {last_position:?}");
                events.push(GameEvent::ShellWasted { last_position });
                self.shell = None;
                self.phase = TurnPhase::Resolving;
            }
        }
    }

    fn tick_resolving(&mut self, events: &mut Vec<GameEvent>) {
        self.resolver
            .settle(&mut self.terrain, &mut self.players, events);

        let live: Vec<usize> = self
            .players
            .iter()
            .filter(|p| p.is_in_game())
            .map(|p| p.index)
            .collect();
        if live.len() <= 1 {
            self.winner = live.first().copied();
            self.active = None;
            self.phase = TurnPhase::GameOver;
            match self.winner {
                Some(player) => info!("game over: player {player} wins"),
                None => info!("game over: no survivors"),
            }
            events.push(GameEvent::GameOver {
                winner: self.winner,
            });
            return;
        }

        let current = self.active.map_or(0, |(player, _)| player);
        let count = self.players.len();
        let next = (1..=count)
            .map(|k| (current + k) % count)
            .find(|&p| self.players[p].is_in_game());
        match next {
            Some(player) => self.begin_turn(player, events),
            None => warn!("no live player found after player {current}"),
        }
    }
}

/// Pick a column for each tank, keeping them `MIN_TANK_SPACING` apart.
///
/// Falls back to evenly spaced columns when random placement keeps failing.
fn place_tanks<R: Rng + ?Sized>(terrain: &Terrain, count: usize, rng: &mut R) -> Vec<i32> {
    let width = terrain.width() as i32;
    let (lo, hi) = (PLACEMENT_MARGIN, (width - PLACEMENT_MARGIN).max(PLACEMENT_MARGIN + 1));

    let mut xs: Vec<i32> = Vec::with_capacity(count);
    for _ in 0..count {
        let spot = (0..MAX_PLACEMENT_ATTEMPTS)
            .map(|_| rng.random_range(lo..hi))
            .find(|&x| xs.iter().all(|&other| (x - other).abs() >= MIN_TANK_SPACING));
        match spot {
            Some(x) => xs.push(x),
            None => {
                warn!(
                    "could not place {count} tanks randomly after {MAX_PLACEMENT_ATTEMPTS} attempts, spacing evenly"
                );
                let slots = count as i32 + 1;
                return (1..slots).map(|k| width * k / slots).collect();
            }
        }
    }
    xs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;
    use crate::sim::state::{Color, ExplosionSource, ImpactTarget};
    use proptest::prelude::*;

    fn controller(seed: u64) -> TurnController {
        let settings = Settings {
            seed,
            ..Settings::default()
        };
        let mut ctrl = TurnController::new(settings).unwrap();
        ctrl.tick(&TickInput::default());
        ctrl
    }

    /// Tick until the turn hands over; returns every event along the way
    fn play_out(ctrl: &mut TurnController) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..(MAX_SHELL_STEPS + 10) {
            events.extend(ctrl.tick(&TickInput::default()));
            if matches!(ctrl.phase(), TurnPhase::AwaitingInput | TurnPhase::GameOver) {
                break;
            }
        }
        events
    }

    fn fire() -> TickInput {
        TickInput {
            fire: true,
            ..TickInput::default()
        }
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let settings = Settings {
            player_count: 0,
            ..Settings::default()
        };
        assert!(matches!(
            TurnController::new(settings),
            Err(GameError::InvalidPlayerCount(0))
        ));
    }

    #[test]
    fn test_round_setup() {
        let settings = Settings {
            player_count: 3,
            tanks_per_player: 2,
            ..Settings::default()
        };
        let mut ctrl = TurnController::new(settings).unwrap();
        assert_eq!(ctrl.phase(), TurnPhase::RoundSetup);

        let events = ctrl.tick(&TickInput::default());
        assert_eq!(
            events,
            vec![
                GameEvent::RoundStarted { round: 1, players: 3 },
                GameEvent::TurnChanged { player: 0, tank: 0 },
            ]
        );
        assert_eq!(ctrl.phase(), TurnPhase::AwaitingInput);
        assert_eq!(ctrl.active(), Some((0, 0)));
        assert!(ctrl.is_active(0, 0));

        let colors: Vec<Color> = ctrl.players().iter().map(|p| p.color).collect();
        for (i, a) in colors.iter().enumerate() {
            assert!(colors[i + 1..].iter().all(|b| b != a));
        }

        let tanks: Vec<&Tank> = ctrl.players().iter().flat_map(|p| &p.tanks).collect();
        assert_eq!(tanks.len(), 6);
        for (i, tank) in tanks.iter().enumerate() {
            assert_eq!(tank.ground_y(), ctrl.terrain().height_at(tank.position.x));
            assert!((-FRAC_PI_2..=FRAC_PI_2).contains(&tank.turret_angle));
            for other in &tanks[i + 1..] {
                assert!((tank.position.x - other.position.x).abs() >= MIN_TANK_SPACING);
            }
        }
    }

    #[test]
    fn test_same_seed_same_round() {
        let a = controller(99);
        let b = controller(99);
        assert_eq!(a.terrain().heights(), b.terrain().heights());
        let positions = |c: &TurnController| -> Vec<(IVec2, f32)> {
            c.players()
                .iter()
                .flat_map(|p| p.tanks.iter().map(|t| (t.position, t.turret_angle)))
                .collect()
        };
        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn test_input_steers_active_tank() {
        let mut ctrl = controller(5);
        let before = ctrl.active_tank().unwrap().clone();

        ctrl.tick(&TickInput {
            power_dir: 1,
            angle_dir: -1,
            move_dir: 1,
            ..TickInput::default()
        });
        let after = ctrl.active_tank().unwrap();
        assert_eq!(after.power, (before.power + POWER_STEP).min(MAX_TANK_POWER));
        assert!(after.turret_angle <= before.turret_angle);
        assert_eq!(after.position.x, before.position.x + MOVE_STEP);
        assert_eq!(after.ground_y(), seat_height(ctrl.terrain(), after.position.x));
        assert_eq!(ctrl.phase(), TurnPhase::AwaitingInput);
    }

    #[test]
    fn test_shot_passes_turn_to_next_player() {
        let mut ctrl = controller(11);
        let events = ctrl.tick(&fire());
        assert!(matches!(events.as_slice(), [GameEvent::Fired { player: 0, tank: 0, .. }]));
        assert_eq!(ctrl.phase(), TurnPhase::Firing);
        assert!(ctrl.shell_position().is_some());

        let events = play_out(&mut ctrl);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::Explosion(_) | GameEvent::ShellWasted { .. }
        )));
        assert_eq!(ctrl.shell_position(), None);
        if ctrl.phase() == TurnPhase::AwaitingInput {
            assert_eq!(ctrl.active().map(|(p, _)| p), Some(1));
        }
    }

    #[test]
    fn test_players_alternate_tanks_round_robin() {
        // One shell does at most 20 damage to a tank, so nobody dies in three shots
        let mut ctrl = controller(3);
        let mut turns = vec![ctrl.active()];
        for _ in 0..3 {
            ctrl.tick(&fire());
            play_out(&mut ctrl);
            turns.push(ctrl.active());
        }
        let players: Vec<usize> = turns.iter().map(|t| t.unwrap().0).collect();
        assert_eq!(players, vec![0, 1, 0, 1]);
        // Player 0's second turn goes to its other tank
        assert_ne!(turns[0].unwrap().1, turns[2].unwrap().1);
        assert_ne!(turns[1].unwrap().1, turns[3].unwrap().1);
    }

    #[test]
    fn test_last_player_standing_wins_and_restart() {
        let settings = Settings {
            tanks_per_player: 1,
            ..Settings::default()
        };
        let mut ctrl = TurnController::new(settings).unwrap();
        ctrl.tick(&TickInput::default());

        // Side by side on flat ground; the target is one hit from death
        ctrl.terrain = Terrain::flat(1600, 900, 600);
        let y = 600 - FULL_TANK_HEIGHT;
        ctrl.players[0].tanks[0].position = IVec2::new(100, y);
        ctrl.players[0].tanks[0].turret_angle = 0.0;
        ctrl.players[0].tanks[0].power = 0;
        ctrl.players[1].tanks[0].position = IVec2::new(140, y);
        ctrl.players[1].tanks[0].health = 1;

        ctrl.tick(&fire());
        let events = play_out(&mut ctrl);

        // Straight up and back down onto the shooter's own hull
        let impact = events.iter().find_map(|e| match e {
            GameEvent::Explosion(explosion) => Some(explosion.source),
            _ => None,
        });
        assert_eq!(
            impact,
            Some(ExplosionSource::Shell(ImpactTarget::Tank {
                player: 0,
                tank: 0
            }))
        );
        assert!(events.contains(&GameEvent::PlayerEliminated { player: 1 }));
        assert_eq!(ctrl.phase(), TurnPhase::GameOver);
        assert_eq!(ctrl.winner(), Some(0));
        assert!(events.contains(&GameEvent::GameOver { winner: Some(0) }));
        assert!(ctrl.players[0].tanks[0].health < 100);

        // Nothing happens until restart is requested
        assert!(ctrl.tick(&fire()).is_empty());
        let events = ctrl.tick(&TickInput {
            restart: true,
            ..TickInput::default()
        });
        assert_eq!(events[0], GameEvent::RoundStarted { round: 2, players: 2 });
        assert_eq!(ctrl.phase(), TurnPhase::AwaitingInput);
        assert_eq!(ctrl.winner(), None);
        assert!(ctrl.players().iter().all(|p| p.tanks.len() == 1));
    }

    #[test]
    fn test_evenly_spaced_fallback() {
        // Columns 25..535 hold at most eleven tanks 50 apart
        let terrain = Terrain::flat(560, 900, 500);
        let mut rng = Pcg32::seed_from_u64(1);
        let xs = place_tanks(&terrain, 12, &mut rng);
        assert_eq!(xs, (1..13).map(|k| 560 * k / 13).collect::<Vec<_>>());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_turn_always_belongs_to_live_player(
            seed in any::<u64>(),
            shots in prop::collection::vec((-30i32..30, -50i32..50), 1..8),
        ) {
            let mut ctrl = controller(seed);
            for (angle_ticks, power_ticks) in shots {
                if ctrl.phase() != TurnPhase::AwaitingInput {
                    break;
                }
                let shooter = ctrl.active().unwrap().0;
                for _ in 0..angle_ticks.abs() {
                    ctrl.tick(&TickInput { angle_dir: angle_ticks.signum(), ..TickInput::default() });
                }
                for _ in 0..power_ticks.abs() {
                    ctrl.tick(&TickInput { power_dir: power_ticks.signum(), ..TickInput::default() });
                }
                ctrl.tick(&fire());
                play_out(&mut ctrl);

                match ctrl.phase() {
                    TurnPhase::AwaitingInput => {
                        let (player, tank) = ctrl.active().unwrap();
                        prop_assert!(ctrl.players()[player].is_in_game());
                        prop_assert!(ctrl.players()[player].tank(tank).is_some());
                        prop_assert_ne!(player, shooter);
                    }
                    TurnPhase::GameOver => {
                        let live = ctrl.players().iter().filter(|p| p.is_in_game()).count();
                        prop_assert!(live <= 1);
                    }
                    phase => prop_assert!(false, "unexpected phase {:?}", phase),
                }
            }
        }
    }
}
