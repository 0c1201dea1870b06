//! Scorched Earth entry point
//!
//! Headless demo: plays a short scripted match with the logging audio backend
//! and a renderer that draws nothing. Set `RUST_LOG=debug` to follow it.

use scorched_earth::audio::LogBackend;
use scorched_earth::platform::{Command, ScriptedInput, UnpacedClock};
use scorched_earth::renderer::NullRenderer;
use scorched_earth::{GameLoop, Settings};

/// Hard stop for the demo, in ticks
const DEMO_TICK_LIMIT: u64 = 200_000;

fn demo_script() -> ScriptedInput {
    let mut script = ScriptedInput::new().idle(2);
    // Each player takes a few shots with slightly different aim
    for turn in 0..8 {
        let aim = if turn % 2 == 0 { Command::AngleUp } else { Command::AngleDown };
        script = script
            .hold(aim, 3 + turn)
            .hold(Command::PowerUp, 10)
            .tap(Command::Fire)
            .idle(400);
    }
    script.quit_when_done()
}

fn main() {
    env_logger::init();
    log::info!("Scorched Earth (headless demo) starting...");

    let settings = match std::env::args().nth(1) {
        Some(seed) => match seed.parse() {
            Ok(seed) => Settings {
                seed,
                ..Settings::default()
            },
            Err(err) => {
                log::error!("invalid seed {seed:?}: {err}");
                std::process::exit(2);
            }
        },
        None => Settings::default(),
    };

    let game = GameLoop::new(
        settings,
        NullRenderer::default(),
        demo_script(),
        UnpacedClock::default(),
        LogBackend,
    );
    let mut game = match game {
        Ok(game) => game.with_tick_limit(DEMO_TICK_LIMIT),
        Err(err) => {
            log::error!("cannot start game: {err}");
            std::process::exit(1);
        }
    };

    let reason = game.run();
    let ctrl = game.controller();
    println!(
        "exit: {reason:?} after {} frames, round {}, phase {:?}, winner {:?}",
        game.renderer().frames,
        ctrl.round(),
        ctrl.phase(),
        ctrl.winner()
    );
    for player in ctrl.players() {
        let health: Vec<i32> = player.tanks.iter().map(|t| t.health).collect();
        println!("player {}: tanks {:?}", player.index, health);
    }
}
