//! Tick-driven game loop
//!
//! One thread of control: poll input, tick the turn controller, play sounds,
//! draw. Turn ticks run at the turn rate; shell flight, explosions and falling
//! debris run at the firing rate. Every tick of every sub-loop checks for quit.

use std::ops::ControlFlow;

use log::{debug, info};

use crate::audio::{AudioBackend, AudioManager, SoundEffect};
use crate::consts::{EXPLOSION_FRAMES, SLOUGH_FRAMES};
use crate::error::Result;
use crate::platform::{FrameClock, InputSource, InputState};
use crate::renderer::{Renderer, draw_scene, draw_sloughing, shapes};
use crate::settings::Settings;
use crate::sim::{
    Explosion, ExplosionSource, GameEvent, SloughColumn, TickInput, TurnController, TurnPhase,
};

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The player asked to quit
    Quit,
    /// The configured tick budget ran out
    TickLimit,
}

pub struct GameLoop<R: Renderer, I: InputSource, C: FrameClock, B: AudioBackend> {
    ctrl: TurnController,
    renderer: R,
    input: I,
    clock: C,
    audio: AudioManager<B>,
    input_state: InputState,
    tick_limit: Option<u64>,
}

impl<R: Renderer, I: InputSource, C: FrameClock, B: AudioBackend> GameLoop<R, I, C, B> {
    pub fn new(settings: Settings, renderer: R, input: I, clock: C, audio_backend: B) -> Result<Self> {
        let mut audio = AudioManager::new(audio_backend);
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(settings.muted);
        Ok(Self {
            ctrl: TurnController::new(settings)?,
            renderer,
            input,
            clock,
            audio,
            input_state: InputState::default(),
            tick_limit: None,
        })
    }

    /// Stop after this many paced ticks, counting animation frames
    pub fn with_tick_limit(mut self, ticks: u64) -> Self {
        self.tick_limit = Some(ticks);
        self
    }

    pub fn controller(&self) -> &TurnController {
        &self.ctrl
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn audio(&self) -> &AudioManager<B> {
        &self.audio
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Run until quit (or the tick limit)
    pub fn run(&mut self) -> ExitReason {
        loop {
            if let ControlFlow::Break(reason) = self.step() {
                info!("game loop exiting: {reason:?}");
                return reason;
            }
        }
    }

    /// One tick of the outer loop, plus any animation its events trigger
    pub fn step(&mut self) -> ControlFlow<ExitReason> {
        let hz = match self.ctrl.phase() {
            TurnPhase::Firing | TurnPhase::Resolving => self.ctrl.settings().firing_tick_hz,
            _ => self.ctrl.settings().turn_tick_hz,
        };
        self.pace(hz)?;

        let input = match self.ctrl.phase() {
            TurnPhase::AwaitingInput | TurnPhase::GameOver => self.input_state.take_tick_input(),
            _ => {
                self.input_state.discard_presses();
                TickInput::default()
            }
        };
        let events = self.ctrl.tick(&input);
        for event in &events {
            self.handle_event(event)?;
        }
        self.draw_frame(|_| {});
        ControlFlow::Continue(())
    }

    /// Wait for the next tick and read input; breaks on quit
    fn pace(&mut self, hz: u32) -> ControlFlow<ExitReason> {
        if let Some(limit) = self.tick_limit {
            if self.clock.ticks() >= limit {
                return ControlFlow::Break(ExitReason::TickLimit);
            }
        }
        self.clock.wait_next(hz);
        self.input_state.apply_all(self.input.poll());
        if self.input_state.quit_requested() {
            return ControlFlow::Break(ExitReason::Quit);
        }
        ControlFlow::Continue(())
    }

    fn handle_event(&mut self, event: &GameEvent) -> ControlFlow<ExitReason> {
        match event {
            GameEvent::Fired { request, .. } => self.audio.play(request.sound),
            GameEvent::Explosion(explosion) => {
                if let ExplosionSource::Shell(_) = explosion.source {
                    self.audio.play(SoundEffect::TerrainImpact);
                }
                self.animate_explosion(explosion)?;
            }
            GameEvent::TankDestroyed { .. } => self.audio.play(SoundEffect::TankDestroyed),
            GameEvent::Sloughing { columns } => self.animate_sloughing(columns)?,
            GameEvent::GameOver { winner } => info!("game over, winner {winner:?}"),
            other => debug!("{other:?}"),
        }
        ControlFlow::Continue(())
    }

    fn animate_explosion(&mut self, explosion: &Explosion) -> ControlFlow<ExitReason> {
        if explosion.is_degenerate() {
            return ControlFlow::Continue(());
        }
        let hz = self.ctrl.settings().firing_tick_hz;
        for frame in 0..=EXPLOSION_FRAMES {
            self.pace(hz)?;
            self.input_state.discard_presses();
            let radius = shapes::explosion_frame_radius(explosion.radius, frame, EXPLOSION_FRAMES);
            self.draw_frame(|r| r.draw_explosion_frame(explosion.point, radius, frame));
        }
        ControlFlow::Continue(())
    }

    fn animate_sloughing(&mut self, columns: &[SloughColumn]) -> ControlFlow<ExitReason> {
        let hz = self.ctrl.settings().firing_tick_hz;
        for frame in 0..=SLOUGH_FRAMES {
            self.pace(hz)?;
            self.input_state.discard_presses();
            self.draw_frame(|r| draw_sloughing(columns, frame, SLOUGH_FRAMES, r));
        }
        ControlFlow::Continue(())
    }

    fn draw_frame<F: FnOnce(&mut R)>(&mut self, overlay: F) {
        self.renderer.begin_frame();
        draw_scene(&self.ctrl, &mut self.renderer);
        overlay(&mut self.renderer);
        self.renderer.present();
    }
}
