//! Audio requests
//!
//! The game asks for a sound by kind and never waits on it. Each effect comes
//! with a short procedural voice description so a backend can synthesize it
//! without sample files.

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Shell leaves the barrel
    Fire,
    /// Shell explodes on the ground (or the floor)
    TerrainImpact,
    /// A tank blows up
    TankDestroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Square,
    Sawtooth,
    Noise,
}

/// Procedural description of an effect: a frequency sweep with a decay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub waveform: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    pub duration_secs: f32,
    /// Relative loudness before volume settings apply
    pub gain: f32,
}

impl SoundEffect {
    pub fn voice(self) -> Voice {
        match self {
            SoundEffect::Fire => Voice {
                waveform: Waveform::Square,
                start_hz: 220.0,
                end_hz: 80.0,
                duration_secs: 0.15,
                gain: 0.4,
            },
            SoundEffect::TerrainImpact => Voice {
                waveform: Waveform::Noise,
                start_hz: 120.0,
                end_hz: 40.0,
                duration_secs: 0.4,
                gain: 0.6,
            },
            SoundEffect::TankDestroyed => Voice {
                waveform: Waveform::Sawtooth,
                start_hz: 90.0,
                end_hz: 25.0,
                duration_secs: 0.8,
                gain: 0.9,
            },
        }
    }
}

/// Something that can actually make noise
pub trait AudioBackend {
    /// Fire-and-forget playback at `volume` (0.0 - 1.0)
    fn play(&mut self, effect: SoundEffect, voice: Voice, volume: f32);
}

/// Backend for headless runs: logs each request
#[derive(Debug, Default)]
pub struct LogBackend;

impl AudioBackend for LogBackend {
    fn play(&mut self, effect: SoundEffect, voice: Voice, volume: f32) {
        log::debug!(
            "sound {:?}: {:?} {:.0}->{:.0} Hz for {:.2}s at {:.2}",
            effect,
            voice.waveform,
            voice.start_hz,
            voice.end_hz,
            voice.duration_secs,
            volume
        );
    }
}

/// Audio manager for the game
pub struct AudioManager<B: AudioBackend = LogBackend> {
    backend: B,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager<LogBackend> {
    fn default() -> Self {
        Self::new(LogBackend)
    }
}

impl<B: AudioBackend> AudioManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let voice = effect.voice();
        self.backend.play(effect, voice, vol * voice.gain);
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
