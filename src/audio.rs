//! Audio triggers and a Web Audio synth
//!
//! Procedurally generated sound effects - no external files needed! Audio is
//! best effort: every failure is swallowed inside the sink.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Projectile fired
    Shoot,
    /// Landing spiral begins
    LandingStarted,
}

/// Fire-and-forget audio output
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
    fn engine_start(&mut self);
    /// Continuous engine hum follows ship speed
    fn engine_update(&mut self, velocity: f32, max_velocity: f32);
    fn engine_stop(&mut self);

    /// Route a simulation event to the matching sound, if any
    fn handle_event(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::ShotFired => self.play(SoundEffect::Shoot),
            GameEvent::LandingStarted(_) => {
                self.engine_stop();
                self.play(SoundEffect::LandingStarted);
            }
            GameEvent::EngineStart => self.engine_start(),
            GameEvent::EngineUpdate { velocity, max_velocity } => {
                self.engine_update(velocity, max_velocity)
            }
            GameEvent::EngineStop => self.engine_stop(),
            _ => {}
        }
    }
}

/// Silent sink (native builds, tests)
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}
    fn engine_start(&mut self) {}
    fn engine_update(&mut self, _velocity: f32, _max_velocity: f32) {}
    fn engine_stop(&mut self) {}
}

/// Map ship speed to engine hum frequency (Hz) and gain
pub fn engine_voice(velocity: f32, max_velocity: f32) -> (f32, f32) {
    let t = if max_velocity > 0.0 {
        (velocity / max_velocity).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (55.0 + 90.0 * t, 0.04 + 0.1 * t)
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEffect, engine_voice};

    /// Audio manager for the game
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        engine: Option<(OscillatorNode, GainNode)>,
        master_volume: f32,
        sfx_volume: f32,
        muted: bool,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                engine: None,
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
            if muted {
                self.engine_stop();
            }
        }

        fn effective_volume(&self) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * self.sfx_volume
            }
        }

        /// Context resumed if suspended (browsers require a user gesture)
        fn live_context(&self) -> Option<&AudioContext> {
            let ctx = self.ctx.as_ref()?;
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            Some(ctx)
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Shot - short descending zap
        fn play_shoot(ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, 900.0, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency().set_value_at_time(900.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(220.0, t + 0.12)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        /// Landing - long descending whoosh matching the spiral
        fn play_landing(ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, 500.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(0.01, t).ok();
            gain.gain()
                .linear_ramp_to_value_at_time(vol * 0.3, t + 0.3)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 2.5)
                .ok();
            osc.frequency().set_value_at_time(500.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(60.0, t + 2.5)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 2.6).ok();
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, effect: SoundEffect) {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = self.live_context() else { return };
            match effect {
                SoundEffect::Shoot => Self::play_shoot(ctx, vol),
                SoundEffect::LandingStarted => Self::play_landing(ctx, vol),
            }
        }

        fn engine_start(&mut self) {
            if self.engine.is_some() || self.effective_volume() <= 0.0 {
                return;
            }
            let Some(ctx) = self.live_context() else { return };
            let (freq, _) = engine_voice(0.0, 1.0);
            let Some((osc, gain)) = Self::create_osc(ctx, freq, OscillatorType::Sawtooth) else {
                return;
            };
            gain.gain().set_value(0.0);
            if osc.start().is_ok() {
                self.engine = Some((osc, gain));
            }
        }

        fn engine_update(&mut self, velocity: f32, max_velocity: f32) {
            let vol = self.effective_volume();
            let (Some(ctx), Some((osc, gain))) = (&self.ctx, &self.engine) else {
                return;
            };
            let (freq, level) = engine_voice(velocity, max_velocity);
            let t = ctx.current_time();
            osc.frequency().set_target_at_time(freq, t, 0.05).ok();
            gain.gain().set_target_at_time(level * vol, t, 0.05).ok();
        }

        fn engine_stop(&mut self) {
            let Some((osc, gain)) = self.engine.take() else { return };
            if let Some(ctx) = &self.ctx {
                let t = ctx.current_time();
                gain.gain().set_target_at_time(0.0, t, 0.05).ok();
                osc.stop_with_when(t + 0.2).ok();
            } else {
                osc.stop().ok();
            }
        }
    }
}
