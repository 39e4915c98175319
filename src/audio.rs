//! Stereo-panned procedural noise synth. One voice per engine: pink
//! noise loop -> biquad filter -> envelope -> master gain -> pan.
//!
//! Actual signal generation and playback belong to the host's
//! `AudioCapability` implementation (an `AudioContext` is as much a
//! "global navigator" object as `navigator.vibrate`); this module owns
//! the parameter math — which profile maps to which filter, how the
//! envelope tracks velocity, where the pan sits — and drives the
//! capability with the result.

use crate::capability::{AudioCapability, VoiceParams};
use crate::error::CoreResult;
use crate::geometry::clamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Lowpass,
    Bandpass,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileParams {
    pub rate: f32,
    pub filter: FilterKind,
    pub freq: f32,
    pub q: f32,
    pub gain_db: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundProfile {
    Pencil,
    Charcoal,
    Ballpoint,
    Fountain,
    Marker,
    Highlighter,
    Monoline,
    Calligraphy,
}

impl Default for SoundProfile {
    fn default() -> Self {
        SoundProfile::Pencil
    }
}

impl SoundProfile {
    pub const ALL: [SoundProfile; 8] = [
        SoundProfile::Pencil,
        SoundProfile::Charcoal,
        SoundProfile::Ballpoint,
        SoundProfile::Fountain,
        SoundProfile::Marker,
        SoundProfile::Highlighter,
        SoundProfile::Monoline,
        SoundProfile::Calligraphy,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }

    pub fn params(self) -> ProfileParams {
        use FilterKind::*;
        match self {
            SoundProfile::Pencil => ProfileParams { rate: 1.0, filter: Lowpass, freq: 600.0, q: 0.5, gain_db: 0.0 },
            SoundProfile::Charcoal => ProfileParams { rate: 0.5, filter: Lowpass, freq: 400.0, q: 0.5, gain_db: 0.0 },
            SoundProfile::Ballpoint => ProfileParams { rate: 1.3, filter: Bandpass, freq: 800.0, q: 0.8, gain_db: 0.0 },
            SoundProfile::Fountain => ProfileParams { rate: 0.9, filter: Lowpass, freq: 400.0, q: 0.3, gain_db: 0.0 },
            SoundProfile::Marker => ProfileParams { rate: 0.8, filter: Lowpass, freq: 200.0, q: 0.1, gain_db: 0.0 },
            SoundProfile::Highlighter => ProfileParams { rate: 1.5, filter: Bandpass, freq: 1200.0, q: 5.0, gain_db: 10.0 },
            SoundProfile::Monoline => ProfileParams { rate: 2.0, filter: Lowpass, freq: 100.0, q: 0.0, gain_db: 0.0 },
            SoundProfile::Calligraphy => ProfileParams { rate: 0.6, filter: Lowpass, freq: 300.0, q: 0.2, gain_db: 0.0 },
        }
    }

    fn profile_factor(self) -> f32 {
        10f32.powf(self.params().gain_db / 20.0)
    }
}

const ENVELOPE_ATTACK_TAU_MS: f32 = 50.0;
const ENVELOPE_RELEASE_TAU_MS: f32 = 100.0;

/// A `dt` large enough relative to `ENVELOPE_RELEASE_TAU_MS` that a single
/// `end_stroke` tick settles the envelope to (near) zero, for hosts that
/// don't run a per-frame audio tick of their own.
pub const ENVELOPE_RELEASE_SETTLE_MS: f32 = 500.0;

/// One-pole exponential smoothing toward a target, parameterized by a
/// time constant in milliseconds.
fn one_pole(current: f32, target: f32, dt_ms: f32, tau_ms: f32) -> f32 {
    if dt_ms <= 0.0 {
        return current;
    }
    let alpha = 1.0 - (-dt_ms / tau_ms).exp();
    current + (target - current) * alpha
}

pub fn envelope_target(velocity: f32, profile: SoundProfile) -> f32 {
    clamp((velocity / 2.5).max(0.0).powf(1.1) * profile.profile_factor(), 0.0, 1.0)
}

pub fn stereo_pan(screen_x: f32, canvas_width: f32) -> f32 {
    if canvas_width <= 0.0 {
        return 0.0;
    }
    clamp((screen_x / canvas_width) * 2.0 - 1.0, -1.0, 1.0)
}

pub struct AudioVoice<C: AudioCapability> {
    capability: C,
    profile: SoundProfile,
    surface_texture: f32,
    volume: f32,
    enabled: bool,
    envelope: f32,
    resumed: bool,
}

impl<C: AudioCapability> AudioVoice<C> {
    pub fn new(capability: C) -> Self {
        AudioVoice {
            capability,
            profile: SoundProfile::default(),
            surface_texture: 0.0,
            volume: 1.0,
            enabled: true,
            envelope: 0.0,
            resumed: false,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.capability.stop();
            self.envelope = 0.0;
        }
    }

    pub fn set_profile(&mut self, profile: SoundProfile) {
        self.profile = profile;
    }

    pub fn set_surface_texture(&mut self, t: f32) {
        self.surface_texture = clamp(t, 0.0, 1.0);
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp(volume, 0.0, 1.0);
    }

    /// Fired on `startStroke`. If the audio context hasn't resumed yet,
    /// the stroke still commits; audio simply starts late (per §5).
    pub fn start_stroke(&mut self) -> CoreResult<()> {
        if !self.enabled {
            return Ok(());
        }
        let result = self.capability.resume();
        self.resumed = result.is_ok();
        self.capability.set_voice(VoiceParams {
            profile_index: self.profile.index(),
            surface_texture: self.surface_texture,
            volume: self.volume,
        });
        result
    }

    /// Fired per sample. `velocity` matches the width model's units
    /// (world-px per ms, already divided by 2.5 internally).
    pub fn on_sample(&mut self, velocity: f32, screen_x: f32, canvas_width: f32, dt_ms: f32) {
        if !self.enabled {
            return;
        }
        let target = envelope_target(velocity, self.profile) * self.volume;
        self.envelope = one_pole(self.envelope, target, dt_ms, ENVELOPE_ATTACK_TAU_MS);
        self.capability.set_envelope_target(self.envelope);
        self.capability.set_pan(stereo_pan(screen_x, canvas_width));
    }

    /// Fired on `endStroke`; decays to zero with a slower time constant.
    pub fn end_stroke(&mut self, dt_ms: f32) {
        self.envelope = one_pole(self.envelope, 0.0, dt_ms, ENVELOPE_RELEASE_TAU_MS);
        self.capability.set_envelope_target(self.envelope);
        if self.envelope < 1e-3 {
            self.capability.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::RecordingCapability;

    #[test]
    fn envelope_target_is_clamped_to_unit_range() {
        assert!(envelope_target(100.0, SoundProfile::Highlighter) <= 1.0);
        assert!(envelope_target(0.0, SoundProfile::Pencil) >= 0.0);
    }

    #[test]
    fn pan_follows_screen_x() {
        assert!((stereo_pan(0.0, 800.0) - (-1.0)).abs() < 1e-6);
        assert!((stereo_pan(800.0, 800.0) - 1.0).abs() < 1e-6);
        assert!((stereo_pan(400.0, 800.0)).abs() < 1e-6);
    }

    #[test]
    fn start_stroke_still_succeeds_when_resume_fails() {
        struct FailingResume(RecordingCapability);
        impl AudioCapability for FailingResume {
            fn resume(&mut self) -> CoreResult<()> {
                Err(crate::error::CoreError::AudioUnavailable("no context".into()))
            }
            fn set_voice(&mut self, p: VoiceParams) {
                self.0.set_voice(p)
            }
            fn set_envelope_target(&mut self, t: f32) {
                self.0.set_envelope_target(t)
            }
            fn set_pan(&mut self, p: f32) {
                self.0.set_pan(p)
            }
            fn stop(&mut self) {
                self.0.stop()
            }
        }

        let mut voice = AudioVoice::new(FailingResume(RecordingCapability::default()));
        // The caller decides whether to surface the error; the voice
        // itself doesn't panic or otherwise block stroke commit.
        let _ = voice.start_stroke();
    }

    #[test]
    fn envelope_ramps_toward_target_over_time() {
        let mut voice = AudioVoice::new(RecordingCapability::default());
        voice.on_sample(5.0, 400.0, 800.0, 50.0);
        let after_one_tick = voice.envelope;
        voice.on_sample(5.0, 400.0, 800.0, 50.0);
        assert!(voice.envelope > after_one_tick);
    }
}
