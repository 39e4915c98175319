//! Injected capability interfaces, replacing global `navigator`/`window`
//! access with an explicit `{Real, Noop}`-style boundary. Host
//! integrations supply a `Real` implementation; tests and headless use
//! run entirely on `Noop`/`Recording`.

use crate::error::CoreResult;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    pub profile_index: usize,
    pub surface_texture: f32,
    pub volume: f32,
}

pub trait HapticCapability {
    fn pulse(&mut self, duration_ms: f32);
}

pub trait AudioCapability {
    fn resume(&mut self) -> CoreResult<()>;
    fn set_voice(&mut self, params: VoiceParams);
    fn set_envelope_target(&mut self, target: f32);
    fn set_pan(&mut self, pan: f32);
    fn stop(&mut self);
}

/// Does nothing; always succeeds. The default for both capabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHaptic;

impl HapticCapability for NoopHaptic {
    fn pulse(&mut self, _duration_ms: f32) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAudio;

impl AudioCapability for NoopAudio {
    fn resume(&mut self) -> CoreResult<()> {
        Ok(())
    }
    fn set_voice(&mut self, _params: VoiceParams) {}
    fn set_envelope_target(&mut self, _target: f32) {}
    fn set_pan(&mut self, _pan: f32) {}
    fn stop(&mut self) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityEvent {
    HapticPulse(f32),
    AudioResume,
    AudioVoice(VoiceParams),
    AudioEnvelope(f32),
    AudioPan(f32),
    AudioStop,
}

/// Records every call for assertions, standing in for a host-provided
/// `Real` implementation (actual `navigator.vibrate`/`AudioContext`
/// binding lives in the host toolkit, out of scope here).
#[derive(Debug, Clone, Default)]
pub struct RecordingCapability {
    pub events: Vec<CapabilityEvent>,
}

impl HapticCapability for RecordingCapability {
    fn pulse(&mut self, duration_ms: f32) {
        self.events.push(CapabilityEvent::HapticPulse(duration_ms));
    }
}

impl AudioCapability for RecordingCapability {
    fn resume(&mut self) -> CoreResult<()> {
        self.events.push(CapabilityEvent::AudioResume);
        Ok(())
    }
    fn set_voice(&mut self, params: VoiceParams) {
        self.events.push(CapabilityEvent::AudioVoice(params));
    }
    fn set_envelope_target(&mut self, target: f32) {
        self.events.push(CapabilityEvent::AudioEnvelope(target));
    }
    fn set_pan(&mut self, pan: f32) {
        self.events.push(CapabilityEvent::AudioPan(pan));
    }
    fn stop(&mut self) {
        self.events.push(CapabilityEvent::AudioStop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_haptic_never_panics() {
        let mut h = NoopHaptic;
        h.pulse(8.0);
    }

    #[test]
    fn recording_capability_logs_calls() {
        let mut rec = RecordingCapability::default();
        rec.pulse(5.0);
        assert_eq!(rec.events.len(), 1);
        assert_eq!(rec.events[0], CapabilityEvent::HapticPulse(5.0));
    }
}
