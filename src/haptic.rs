//! Rate-limited tactile pulses: an immediate pulse on stroke start, and
//! grain pulses as the pen crosses distance thresholds mid-stroke.

use crate::capability::HapticCapability;
use crate::geometry::lerp;

const IMMEDIATE_PULSE_MS: f32 = 8.0;
const GRAIN_PULSE_MS: f32 = 5.0;
const GRAIN_DISTANCE_THRESHOLD: f32 = 2.0;
const INTERVAL_MAX_MS: f64 = 80.0;
const INTERVAL_MIN_MS: f64 = 20.0;
/// Velocity (world-px/100ms) at which `hapticInterval` bottoms out at
/// `INTERVAL_MIN_MS`. Matches the velocity scale used by the friction
/// filter for a single coherent notion of "fast".
const INTERVAL_VELOCITY_CAP: f32 = 5.0;

pub struct HapticPulser<C: HapticCapability> {
    capability: C,
    enabled: bool,
    last_pulse_at: Option<f64>,
}

fn haptic_interval_ms(velocity: f32) -> f64 {
    let t = (velocity / INTERVAL_VELOCITY_CAP).clamp(0.0, 1.0) as f64;
    lerp(INTERVAL_MAX_MS as f32, INTERVAL_MIN_MS as f32, t as f32) as f64
}

impl<C: HapticCapability> HapticPulser<C> {
    pub fn new(capability: C) -> Self {
        HapticPulser {
            capability,
            enabled: true,
            last_pulse_at: None,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn reset(&mut self) {
        self.last_pulse_at = None;
    }

    fn try_pulse(&mut self, timestamp: f64, velocity: f32, duration_ms: f32) {
        if !self.enabled {
            return;
        }
        if let Some(last) = self.last_pulse_at {
            if timestamp - last < haptic_interval_ms(velocity) {
                return;
            }
        }
        self.capability.pulse(duration_ms);
        self.last_pulse_at = Some(timestamp);
    }

    pub fn trigger_immediate(&mut self, timestamp: f64) {
        self.try_pulse(timestamp, 0.0, IMMEDIATE_PULSE_MS);
    }

    /// Called per incoming sample; only pulses when the sample-to-sample
    /// distance exceeds the grain threshold, and still subject to the
    /// rate limit.
    pub fn trigger_grain(&mut self, timestamp: f64, sample_distance: f32, velocity: f32) {
        if sample_distance <= GRAIN_DISTANCE_THRESHOLD {
            return;
        }
        self.try_pulse(timestamp, velocity, GRAIN_PULSE_MS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::RecordingCapability;

    #[test]
    fn grain_below_threshold_does_not_pulse() {
        let mut p = HapticPulser::new(RecordingCapability::default());
        p.trigger_grain(0.0, 1.0, 0.0);
        assert!(p.capability.events.is_empty());
    }

    #[test]
    fn rate_limit_blocks_rapid_pulses() {
        let mut p = HapticPulser::new(RecordingCapability::default());
        p.trigger_immediate(0.0);
        p.trigger_grain(5.0, 10.0, 0.0);
        assert_eq!(p.capability.events.len(), 1);
        p.trigger_grain(200.0, 10.0, 0.0);
        assert_eq!(p.capability.events.len(), 2);
    }

    #[test]
    fn disabled_pulser_is_silent() {
        let mut p = HapticPulser::new(RecordingCapability::default());
        p.set_enabled(false);
        p.trigger_immediate(0.0);
        p.trigger_grain(1.0, 10.0, 0.0);
        assert!(p.capability.events.is_empty());
    }
}
