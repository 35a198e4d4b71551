//! Hue bridge emission: hue-trajectory synthesis per scene, brightness
//! tiering, and deadline-paced `HueIntent` assembly.

use crate::brightness::BrightnessSmoother;
use crate::schedule::{base_interval_ms, modulated_interval_ms, CadenceSignal, EmitSchedule};
use lumen_behavior::{scene_params, Scene};
use lumen_core::color::{enforce_min_saturation, hue_to_u16};
use lumen_core::intent::{HueIntent, HueState};

const HUE_LO_MS: u16 = 84;
const HUE_HI_MS: u16 = 340;

/// Per-tick inputs the Hue emitter reads.
#[derive(Debug, Clone, Copy)]
pub struct HueEmitInputs {
    pub now_ms: f32,
    pub scene: Scene,
    pub overclock_level: u8,
    pub energy: f32,
    pub motion: f32,
    pub band_low: f32,
    pub band_mid: f32,
    pub band_high: f32,
    pub beat: bool,
    pub drop: bool,
    pub silent: bool,
    pub cadence: CadenceSignal,
    /// `Some((h, s))` when a manual palette color overrides the computed hue
    /// and saturation (value stays scene-driven).
    pub manual_hue_sat: Option<(f32, f32)>,
}

impl Default for HueEmitInputs {
    fn default() -> Self {
        Self {
            now_ms: 0.0,
            scene: Scene::IdleSoft,
            overclock_level: 0,
            energy: 0.0,
            motion: 0.0,
            band_low: 0.0,
            band_mid: 0.0,
            band_high: 0.0,
            beat: false,
            drop: false,
            silent: false,
            cadence: CadenceSignal::default(),
            manual_hue_sat: None,
        }
    }
}

/// Stateful Hue emitter: one instance per brand connection.
#[derive(Debug, Clone, Default)]
pub struct HueEmitter {
    schedule: EmitSchedule,
    brightness: BrightnessSmoother,
}

impl HueEmitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_due(&self, now_ms: f32) -> bool {
        self.schedule.is_due(now_ms)
    }

    pub fn set_overclock_level(&mut self, now_ms: f32, level: u8) {
        self.schedule.tighten_to(now_ms, base_interval_ms(level));
    }

    fn compute_hue(&self, inputs: &HueEmitInputs, phase: u64) -> f32 {
        let params = scene_params(inputs.scene);
        let phase = phase as f32;
        let calm_hold = if inputs.silent { 0.3 } else { 1.0 };

        let raw_hue_u16 = match inputs.scene {
            Scene::IdleSoft => phase * params.hue_step,
            Scene::PulseStrobe => phase * params.hue_step,
            _ => {
                let anchor = params.hue_step * 37.0;
                let swing = params.hue_swing;
                let micro = swing * 0.08;
                let drift = swing * 0.05;
                let reactive_warp = (inputs.band_mid - inputs.band_low) * 400.0;
                let step = params.hue_step * (1.0 + inputs.motion.clamp(0.0, 1.0) * 1.35);
                let t = inputs.now_ms / 1000.0;
                (anchor
                    + (phase * 0.33).sin() * swing
                    + (phase * 0.11 + t).sin() * micro
                    + (inputs.now_ms / params.time_div.max(1.0) * 0.2).sin() * drift
                    + phase * step
                    + reactive_warp)
                    * calm_hold
            }
        };

        (raw_hue_u16 / 65535.0).rem_euclid(1.0)
    }

    /// Run the Hue emitter for the current tick. Always safe to call; only
    /// advances the schedule (bumping `phase`) when the deadline was due.
    pub fn emit(&mut self, inputs: &HueEmitInputs) -> HueIntent {
        let params = scene_params(inputs.scene);
        let base = base_interval_ms(inputs.overclock_level);
        let beat_recency = if inputs.beat { 1.0 } else { 0.4 };
        let cadence = CadenceSignal { beat_recency, ..inputs.cadence };
        let interval_ms = modulated_interval_ms(base, cadence, HUE_LO_MS, HUE_HI_MS);

        if self.schedule.is_due(inputs.now_ms) {
            self.schedule.advance(inputs.now_ms, interval_ms);
        }
        let phase = self.schedule.phase;

        let mut hue = self.compute_hue(inputs, phase);
        let mut sat = enforce_min_saturation(params.saturation_floor, params.saturation_floor);
        if let Some((manual_h, manual_s)) = inputs.manual_hue_sat {
            hue = manual_h;
            sat = manual_s;
        }

        let percent = self.brightness.apply(inputs.energy, inputs.beat, inputs.drop);
        let mut bri_pct = (params.brightness_base + percent * params.brightness_scale).clamp(0.0, 1.0);
        if inputs.scene == Scene::PulseStrobe && inputs.drop {
            bri_pct = bri_pct.max(0.9);
        }
        bri_pct = bri_pct.clamp(params.min_brightness, params.max_brightness);

        let bri = ((bri_pct * 254.0).round() as u16).clamp(1, 254) as u8;
        let sat_u8 = ((sat.clamp(0.0, 1.0) * 254.0).round() as u16).clamp(0, 254) as u8;
        let transitiontime = params.transition.max(1);

        HueIntent {
            phase,
            energy: inputs.energy.clamp(0.0, 1.2),
            rate_ms: interval_ms,
            force_rate: inputs.overclock_level >= 2,
            force_delta: inputs.drop,
            delta_scale: (1.0 - (f32::from(interval_ms) / f32::from(HUE_HI_MS)) * 0.6).clamp(0.4, 1.0),
            state: HueState { on: true, hue: hue_to_u16(hue), sat: sat_u8, bri, transitiontime },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HueEmitInputs, HueEmitter};
    use lumen_behavior::Scene;

    #[test]
    fn idle_scene_emits_low_brightness_at_zero_energy() {
        let mut emitter = HueEmitter::new();
        let inputs = HueEmitInputs { scene: Scene::IdleSoft, silent: true, ..HueEmitInputs::default() };
        let intent = emitter.emit(&inputs);
        assert!(intent.state.bri <= 28);
        assert!(intent.state.on);
    }

    #[test]
    fn drop_forces_high_brightness_in_pulse_strobe() {
        let mut emitter = HueEmitter::new();
        let inputs =
            HueEmitInputs { scene: Scene::PulseStrobe, drop: true, energy: 0.3, ..HueEmitInputs::default() };
        let intent = emitter.emit(&inputs);
        assert!(intent.state.bri >= 220);
        assert_eq!(intent.state.transitiontime, 1);
    }

    #[test]
    fn manual_color_overrides_computed_hue_and_saturation() {
        let mut emitter = HueEmitter::new();
        let inputs = HueEmitInputs {
            scene: Scene::FlowWash,
            manual_hue_sat: Some((0.5, 0.9)),
            ..HueEmitInputs::default()
        };
        let intent = emitter.emit(&inputs);
        assert!((f32::from(intent.state.hue) / 65535.0 - 0.5).abs() < 0.001);
        assert!(intent.state.sat >= 220);
    }

    #[test]
    fn high_overclock_sets_force_rate() {
        let mut emitter = HueEmitter::new();
        let inputs = HueEmitInputs { overclock_level: 5, ..HueEmitInputs::default() };
        let intent = emitter.emit(&inputs);
        assert!(intent.force_rate);
    }
}
