//! WiZ emission: palette traversal (floating cursor in flow, beat-driven
//! offset in pulse), beat-pulse decay, and deadline-paced `WizIntent`
//! assembly.

use crate::brightness::BrightnessSmoother;
use crate::schedule::{base_interval_ms, modulated_interval_ms, CadenceSignal, EmitSchedule};
use lumen_behavior::{scene_params, Scene};
use lumen_core::color::{contrast_normalize, hsv_to_rgb, rgb_to_hsv};
use lumen_core::intent::{RgbColor, WizIntent};

const WIZ_LO_MS: u16 = 74;
const WIZ_HI_MS: u16 = 300;
const BEAT_PULSE_HALF_LIFE_MS: f32 = 260.0;

/// Maps a Hue scene to its desynced WiZ counterpart when `wiz_scene_sync`
/// is disabled. Defaults to the same scene when no mapping is defined.
#[must_use]
pub fn desync_scene(scene: Scene) -> Scene {
    match scene {
        Scene::FlowHouse => Scene::FlowTechno,
        Scene::FlowTechno => Scene::FlowCyberpunk,
        Scene::FlowPop => Scene::FlowRnb,
        Scene::FlowRock => Scene::FlowMetal,
        other => other,
    }
}

/// Per-tick inputs the WiZ emitter reads.
#[derive(Debug, Clone, Copy)]
pub struct WizEmitInputs<'a> {
    pub now_ms: f32,
    pub scene: Scene,
    pub overclock_level: u8,
    pub energy: f32,
    pub motion: f32,
    pub drive: f32,
    pub band_low: f32,
    pub band_mid: f32,
    pub band_high: f32,
    pub beat: bool,
    pub drop: bool,
    pub cadence: CadenceSignal,
    /// Resolved palette (manual override, or the scene-default swatch set
    /// reordered/contrast-normalized by the caller's palette layer). Borrowed
    /// rather than `'static` since the caller rebuilds it on every palette
    /// reconfiguration.
    pub palette: &'a [(u8, u8, u8)],
}

impl Default for WizEmitInputs<'_> {
    fn default() -> Self {
        Self {
            now_ms: 0.0,
            scene: Scene::IdleSoft,
            overclock_level: 0,
            energy: 0.0,
            motion: 0.0,
            drive: 0.0,
            band_low: 0.0,
            band_mid: 0.0,
            band_high: 0.0,
            beat: false,
            drop: false,
            cadence: CadenceSignal::default(),
            palette: &[],
        }
    }
}

/// Stateful WiZ emitter: one instance per brand connection.
#[derive(Debug, Clone, Default)]
pub struct WizEmitter {
    schedule: EmitSchedule,
    brightness: BrightnessSmoother,
    beat_pulse: f32,
    last_beat_ms: f32,
    cursor: f32,
    since_last_advance_ms: f32,
}

impl WizEmitter {
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

    fn update_beat_pulse(&mut self, now_ms: f32, beat: bool, drop: bool) {
        let dt = (now_ms - self.last_beat_ms).max(0.0);
        self.beat_pulse *= (-dt / BEAT_PULSE_HALF_LIFE_MS).exp();
        if drop {
            self.beat_pulse = 1.0;
        } else if beat {
            self.beat_pulse = self.beat_pulse.max(0.72 + 0.2 * (1.0 - self.beat_pulse));
        }
        self.last_beat_ms = now_ms;
    }

    fn resolve_palette(&mut self, inputs: &WizEmitInputs<'_>, dt_ms: f32) -> (u8, u8, u8) {
        if inputs.palette.is_empty() {
            let (h, s, v) = (
                (inputs.band_low * 0.1 + inputs.band_mid * 0.5 + inputs.band_high * 0.9).rem_euclid(1.0),
                0.85,
                0.8,
            );
            return hsv_to_rgb(h, s, v);
        }
        let normalized = contrast_normalize(inputs.palette, 0.25, 1.0);
        let len = normalized.len();

        match inputs.scene {
            Scene::PulseStrobe => {
                let beat_offset = if inputs.beat { 1.0 } else { 0.0 } + f32::from(inputs.drop) * 2.0;
                self.cursor = (self.cursor + beat_offset) % len as f32;
                normalized[self.cursor as usize % len]
            }
            s if s.is_flow() => {
                let speed = (inputs.drive * 0.6 + inputs.motion * 0.6 + 0.05) / 16.0;
                self.cursor = (self.cursor + speed * dt_ms).rem_euclid(len as f32);
                let idx = self.cursor.floor() as usize % len;
                let next = (idx + 1) % len;
                let frac = self.cursor.fract();
                let crossfade_window = 0.15;
                let blend = if frac > 1.0 - crossfade_window { (frac - (1.0 - crossfade_window)) / crossfade_window } else { 0.0 };
                let a = normalized[idx];
                let b = normalized[next];
                let (ha, sa, va) = rgb_to_hsv(a.0, a.1, a.2);
                let (hb, sb, vb) = rgb_to_hsv(b.0, b.1, b.2);
                let spectral_hue = (inputs.band_low * 0.1 + inputs.band_mid * 0.5 + inputs.band_high * 0.9).rem_euclid(1.0);
                let h = lumen_core::color::lerp(ha, hb, blend) * 0.8 + spectral_hue * 0.2;
                let sv = lumen_core::color::lerp(sa, sb, blend);
                let vv = lumen_core::color::lerp(va, vb, blend);
                hsv_to_rgb(h, sv, vv)
            }
            _ => {
                self.since_last_advance_ms += dt_ms;
                let cadence_ms = 400.0 + (1.0 - inputs.motion.clamp(0.0, 1.0)) * 600.0;
                if inputs.beat || inputs.drop || self.since_last_advance_ms >= cadence_ms {
                    self.cursor = (self.cursor + 1.0) % len as f32;
                    self.since_last_advance_ms = 0.0;
                }
                normalized[self.cursor as usize % len]
            }
        }
    }

    pub fn emit(&mut self, inputs: &WizEmitInputs<'_>) -> WizIntent {
        let params = scene_params(inputs.scene);
        let base = base_interval_ms(inputs.overclock_level);
        let beat_recency = if inputs.beat { 1.0 } else { 0.4 };
        let cadence = CadenceSignal { beat_recency, ..inputs.cadence };
        let interval_ms = modulated_interval_ms(base, cadence, WIZ_LO_MS, WIZ_HI_MS);

        let dt_ms = (inputs.now_ms - self.schedule.last_emit_ms).max(0.0);
        self.update_beat_pulse(inputs.now_ms, inputs.beat, inputs.drop);

        if self.schedule.is_due(inputs.now_ms) {
            self.schedule.advance(inputs.now_ms, interval_ms);
        }
        let phase = self.schedule.phase;

        let color = self.resolve_palette(inputs, dt_ms);

        let percent = self.brightness.apply(inputs.energy, inputs.beat, inputs.drop);
        let mut brightness = (params.brightness_base + percent * params.brightness_scale).clamp(0.0, 1.0);
        brightness += self.beat_pulse * 0.08;
        if inputs.scene == Scene::PulseStrobe {
            let since_beat = inputs.now_ms - self.last_beat_ms;
            if since_beat <= 150.0 {
                brightness = brightness.max(0.85);
            }
        }
        brightness = brightness.clamp(0.01, 1.0);

        WizIntent {
            phase,
            energy: inputs.energy.clamp(0.0, 1.2),
            rate_ms: interval_ms,
            force_rate: inputs.overclock_level >= 3,
            force_delta: inputs.drop,
            delta_scale: (1.0 - (f32::from(interval_ms) / f32::from(WIZ_HI_MS)) * 0.6).clamp(0.4, 1.0),
            beat: inputs.beat,
            drop: inputs.drop,
            scene: inputs.scene.as_str().to_string(),
            color: RgbColor { r: color.0, g: color.1, b: color.2 },
            brightness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{desync_scene, WizEmitInputs, WizEmitter};
    use lumen_behavior::Scene;

    #[test]
    fn desync_maps_known_scenes() {
        assert_eq!(desync_scene(Scene::FlowHouse), Scene::FlowTechno);
        assert_eq!(desync_scene(Scene::FlowAmbient), Scene::FlowAmbient);
    }

    #[test]
    fn brightness_never_below_documented_floor() {
        let mut emitter = WizEmitter::new();
        let inputs = WizEmitInputs { scene: Scene::IdleSoft, energy: 0.0, ..WizEmitInputs::default() };
        let intent = emitter.emit(&inputs);
        assert!(intent.brightness >= 0.01);
    }

    #[test]
    fn drop_forces_high_brightness() {
        let mut emitter = WizEmitter::new();
        let palette: &'static [(u8, u8, u8)] = &[(255, 0, 0), (0, 255, 0), (0, 0, 255)];
        let inputs = WizEmitInputs { scene: Scene::PulseStrobe, drop: true, palette, ..WizEmitInputs::default() };
        let intent = emitter.emit(&inputs);
        assert!(intent.brightness >= 0.85);
    }

    #[test]
    fn force_rate_at_overclock_three_or_above() {
        let mut emitter = WizEmitter::new();
        let inputs = WizEmitInputs { overclock_level: 3, ..WizEmitInputs::default() };
        let intent = emitter.emit(&inputs);
        assert!(intent.force_rate);
    }
}
