//! The energy follower: a smoothed drive signal with a floor that tracks
//! quiet passages.

use lumen_core::AudioFrame;

/// Per-genre coefficients the follower blends into its raw target.
///
/// Populated by the planner from the active `GenreProfile`; kept as a plain
/// struct here so this crate has no dependency on the genre table crate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyCoeffs {
    pub audio_gain: f32,
    pub peak_lift: f32,
    pub transient_lift: f32,
    pub zcr_lift: f32,
    pub band_lift: f32,
    pub flux_lift: f32,
    pub vocal_penalty: f32,
    pub quiet_rms_gate: f32,
    pub quiet_transient_gate: f32,
    pub quiet_flux_gate: f32,
    pub intensity_flux: f32,
    pub intensity_high: f32,
}

impl Default for EnergyCoeffs {
    fn default() -> Self {
        Self {
            audio_gain: 0.95,
            peak_lift: 0.12,
            transient_lift: 0.18,
            zcr_lift: 0.05,
            band_lift: 0.15,
            flux_lift: 0.14,
            vocal_penalty: 0.08,
            quiet_rms_gate: 0.18,
            quiet_transient_gate: 0.15,
            quiet_flux_gate: 0.12,
            intensity_flux: 0.18,
            intensity_high: 0.14,
        }
    }
}

/// External biases folded into the energy target before clamping: MIDI CC /
/// velocity and OSC energy pushes, decayed by the engine each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExternalBias {
    pub midi_bias: f32,
    pub osc_bias: f32,
}

/// Tracks `energy` and `energy_floor` across ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyFollower {
    pub energy: f32,
    pub energy_floor: f32,
    silent_run: u32,
}

impl Default for EnergyFollower {
    fn default() -> Self {
        Self { energy: 0.0, energy_floor: 0.0, silent_run: 0 }
    }
}

impl EnergyFollower {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn quiet_linear(value: f32, gate: f32) -> f32 {
        if gate <= 0.0 {
            return 0.0;
        }
        (value / gate).clamp(0.0, 1.0)
    }

    /// Advance the follower by one tick. `drop_active` disables the quiet
    /// cap (drops are allowed to punch through it).
    pub fn update(
        &mut self,
        frame: &AudioFrame,
        coeffs: &EnergyCoeffs,
        bias: ExternalBias,
        drop_active: bool,
    ) {
        let is_silent = frame.rms < 0.01 && frame.peak < 0.02 && frame.transient < 0.01;
        if is_silent {
            self.silent_run += 1;
        } else {
            self.silent_run = 0;
        }

        if self.silent_run >= 6 {
            self.energy *= 0.88;
            self.energy_floor *= 0.86;
            if self.energy < 0.002 {
                self.energy = 0.0;
            }
            if self.energy_floor < 0.001 {
                self.energy_floor = 0.0;
            }
            return;
        }

        let vocal_penalty = if frame.band_mid > frame.band_low + 0.1 && frame.band_mid > frame.band_high + 0.1 {
            coeffs.vocal_penalty * (frame.band_mid - frame.rms.max(0.1))
        } else {
            -coeffs.vocal_penalty * 0.3 * (frame.band_low + frame.band_high)
        };

        let mut target = frame.rms * coeffs.audio_gain
            + frame.peak * coeffs.peak_lift
            + frame.transient * coeffs.transient_lift
            + frame.zcr * coeffs.zcr_lift
            + (frame.band_low + frame.band_mid + frame.band_high) / 3.0 * coeffs.band_lift
            + frame.spectral_flux * coeffs.flux_lift
            - vocal_penalty;

        target += bias.midi_bias + bias.osc_bias;
        target = target.clamp(0.0, 1.2);

        if !drop_active {
            let quiet_by_rms = Self::quiet_linear(frame.rms, coeffs.quiet_rms_gate);
            let quiet_by_transient = Self::quiet_linear(frame.transient, coeffs.quiet_transient_gate);
            let quiet_by_flux = Self::quiet_linear(frame.spectral_flux, coeffs.quiet_flux_gate);
            let quiet_drive = quiet_by_rms.max(quiet_by_transient).max(quiet_by_flux);
            let cap = 0.05 + quiet_drive * 0.72;
            target = target.min(cap);

            let micro_floor = (frame.transient * 0.3
                + frame.spectral_flux * 0.25
                + (frame.band_low + frame.band_mid + frame.band_high) / 3.0 * 0.1)
                .min(0.1);
            target = target.max(micro_floor.min(cap));
        }

        let alpha = if target > self.energy { 0.26 } else { 0.12 };
        self.energy += (target - self.energy) * alpha;
        self.energy = self.energy.clamp(0.0, 1.2);

        let floor_target = (self.energy * 0.1).min(0.08);
        self.energy_floor += (floor_target - self.energy_floor) * 0.05;
        self.energy_floor = self.energy_floor.clamp(0.0, 0.08);

        if self.energy < self.energy_floor {
            self.energy = self.energy_floor;
        }
    }

    /// `intensity = clamp(energy·0.68 + transient·0.2 + max(0,peak−rms)·0.12
    /// + flux·intensityFlux + bandHigh·intensityHigh, 0, 1)`.
    #[must_use]
    pub fn intensity(&self, frame: &AudioFrame, coeffs: &EnergyCoeffs) -> f32 {
        (self.energy * 0.68
            + frame.transient * 0.2
            + (frame.peak - frame.rms).max(0.0) * 0.12
            + frame.spectral_flux * coeffs.intensity_flux
            + frame.band_high * coeffs.intensity_high)
            .clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{EnergyCoeffs, EnergyFollower, ExternalBias};
    use lumen_core::AudioFrame;

    #[test]
    fn energy_stays_above_floor() {
        let mut f = EnergyFollower::new();
        let coeffs = EnergyCoeffs::default();
        let loud = AudioFrame { rms: 0.6, peak: 0.7, transient: 0.5, ..AudioFrame::default() };
        for _ in 0..50 {
            f.update(&loud, &coeffs, ExternalBias::default(), false);
            assert!(f.energy >= f.energy_floor);
        }
        let silent = AudioFrame::default();
        for _ in 0..50 {
            f.update(&silent, &coeffs, ExternalBias::default(), false);
            assert!(f.energy >= f.energy_floor);
            assert!(f.energy_floor <= 0.08);
        }
    }

    #[test]
    fn sustained_silence_decays_to_zero() {
        let mut f = EnergyFollower { energy: 0.5, energy_floor: 0.05, ..EnergyFollower::new() };
        let coeffs = EnergyCoeffs::default();
        let silent = AudioFrame::default();
        for _ in 0..200 {
            f.update(&silent, &coeffs, ExternalBias::default(), false);
        }
        assert_eq!(f.energy, 0.0);
        assert_eq!(f.energy_floor, 0.0);
    }

    #[test]
    fn intensity_is_clamped() {
        let f = EnergyFollower { energy: 1.2, ..EnergyFollower::new() };
        let coeffs = EnergyCoeffs::default();
        let loud = AudioFrame { rms: 1.0, peak: 1.5, transient: 1.2, band_high: 1.0, spectral_flux: 1.0, ..AudioFrame::default() };
        assert!(f.intensity(&loud, &coeffs) <= 1.0);
    }
}
