//! Phrase detector: trend-based build/drop/recover classification.

use lumen_core::ids::Phrase;

/// Genre-derived phrase gates, supplied by the planner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhraseCoeffs {
    pub build_trend: f32,
    pub build_energy: f32,
    pub drop_slope: f32,
    pub drop_energy_gate: f32,
    pub recover_trend: f32,
}

impl Default for PhraseCoeffs {
    fn default() -> Self {
        Self {
            build_trend: 0.015,
            build_energy: 0.45,
            drop_slope: -0.02,
            drop_energy_gate: 0.55,
            recover_trend: 0.01,
        }
    }
}

/// Tracks the energy trend and the current phrase classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhraseDetector {
    prev_energy: f32,
    trend: f32,
    cooldown_ms: f32,
    pub phrase: Phrase,
}

impl Default for PhraseDetector {
    fn default() -> Self {
        Self { prev_energy: 0.0, trend: 0.0, cooldown_ms: 0.0, phrase: Phrase::Neutral }
    }
}

impl PhraseDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(
        &mut self,
        energy: f32,
        dt_ms: f32,
        bpm: f32,
        drop_detection_enabled: bool,
        external_drop: bool,
        coeffs: &PhraseCoeffs,
    ) -> Phrase {
        let delta = energy - self.prev_energy;
        self.prev_energy = energy;
        self.trend += (delta - self.trend) * 0.2;

        self.cooldown_ms = (self.cooldown_ms - dt_ms).max(0.0);

        let build = self.trend > coeffs.build_trend && energy > coeffs.build_energy;
        let organic_drop = self.trend < coeffs.drop_slope && energy > coeffs.drop_energy_gate && self.cooldown_ms <= 0.0;
        let drop = drop_detection_enabled && (organic_drop || external_drop);

        let was_drop = self.phrase == Phrase::Drop;

        self.phrase = if drop {
            let effective_bpm = if bpm > 0.0 { bpm } else { 120.0 };
            self.cooldown_ms = (60_000.0 / effective_bpm) * 4.0;
            Phrase::Drop
        } else if was_drop && self.cooldown_ms <= 0.0 && self.trend > coeffs.recover_trend {
            Phrase::Recover
        } else if was_drop {
            // Cooling down: stay in the drop phrase until recovery trend clears.
            Phrase::Drop
        } else if build {
            Phrase::Build
        } else {
            Phrase::Neutral
        };

        self.phrase
    }
}

#[cfg(test)]
mod tests {
    use super::{PhraseCoeffs, PhraseDetector};
    use lumen_core::ids::Phrase;

    #[test]
    fn rising_energy_classifies_as_build() {
        let mut pd = PhraseDetector::new();
        let coeffs = PhraseCoeffs::default();
        let mut last = Phrase::Neutral;
        let mut energy: f32 = 0.1;
        for _ in 0..50 {
            energy += 0.02;
            last = pd.update(energy.min(1.0), 16.0, 120.0, true, false, &coeffs);
        }
        assert_eq!(last, Phrase::Build);
    }

    #[test]
    fn external_force_drop_enters_drop_phrase() {
        let mut pd = PhraseDetector::new();
        let coeffs = PhraseCoeffs::default();
        let phrase = pd.update(0.6, 16.0, 120.0, true, true, &coeffs);
        assert_eq!(phrase, Phrase::Drop);
    }

    #[test]
    fn drop_disabled_never_fires() {
        let mut pd = PhraseDetector::new();
        let coeffs = PhraseCoeffs::default();
        let phrase = pd.update(0.6, 16.0, 120.0, false, true, &coeffs);
        assert_ne!(phrase, Phrase::Drop);
    }
}
