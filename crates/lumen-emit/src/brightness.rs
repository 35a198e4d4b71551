//! Energy-to-brightness mapping shared by both emitters: a three-zone tier,
//! a smoothed percent, and an event-driven accent.

use lumen_core::intent::BrightnessTier;

const SILENT_MAX: f32 = 0.11;
const LOW_MAX: f32 = 0.4;
const MEDIUM_MAX: f32 = 0.75;

#[must_use]
pub fn brightness_tier(energy: f32) -> BrightnessTier {
    if energy <= SILENT_MAX {
        BrightnessTier::Silent
    } else if energy <= LOW_MAX {
        BrightnessTier::Low
    } else if energy <= MEDIUM_MAX {
        BrightnessTier::Medium
    } else {
        BrightnessTier::High
    }
}

/// Smooths a raw brightness percent with an asymmetric EMA (rises faster
/// than it falls, mirroring the energy follower), then layers an
/// event-driven accent (beat/drop) on top, clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrightnessSmoother {
    percent: f32,
}

impl BrightnessSmoother {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn percent(&self) -> f32 {
        self.percent
    }

    /// `applyEnergyBrightnessScale`: map raw energy into a target percent by
    /// tier, smooth it, then add an accent on `beat`/`drop`.
    pub fn apply(&mut self, energy: f32, beat: bool, drop: bool) -> f32 {
        let target = match brightness_tier(energy) {
            BrightnessTier::Silent => energy / SILENT_MAX.max(1e-6) * 0.08,
            BrightnessTier::Low => 0.08 + (energy - SILENT_MAX) / (LOW_MAX - SILENT_MAX) * 0.27,
            BrightnessTier::Medium => 0.35 + (energy - LOW_MAX) / (MEDIUM_MAX - LOW_MAX) * 0.35,
            BrightnessTier::High => 0.7 + (energy - MEDIUM_MAX) / (1.2 - MEDIUM_MAX).max(1e-6) * 0.3,
        };
        let target = target.clamp(0.0, 1.0);
        let alpha = if target > self.percent { 0.3 } else { 0.15 };
        self.percent += (target - self.percent) * alpha;

        let mut accent = self.percent;
        if drop {
            accent = accent.max(0.92);
        } else if beat {
            accent = (accent + 0.12).min(1.0);
        }
        accent.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{brightness_tier, BrightnessSmoother};
    use lumen_core::intent::BrightnessTier;

    #[test]
    fn tiers_match_documented_thresholds() {
        assert_eq!(brightness_tier(0.0), BrightnessTier::Silent);
        assert_eq!(brightness_tier(0.11), BrightnessTier::Silent);
        assert_eq!(brightness_tier(0.2), BrightnessTier::Low);
        assert_eq!(brightness_tier(0.5), BrightnessTier::Medium);
        assert_eq!(brightness_tier(0.9), BrightnessTier::High);
    }

    #[test]
    fn drop_forces_near_full_brightness() {
        let mut smoother = BrightnessSmoother::new();
        let p = smoother.apply(0.05, false, true);
        assert!(p >= 0.92);
    }

    #[test]
    fn silence_settles_low() {
        let mut smoother = BrightnessSmoother::new();
        let mut last = 1.0;
        for _ in 0..60 {
            last = smoother.apply(0.0, false, false);
        }
        assert!(last <= 0.11);
    }
}
