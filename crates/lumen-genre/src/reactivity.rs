//! Reactivity preset table: a multiplier overlay applied on top of a
//! `GenreProfile`.

use lumen_core::ids::ReactivityPresetName;

/// Scalar multipliers layered on top of the active `GenreProfile`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactivityPreset {
    pub name: ReactivityPresetName,
    pub energy_mult: f32,
    pub beat_threshold_mult: f32,
    pub hz_mult: f32,
    pub tier_bias: f32,
    pub hysteresis_scale: f32,
}

pub const REACTIVITY_PRESETS: [ReactivityPreset; 3] = [
    ReactivityPreset {
        name: ReactivityPresetName::Balanced,
        energy_mult: 1.0,
        beat_threshold_mult: 1.0,
        hz_mult: 1.0,
        tier_bias: 0.0,
        hysteresis_scale: 1.0,
    },
    ReactivityPreset {
        name: ReactivityPresetName::Aggressive,
        energy_mult: 1.22,
        beat_threshold_mult: 0.85,
        hz_mult: 1.25,
        tier_bias: 0.6,
        hysteresis_scale: 0.75,
    },
    ReactivityPreset {
        name: ReactivityPresetName::Precision,
        energy_mult: 0.85,
        beat_threshold_mult: 1.18,
        hz_mult: 0.82,
        tier_bias: -0.4,
        hysteresis_scale: 1.3,
    },
];

#[must_use]
pub fn reactivity_preset(name: ReactivityPresetName) -> &'static ReactivityPreset {
    REACTIVITY_PRESETS
        .iter()
        .find(|p| p.name == name)
        .unwrap_or(&REACTIVITY_PRESETS[0])
}

#[cfg(test)]
mod tests {
    use super::reactivity_preset;
    use lumen_core::ids::ReactivityPresetName;

    #[test]
    fn aggressive_pushes_hz_up_and_precision_down() {
        let balanced = reactivity_preset(ReactivityPresetName::Balanced);
        let aggressive = reactivity_preset(ReactivityPresetName::Aggressive);
        let precision = reactivity_preset(ReactivityPresetName::Precision);
        assert!(aggressive.hz_mult > balanced.hz_mult);
        assert!(precision.hz_mult < balanced.hz_mult);
    }
}
