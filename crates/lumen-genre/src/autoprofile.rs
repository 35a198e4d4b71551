//! Auto-profile table: behavior/scene debounce timings and hysteresis.

use lumen_core::ids::AutoProfileName;

/// Debounce/hysteresis timing preset for the behavior and scene machines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoProfile {
    pub name: AutoProfileName,
    pub confirm_ms: f32,
    pub hold_ms: f32,
    pub hysteresis: f32,
    pub scene_confirm_ms: f32,
    pub scene_hold_ms: f32,
    pub overclock_bump: u8,
}

pub const AUTO_PROFILES: [AutoProfile; 3] = [
    AutoProfile {
        name: AutoProfileName::Reactive,
        confirm_ms: 90.0,
        hold_ms: 220.0,
        hysteresis: 0.03,
        scene_confirm_ms: 140.0,
        scene_hold_ms: 320.0,
        overclock_bump: 1,
    },
    AutoProfile {
        name: AutoProfileName::Balanced,
        confirm_ms: 160.0,
        hold_ms: 420.0,
        hysteresis: 0.05,
        scene_confirm_ms: 260.0,
        scene_hold_ms: 600.0,
        overclock_bump: 0,
    },
    AutoProfile {
        name: AutoProfileName::Cinematic,
        confirm_ms: 320.0,
        hold_ms: 900.0,
        hysteresis: 0.08,
        scene_confirm_ms: 520.0,
        scene_hold_ms: 1400.0,
        overclock_bump: 0,
    },
];

#[must_use]
pub fn auto_profile(name: AutoProfileName) -> &'static AutoProfile {
    AUTO_PROFILES.iter().find(|p| p.name == name).unwrap_or(&AUTO_PROFILES[1])
}

#[cfg(test)]
mod tests {
    use super::auto_profile;
    use lumen_core::ids::AutoProfileName;

    #[test]
    fn reactive_is_faster_than_cinematic() {
        let reactive = auto_profile(AutoProfileName::Reactive);
        let cinematic = auto_profile(AutoProfileName::Cinematic);
        assert!(reactive.confirm_ms < cinematic.confirm_ms);
        assert!(reactive.hold_ms < cinematic.hold_ms);
    }
}
