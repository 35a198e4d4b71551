//! Runtime patch types for the setter surface: scene name parsing, the tempo
//! tracker allow-mask, and the palette configuration patch merged onto the
//! active `PaletteConfig`.

use lumen_behavior::Scene;
use lumen_core::ids::TempoTracker;
use lumen_palette::{Brand, CycleMode, Family, PaletteConfig};

/// Resolve a wire-format scene name (as produced by [`Scene::as_str`]) back
/// to its variant. Case-insensitive.
#[must_use]
pub fn scene_from_str(name: &str) -> Option<Scene> {
    match name.to_ascii_lowercase().as_str() {
        "idle_soft" => Some(Scene::IdleSoft),
        "flow_wash" => Some(Scene::FlowWash),
        "flow_edm" => Some(Scene::FlowEdm),
        "flow_hiphop" => Some(Scene::FlowHipHop),
        "flow_metal" => Some(Scene::FlowMetal),
        "flow_ambient" => Some(Scene::FlowAmbient),
        "flow_house" => Some(Scene::FlowHouse),
        "flow_trance" => Some(Scene::FlowTrance),
        "flow_dnb" => Some(Scene::FlowDnb),
        "flow_pop" => Some(Scene::FlowPop),
        "flow_rock" => Some(Scene::FlowRock),
        "flow_rnb" => Some(Scene::FlowRnb),
        "flow_media" => Some(Scene::FlowMedia),
        "flow_techno" => Some(Scene::FlowTechno),
        "flow_cyberpunk" => Some(Scene::FlowCyberpunk),
        "flow_sunset" => Some(Scene::FlowSunset),
        "flow_glacier" => Some(Scene::FlowGlacier),
        "flow_storm" => Some(Scene::FlowStorm),
        "pulse_strobe" => Some(Scene::PulseStrobe),
        _ => None,
    }
}

/// Which tempo trackers the meta-auto planner's election is allowed to pick
/// from. All four are enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoTrackerMask {
    pub baseline: bool,
    pub peaks: bool,
    pub transients: bool,
    pub flux: bool,
}

impl Default for TempoTrackerMask {
    fn default() -> Self {
        Self { baseline: true, peaks: true, transients: true, flux: true }
    }
}

impl TempoTrackerMask {
    /// Expand into the `[TempoTracker::Baseline, Peaks, Transients, Flux]`
    /// order the meta-planner expects.
    #[must_use]
    pub fn as_array(self) -> [bool; 4] {
        [self.baseline, self.peaks, self.transients, self.flux]
    }

    /// True when `tracker` is allowed under this mask.
    #[must_use]
    pub fn allows(self, tracker: TempoTracker) -> bool {
        match tracker {
            TempoTracker::Baseline => self.baseline,
            TempoTracker::Peaks => self.peaks,
            TempoTracker::Transients => self.transients,
            TempoTracker::Flux => self.flux,
        }
    }
}

/// A partial update to a `PaletteConfig`, as accepted by `setPaletteConfig`.
///
/// Every field is optional: absent fields leave the current value in place.
/// `brand` selects which brand-specific override to write (`None` writes the
/// global config); `clear_override` drops a brand override back to the
/// global config instead of writing one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaletteConfigPatch {
    pub brand: Option<Brand>,
    pub clear_override: bool,
    pub families: Option<Vec<Family>>,
    pub colors_per_family: Option<usize>,
    pub disorder: Option<bool>,
    pub disorder_aggression: Option<f32>,
    pub cycle_mode: Option<CycleMode>,
    pub timed_interval_sec: Option<f32>,
    pub beat_lock: Option<bool>,
    pub beat_lock_grace_sec: Option<f32>,
    pub reactive_margin: Option<f32>,
    pub manual_active: Option<bool>,
}

impl PaletteConfigPatch {
    /// Apply this patch onto `base`, leaving every unset field unchanged.
    #[must_use]
    pub fn merge(&self, base: &PaletteConfig) -> PaletteConfig {
        let mut out = base.clone();
        if let Some(families) = &self.families {
            out.families = families.clone();
        }
        if let Some(v) = self.colors_per_family {
            out.colors_per_family = v;
        }
        if let Some(v) = self.disorder {
            out.disorder = v;
        }
        if let Some(v) = self.disorder_aggression {
            out.disorder_aggression = v.clamp(0.0, 1.0);
        }
        if let Some(v) = self.cycle_mode {
            out.cycle_mode = v;
        }
        if let Some(v) = self.timed_interval_sec {
            out.timed_interval_sec = v.max(0.1);
        }
        if let Some(v) = self.beat_lock {
            out.beat_lock = v;
        }
        if let Some(v) = self.beat_lock_grace_sec {
            out.beat_lock_grace_ms = (v * 1000.0).max(0.0);
        }
        if let Some(v) = self.reactive_margin {
            out.reactive_margin = v.max(0.0);
        }
        if let Some(v) = self.manual_active {
            out.manual_active = v;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{scene_from_str, PaletteConfigPatch, TempoTrackerMask};
    use lumen_behavior::Scene;
    use lumen_palette::PaletteConfig;

    #[test]
    fn scene_from_str_round_trips_every_variant() {
        for scene in [
            Scene::IdleSoft,
            Scene::FlowWash,
            Scene::FlowEdm,
            Scene::FlowHipHop,
            Scene::FlowMetal,
            Scene::FlowAmbient,
            Scene::FlowHouse,
            Scene::FlowTrance,
            Scene::FlowDnb,
            Scene::FlowPop,
            Scene::FlowRock,
            Scene::FlowRnb,
            Scene::FlowMedia,
            Scene::FlowTechno,
            Scene::FlowCyberpunk,
            Scene::FlowSunset,
            Scene::FlowGlacier,
            Scene::FlowStorm,
            Scene::PulseStrobe,
        ] {
            assert_eq!(scene_from_str(scene.as_str()), Some(scene));
        }
    }

    #[test]
    fn scene_from_str_rejects_unknown_names() {
        assert_eq!(scene_from_str("nonexistent"), None);
    }

    #[test]
    fn tempo_tracker_mask_defaults_all_enabled() {
        assert_eq!(TempoTrackerMask::default().as_array(), [true, true, true, true]);
    }

    #[test]
    fn palette_patch_only_touches_set_fields() {
        let base = PaletteConfig::default();
        let patch = PaletteConfigPatch { disorder: Some(true), ..PaletteConfigPatch::default() };
        let merged = patch.merge(&base);
        assert!(merged.disorder);
        assert_eq!(merged.colors_per_family, base.colors_per_family);
    }

    #[test]
    fn palette_patch_converts_grace_seconds_to_millis() {
        let base = PaletteConfig::default();
        let patch = PaletteConfigPatch { beat_lock_grace_sec: Some(2.0), ..PaletteConfigPatch::default() };
        let merged = patch.merge(&base);
        assert!((merged.beat_lock_grace_ms - 2000.0).abs() < 1e-6);
    }
}
