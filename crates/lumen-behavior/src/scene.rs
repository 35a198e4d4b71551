//! Scene selection: the concrete parameterized visual template chosen per
//! behavior, with its own independent debounce.

use crate::debounce::DebounceGate;
use lumen_core::ids::Behavior;
use lumen_genre::AutoProfile;

/// The closed set of scene identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scene {
    IdleSoft,
    FlowWash,
    FlowEdm,
    FlowHipHop,
    FlowMetal,
    FlowAmbient,
    FlowHouse,
    FlowTrance,
    FlowDnb,
    FlowPop,
    FlowRock,
    FlowRnb,
    FlowMedia,
    FlowTechno,
    FlowCyberpunk,
    FlowSunset,
    FlowGlacier,
    FlowStorm,
    PulseStrobe,
}

impl Scene {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IdleSoft => "idle_soft",
            Self::FlowWash => "flow_wash",
            Self::FlowEdm => "flow_edm",
            Self::FlowHipHop => "flow_hiphop",
            Self::FlowMetal => "flow_metal",
            Self::FlowAmbient => "flow_ambient",
            Self::FlowHouse => "flow_house",
            Self::FlowTrance => "flow_trance",
            Self::FlowDnb => "flow_dnb",
            Self::FlowPop => "flow_pop",
            Self::FlowRock => "flow_rock",
            Self::FlowRnb => "flow_rnb",
            Self::FlowMedia => "flow_media",
            Self::FlowTechno => "flow_techno",
            Self::FlowCyberpunk => "flow_cyberpunk",
            Self::FlowSunset => "flow_sunset",
            Self::FlowGlacier => "flow_glacier",
            Self::FlowStorm => "flow_storm",
            Self::PulseStrobe => "pulse_strobe",
        }
    }

    #[must_use]
    pub fn is_flow(self) -> bool {
        !matches!(self, Self::IdleSoft | Self::PulseStrobe)
    }
}

/// Static shaping parameters for one scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneParams {
    pub scene: Scene,
    pub saturation_floor: f32,
    pub brightness_base: f32,
    pub brightness_scale: f32,
    pub brightness_wave: f32,
    pub hue_step: f32,
    pub hue_swing: f32,
    pub time_div: f32,
    pub transition: u8,
    pub beat_lift: f32,
    pub drop_lift: f32,
    pub min_brightness: f32,
    pub max_brightness: f32,
}

macro_rules! scene_params {
    ($scene:expr, $sat:expr, $b_base:expr, $b_scale:expr, $b_wave:expr, $hue_step:expr, $hue_swing:expr,
     $time_div:expr, $transition:expr, $beat_lift:expr, $drop_lift:expr, $min_b:expr, $max_b:expr) => {
        SceneParams {
            scene: $scene,
            saturation_floor: $sat,
            brightness_base: $b_base,
            brightness_scale: $b_scale,
            brightness_wave: $b_wave,
            hue_step: $hue_step,
            hue_swing: $hue_swing,
            time_div: $time_div,
            transition: $transition,
            beat_lift: $beat_lift,
            drop_lift: $drop_lift,
            min_brightness: $min_b,
            max_brightness: $max_b,
        }
    };
}

pub const SCENE_PARAMS: [SceneParams; 19] = [
    scene_params!(Scene::IdleSoft, 0.35, 0.1, 0.1, 0.08, 12.0, 600.0, 4000.0, 15, 0.02, 0.0, 0.05, 0.4),
    scene_params!(Scene::FlowWash, 0.55, 0.45, 0.25, 0.12, 40.0, 3200.0, 3500.0, 6, 0.08, 0.15, 0.1, 0.85),
    scene_params!(Scene::FlowEdm, 0.7, 0.55, 0.35, 0.2, 90.0, 4800.0, 1800.0, 3, 0.15, 0.25, 0.12, 0.95),
    scene_params!(Scene::FlowHipHop, 0.6, 0.48, 0.28, 0.14, 55.0, 2800.0, 2600.0, 5, 0.12, 0.2, 0.1, 0.9),
    scene_params!(Scene::FlowMetal, 0.65, 0.5, 0.4, 0.22, 110.0, 5200.0, 1500.0, 2, 0.2, 0.3, 0.14, 1.0),
    scene_params!(Scene::FlowAmbient, 0.4, 0.3, 0.15, 0.06, 18.0, 1200.0, 6000.0, 10, 0.04, 0.08, 0.06, 0.6),
    scene_params!(Scene::FlowHouse, 0.65, 0.5, 0.3, 0.16, 65.0, 3600.0, 2400.0, 4, 0.14, 0.22, 0.1, 0.92),
    scene_params!(Scene::FlowTrance, 0.6, 0.5, 0.32, 0.18, 70.0, 4000.0, 2200.0, 4, 0.13, 0.2, 0.1, 0.92),
    scene_params!(Scene::FlowDnb, 0.7, 0.55, 0.4, 0.24, 120.0, 5600.0, 1300.0, 2, 0.22, 0.32, 0.15, 1.0),
    scene_params!(Scene::FlowPop, 0.55, 0.46, 0.26, 0.12, 50.0, 2600.0, 2800.0, 5, 0.1, 0.18, 0.1, 0.88),
    scene_params!(Scene::FlowRock, 0.58, 0.48, 0.3, 0.16, 60.0, 3200.0, 2200.0, 4, 0.14, 0.22, 0.12, 0.9),
    scene_params!(Scene::FlowRnb, 0.5, 0.42, 0.22, 0.1, 35.0, 2000.0, 3600.0, 7, 0.08, 0.14, 0.08, 0.82),
    scene_params!(Scene::FlowMedia, 0.45, 0.4, 0.2, 0.1, 25.0, 1800.0, 4200.0, 8, 0.06, 0.12, 0.06, 0.75),
    scene_params!(Scene::FlowTechno, 0.65, 0.5, 0.34, 0.18, 85.0, 4400.0, 1900.0, 3, 0.16, 0.24, 0.12, 0.95),
    scene_params!(Scene::FlowCyberpunk, 0.72, 0.52, 0.36, 0.2, 100.0, 4600.0, 1700.0, 3, 0.18, 0.26, 0.13, 0.96),
    scene_params!(Scene::FlowSunset, 0.5, 0.4, 0.2, 0.1, 20.0, 1500.0, 5000.0, 9, 0.05, 0.1, 0.08, 0.7),
    scene_params!(Scene::FlowGlacier, 0.42, 0.38, 0.18, 0.08, 22.0, 1600.0, 4800.0, 9, 0.05, 0.1, 0.07, 0.68),
    scene_params!(Scene::FlowStorm, 0.75, 0.58, 0.42, 0.26, 130.0, 6000.0, 1100.0, 2, 0.24, 0.36, 0.16, 1.0),
    scene_params!(Scene::PulseStrobe, 0.3, 0.7, 0.3, 0.3, 200.0, 65535.0, 300.0, 1, 0.3, 0.45, 0.2, 1.0),
];

#[must_use]
pub fn scene_params(scene: Scene) -> &'static SceneParams {
    SCENE_PARAMS.iter().find(|p| p.scene == scene).unwrap_or(&SCENE_PARAMS[0])
}

/// Instantaneous features the flow sub-selector reads. `activeGenre` is
/// intentionally absent: the sub-selector is pinned to feature-only
/// selection regardless of the classified genre.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowFeatures {
    pub drop: bool,
    pub build: bool,
    pub flux: f32,
    pub drive: f32,
    pub band_low: f32,
    pub band_mid: f32,
    pub band_high: f32,
    pub intensity: f32,
    pub calm: f32,
    pub percussive: f32,
}

/// Pick among the flow scenes from instantaneous features only.
#[must_use]
pub fn select_flow_scene(f: &FlowFeatures) -> Scene {
    if f.drop || (f.flux > 0.6 && f.drive > 0.75) {
        return Scene::FlowStorm;
    }
    if f.band_low > 0.65 && f.intensity > 0.6 && f.percussive > 0.6 {
        return Scene::FlowDnb;
    }
    if f.band_mid > 0.6 && f.drive > 0.45 {
        return Scene::FlowCyberpunk;
    }
    if f.band_high > 0.6 {
        return Scene::FlowGlacier;
    }
    if f.calm > 0.7 {
        return Scene::FlowSunset;
    }
    if f.build && f.drive > 0.5 {
        return Scene::FlowEdm;
    }
    Scene::FlowWash
}

/// How the caller's `setScene` request constrains selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneMode {
    /// Fully automatic: behavior drives idle/pulse, the flow sub-selector
    /// drives flow.
    Auto,
    /// `setScene("flow")`: re-selects the flow sub-scene every tick, same
    /// as `Auto`'s flow branch, but active even while behavior != flow.
    FlowLock,
    /// `setScene(name)`: pinned to exactly this scene.
    Forced(Scene),
}

/// The scene machine: behavior-gated selection plus independent debounce.
#[derive(Debug, Clone)]
pub struct SceneFsm {
    gate: DebounceGate<Scene>,
    flow_gate: DebounceGate<Scene>,
}

impl Default for SceneFsm {
    fn default() -> Self {
        Self { gate: DebounceGate::new(Scene::IdleSoft), flow_gate: DebounceGate::new(Scene::FlowWash) }
    }
}

impl SceneFsm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Scene {
        self.gate.stable
    }

    pub fn update(
        &mut self,
        now_ms: f32,
        behavior: Behavior,
        features: &FlowFeatures,
        mode: SceneMode,
        auto: &AutoProfile,
    ) -> Scene {
        if let SceneMode::Forced(s) = mode {
            return self.gate.propose(s, now_ms, 0.0, 0.0, true);
        }

        // The flow sub-selector has its own debounce, on top of the outer
        // behavior-level one.
        let flow_candidate = self.flow_gate.propose(
            select_flow_scene(features),
            now_ms,
            auto.scene_confirm_ms * 0.6,
            auto.scene_hold_ms * 0.6,
            features.drop,
        );

        let desired = if mode == SceneMode::FlowLock {
            flow_candidate
        } else {
            match behavior {
                Behavior::Idle => Scene::IdleSoft,
                Behavior::Pulse => Scene::PulseStrobe,
                Behavior::Flow => flow_candidate,
            }
        };

        let extreme = features.drop || features.build || features.drive > 0.85;
        let confirm_ms = if extreme { auto.scene_confirm_ms * 0.5 } else { auto.scene_confirm_ms };
        let hold_ms = if extreme { auto.scene_hold_ms * 0.5 } else { auto.scene_hold_ms };

        // Emergency exit: pulse_strobe collapses to a flow scene when drive
        // and every audio field has collapsed, with no drop in play.
        let emergency_exit = self.gate.stable == Scene::PulseStrobe
            && !features.drop
            && features.drive < 0.2
            && features.band_low < 0.2
            && features.band_mid < 0.2
            && features.band_high < 0.2;
        if emergency_exit {
            return self.gate.propose(flow_candidate, now_ms, 0.0, 0.0, true);
        }

        self.gate.propose(desired, now_ms, confirm_ms, hold_ms, features.drop)
    }
}

#[cfg(test)]
mod tests {
    use super::{FlowFeatures, Scene, SceneFsm, SceneMode};
    use lumen_core::ids::Behavior;
    use lumen_core::ids::AutoProfileName;
    use lumen_genre::auto_profile;

    #[test]
    fn idle_behavior_selects_idle_soft() {
        let mut fsm = SceneFsm::new();
        let auto = auto_profile(AutoProfileName::Reactive);
        let scene = fsm.update(0.0, Behavior::Idle, &FlowFeatures::default(), SceneMode::Auto, auto);
        assert_eq!(scene, Scene::IdleSoft);
    }

    #[test]
    fn drop_feature_selects_storm_under_flow() {
        let f = FlowFeatures { drop: true, ..FlowFeatures::default() };
        assert_eq!(super::select_flow_scene(&f), Scene::FlowStorm);
    }

    #[test]
    fn forced_scene_overrides_selection_immediately() {
        let mut fsm = SceneFsm::new();
        let auto = auto_profile(AutoProfileName::Cinematic);
        let scene = fsm.update(
            0.0,
            Behavior::Idle,
            &FlowFeatures::default(),
            SceneMode::Forced(Scene::FlowMetal),
            auto,
        );
        assert_eq!(scene, Scene::FlowMetal);
    }
}
