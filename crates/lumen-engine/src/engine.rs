//! The engine: owns all per-tick mutable state behind a single mutex, and
//! exposes the external setter/ingress/telemetry surface.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use lumen_behavior::{BehaviorFsm, MemoryBank, Scene, SceneFsm, SceneMode};
use lumen_core::ids::{
    overclock_alias_to_level, AutoProfileName, GenreDecadeMode, GenreId, Phrase, ReactivityPresetName,
};
use lumen_core::{AudioFrame, Emitter, EngineConfig, EngineError, ExternalIntent, SetOutcome, SetResult, Telemetry};
use lumen_emit::{BrightnessSmoother, HueEmitter, WizEmitter};
use lumen_genre::{resolve_decade, Decade};
use lumen_palette::{Family, PaletteConfigStore, PaletteCycleState, SpectrumFeature};
use lumen_planner::{MetaPlan, MetaPlanner};
use lumen_tempo::{BeatDetector, EnergyFollower, ExternalBias, OnsetEstimator, PhraseDetector};

use crate::config_patch::{scene_from_str, PaletteConfigPatch, TempoTrackerMask};
use crate::overclock_auto::OverclockAutoPlanner;

/// Which cadence signal drives the spectrum-mapper palette cycle: the engine
/// tracks this alongside `PaletteConfig` since the palette layer itself has
/// no spectrum-mapping fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectrumMapMode {
    Auto,
    Manual,
}

/// Everything the tick loop reads and mutates. Lives behind `Engine`'s
/// mutex; `tick::run_tick` is the only function that advances it.
pub struct EngineInner {
    pub(crate) config: EngineConfig,
    pub(crate) now_ms: f32,
    pub(crate) stopped: bool,

    pub(crate) pending_frame: Option<AudioFrame>,

    pub(crate) energy: EnergyFollower,
    pub(crate) onset: OnsetEstimator,
    pub(crate) beat: BeatDetector,
    pub(crate) phrase: PhraseDetector,

    pub(crate) behavior_fsm: BehaviorFsm,
    pub(crate) scene_fsm: SceneFsm,
    pub(crate) scene_mode: SceneMode,
    pub(crate) scene_since_ms: f32,
    pub(crate) memory: MemoryBank,

    pub(crate) active_genre: GenreId,
    pub(crate) genre_ref_accum_ms: f32,
    pub(crate) decade_mode: GenreDecadeMode,
    pub(crate) active_decade: Decade,

    pub(crate) auto_profile_name: AutoProfileName,
    pub(crate) reactivity_name: ReactivityPresetName,

    pub(crate) meta_planner: MetaPlanner,
    pub(crate) meta_auto_enabled: bool,
    pub(crate) last_meta_plan: MetaPlan,

    pub(crate) overclock_auto: OverclockAutoPlanner,
    pub(crate) overclock_auto_enabled: bool,
    pub(crate) overclock_level: u8,

    pub(crate) tempo_tracker_mask: TempoTrackerMask,
    pub(crate) tempo_trackers_auto: bool,

    pub(crate) drop_active: bool,
    pub(crate) drop_decay_ms: f32,
    pub(crate) drop_detection_enabled: bool,

    pub(crate) external_bias: ExternalBias,
    pub(crate) neural_bias: f32,
    pub(crate) mode_switch_bias: f32,

    pub(crate) flow_intensity: f32,

    pub(crate) hue_emitter: HueEmitter,
    pub(crate) wiz_emitter: WizEmitter,
    pub(crate) wiz_scene_sync: bool,

    pub(crate) palette_store: PaletteConfigStore,
    pub(crate) hue_cycle: PaletteCycleState,
    pub(crate) wiz_cycle: PaletteCycleState,
    pub(crate) hue_cycle_elapsed_ms: f32,
    pub(crate) wiz_cycle_elapsed_ms: f32,

    pub(crate) spectrum_feature_map: Vec<SpectrumFeature>,
    pub(crate) spectrum_map_mode: SpectrumMapMode,

    pub(crate) telemetry_brightness: BrightnessSmoother,

    pub(crate) prev_bpm: f32,
    pub(crate) prev_energy: f32,
    pub(crate) prev_flux: f32,
    pub(crate) prev_band: f32,
    pub(crate) prev_phrase: Phrase,
    pub(crate) prev_scene: Scene,

    pub(crate) telemetry: Arc<ArcSwap<Telemetry>>,
}

impl EngineInner {
    fn new(config: EngineConfig) -> Self {
        let tempo_tracker_mask = TempoTrackerMask {
            baseline: config.tempo_tracker_baseline,
            peaks: config.tempo_tracker_peaks,
            transients: config.tempo_tracker_transients,
            flux: config.tempo_tracker_flux,
        };
        let overclock_level = config.default_overclock_level.min(12);
        let mut meta_planner = MetaPlanner::new();
        meta_planner.set_armed(config.meta_auto_default);

        Self {
            now_ms: 0.0,
            stopped: false,
            pending_frame: None,

            energy: EnergyFollower::new(),
            onset: OnsetEstimator::new(16.0),
            beat: BeatDetector::new(),
            phrase: PhraseDetector::new(),

            behavior_fsm: BehaviorFsm::new(),
            scene_fsm: SceneFsm::new(),
            scene_mode: SceneMode::Auto,
            scene_since_ms: 0.0,
            memory: MemoryBank::new(),

            active_genre: GenreId::House,
            genre_ref_accum_ms: 0.0,
            decade_mode: config.genre_decade_mode,
            active_decade: resolve_decade(config.genre_decade_mode, GenreId::House),

            auto_profile_name: config.auto_profile,
            reactivity_name: config.audio_reactivity_preset,

            meta_planner,
            meta_auto_enabled: config.meta_auto_default,
            last_meta_plan: MetaPlan::default(),

            overclock_auto: OverclockAutoPlanner::new(),
            overclock_auto_enabled: config.overclock_auto_default,
            overclock_level,

            tempo_tracker_mask,
            tempo_trackers_auto: config.tempo_trackers_auto,

            drop_active: false,
            drop_decay_ms: 0.0,
            drop_detection_enabled: config.drop_enabled,

            external_bias: ExternalBias::default(),
            neural_bias: 0.0,
            mode_switch_bias: 0.0,

            flow_intensity: config.flow_intensity,

            hue_emitter: HueEmitter::new(),
            wiz_emitter: WizEmitter::new(),
            wiz_scene_sync: config.wiz_scene_sync,

            palette_store: PaletteConfigStore::new(),
            hue_cycle: PaletteCycleState::new(),
            wiz_cycle: PaletteCycleState::new(),
            hue_cycle_elapsed_ms: 0.0,
            wiz_cycle_elapsed_ms: 0.0,

            spectrum_feature_map: vec![SpectrumFeature::Lows, SpectrumFeature::Mids, SpectrumFeature::Highs],
            spectrum_map_mode: SpectrumMapMode::Auto,

            telemetry_brightness: BrightnessSmoother::new(),

            prev_bpm: 0.0,
            prev_energy: 0.0,
            prev_flux: 0.0,
            prev_band: 0.0,
            prev_phrase: Phrase::Neutral,
            prev_scene: Scene::IdleSoft,

            config,
            telemetry: Arc::new(ArcSwap::from_pointee(Telemetry::default())),
        }
    }

    /// Restore every session-transient field to its fresh-engine default.
    /// Called from `Engine::start()` so stopping one track and starting
    /// another never carries stale energy/bpm/scene state into the new
    /// session. User-facing configuration — auto profile, reactivity
    /// preset, overclock level/auto, tempo-tracker mask, decade mode, drop
    /// detection, flow intensity, WiZ scene sync, spectrum mapping, palette
    /// config, and the bounded neural memory — survives a restart; only the
    /// audio-derived trackers, state machines, meta-planner bookkeeping,
    /// palette cycle state, brightness smoothers, and emit deadlines reset.
    fn reset(&mut self) {
        self.pending_frame = None;

        self.energy = EnergyFollower::new();
        self.onset = OnsetEstimator::new(16.0);
        self.beat = BeatDetector::new();
        self.phrase = PhraseDetector::new();

        self.behavior_fsm = BehaviorFsm::new();
        self.scene_fsm = SceneFsm::new();
        self.scene_mode = SceneMode::Auto;
        self.scene_since_ms = self.now_ms;

        self.active_genre = GenreId::House;
        self.genre_ref_accum_ms = 0.0;
        self.active_decade = resolve_decade(self.decade_mode, GenreId::House);

        self.meta_planner = MetaPlanner::new();
        self.meta_planner.set_armed(self.meta_auto_enabled);
        self.last_meta_plan = MetaPlan::default();

        self.overclock_auto = OverclockAutoPlanner::new();

        self.drop_active = false;
        self.drop_decay_ms = 0.0;

        self.external_bias = ExternalBias::default();
        self.neural_bias = 0.0;
        self.mode_switch_bias = 0.0;

        self.hue_emitter = HueEmitter::new();
        self.wiz_emitter = WizEmitter::new();

        self.hue_cycle = PaletteCycleState::new();
        self.wiz_cycle = PaletteCycleState::new();
        self.hue_cycle_elapsed_ms = 0.0;
        self.wiz_cycle_elapsed_ms = 0.0;

        self.telemetry_brightness = BrightnessSmoother::new();

        self.prev_bpm = 0.0;
        self.prev_energy = 0.0;
        self.prev_flux = 0.0;
        self.prev_band = 0.0;
        self.prev_phrase = Phrase::Neutral;
        self.prev_scene = Scene::IdleSoft;

        // `self.telemetry` and `Engine::telemetry` are two handles onto the
        // same `ArcSwap`; store into it rather than replacing it so readers
        // holding the `Engine` keep seeing updates.
        self.telemetry.store(Arc::new(Telemetry::default()));
    }
}

/// The orchestrator: a mutex-guarded [`EngineInner`] plus an atomically
/// published [`Telemetry`] snapshot readers can poll without contending with
/// the tick thread.
pub struct Engine {
    inner: Mutex<EngineInner>,
    telemetry: Arc<ArcSwap<Telemetry>>,
    emitter: Mutex<Box<dyn Emitter + Send>>,
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig, emitter: impl Emitter + Send + 'static) -> Self {
        let inner = EngineInner::new(config);
        let telemetry = Arc::clone(&inner.telemetry);
        Self { inner: Mutex::new(inner), telemetry, emitter: Mutex::new(Box::new(emitter)) }
    }

    /// Mark the engine as running. A fresh `Engine` starts stopped; `tick`
    /// is a no-op until this is called. Also resets every session-transient
    /// field (trackers, state machines, meta-planner bookkeeping, palette
    /// cycle state, brightness smoothers, emit deadlines) so a new session
    /// never inherits stale state from whatever ran before the last `stop`.
    pub fn start(&self) {
        let mut inner = self.inner.lock();
        inner.reset();
        inner.stopped = false;
    }

    /// Observed at the top of the next `tick` call; the tick loop performs
    /// no further work once stopped.
    pub fn stop(&self) {
        self.inner.lock().stopped = true;
    }

    /// Advance the engine by one tick of `dt_ms` milliseconds. Tick-body
    /// errors are logged and swallowed: the loop must never stop because one
    /// frame produced a bad intermediate value.
    pub fn tick(&self, dt_ms: f32) {
        let mut inner = self.inner.lock();
        if inner.stopped {
            return;
        }
        let mut emitter = self.emitter.lock();
        crate::tick::run_tick(&mut inner, dt_ms, emitter.as_mut());
    }

    /// Queue one audio feature frame for the next tick.
    pub fn ingest(&self, frame: AudioFrame) {
        self.inner.lock().pending_frame = Some(frame);
    }

    /// Push an externally sourced intent (MIDI/OSC/transport pressure).
    pub fn push(&self, intent: ExternalIntent) {
        let mut inner = self.inner.lock();
        match intent {
            ExternalIntent::MidiNote { velocity } => {
                inner.external_bias.midi_bias = (inner.external_bias.midi_bias + velocity).clamp(0.0, 1.0);
            }
            ExternalIntent::MidiCc { value, .. } => {
                inner.external_bias.midi_bias = (inner.external_bias.midi_bias + value * 0.5).clamp(0.0, 1.0);
            }
            ExternalIntent::OscEnergy { value } => {
                inner.external_bias.osc_bias = (inner.external_bias.osc_bias + value).clamp(0.0, 1.0);
            }
            ExternalIntent::OscBeat => {
                inner.external_bias.osc_bias = (inner.external_bias.osc_bias + 0.3).clamp(0.0, 1.0);
            }
            ExternalIntent::OscDrop | ExternalIntent::ForceDrop => {
                inner.drop_active = true;
                inner.drop_decay_ms = 0.0;
            }
            ExternalIntent::TransportPressure { raw, pressure, .. } => {
                let now_ms = inner.now_ms;
                inner.meta_planner.push_transport_sample(now_ms, raw, pressure);
            }
        }
    }

    /// The latest published telemetry snapshot. Lock-free: readers never
    /// contend with the tick thread.
    #[must_use]
    pub fn get_telemetry(&self) -> Arc<Telemetry> {
        self.telemetry.load_full()
    }

    pub fn set_overclock(&self, alias_or_level: &str) -> SetResult {
        let level = overclock_alias_to_level(alias_or_level)
            .ok_or_else(|| EngineError::UnknownVariant { field: "overclock", value: alias_or_level.to_string() })?;
        let mut inner = self.inner.lock();
        if inner.overclock_level == level {
            return Ok(SetOutcome::Ignored);
        }
        inner.overclock_level = level;
        inner.overclock_auto_enabled = false;
        Ok(SetOutcome::Applied)
    }

    pub fn set_auto_profile(&self, name: &str) -> SetResult {
        let parsed: AutoProfileName = name
            .parse()
            .map_err(|()| EngineError::UnknownVariant { field: "auto_profile", value: name.to_string() })?;
        let mut inner = self.inner.lock();
        if inner.auto_profile_name == parsed {
            return Ok(SetOutcome::Ignored);
        }
        inner.auto_profile_name = parsed;
        Ok(SetOutcome::Applied)
    }

    pub fn set_audio_reactivity_preset(&self, name: &str) -> SetResult {
        let parsed: ReactivityPresetName = name
            .parse()
            .map_err(|()| EngineError::UnknownVariant { field: "audio_reactivity_preset", value: name.to_string() })?;
        let mut inner = self.inner.lock();
        if inner.reactivity_name == parsed {
            return Ok(SetOutcome::Ignored);
        }
        inner.reactivity_name = parsed;
        Ok(SetOutcome::Applied)
    }

    /// `"auto"` restores automatic scene selection, `"flow"` locks to
    /// whichever flow scene the behavior/feature state currently selects,
    /// and any other name forces that concrete scene.
    pub fn set_scene(&self, name: &str) -> SetResult {
        let mut inner = self.inner.lock();
        let mode = match name {
            "auto" => SceneMode::Auto,
            "flow" => SceneMode::FlowLock,
            other => {
                let scene = scene_from_str(other)
                    .ok_or_else(|| EngineError::UnknownVariant { field: "scene", value: other.to_string() })?;
                SceneMode::Forced(scene)
            }
        };
        if inner.scene_mode == mode {
            return Ok(SetOutcome::Ignored);
        }
        inner.scene_mode = mode;
        Ok(SetOutcome::Applied)
    }

    /// Behavior is always `interpret`-driven; the only valid value is
    /// `"interpret"` and applying it is always a no-op.
    pub fn set_behavior(&self, name: &str) -> SetResult {
        if name != "interpret" {
            return Err(EngineError::UnknownVariant { field: "behavior", value: name.to_string() });
        }
        Ok(SetOutcome::Ignored)
    }

    pub fn set_drop_detection_enabled(&self, enabled: bool) -> SetResult {
        let mut inner = self.inner.lock();
        if inner.drop_detection_enabled == enabled {
            return Ok(SetOutcome::Ignored);
        }
        inner.drop_detection_enabled = enabled;
        Ok(SetOutcome::Applied)
    }

    pub fn set_flow_intensity(&self, value: f32) -> SetResult {
        if !(0.35..=2.5).contains(&value) {
            return Err(EngineError::InvalidConfig { field: "flow_intensity", value: value.to_string() });
        }
        let mut inner = self.inner.lock();
        if (inner.flow_intensity - value).abs() < f32::EPSILON {
            return Ok(SetOutcome::Ignored);
        }
        inner.flow_intensity = value;
        Ok(SetOutcome::Applied)
    }

    pub fn set_wiz_scene_sync(&self, enabled: bool) -> SetResult {
        let mut inner = self.inner.lock();
        if inner.wiz_scene_sync == enabled {
            return Ok(SetOutcome::Ignored);
        }
        inner.wiz_scene_sync = enabled;
        Ok(SetOutcome::Applied)
    }

    /// Enabling meta-auto disarms the Hz-only overclock-auto planner, and
    /// vice versa: the two auto-planners are mutually exclusive.
    pub fn set_meta_auto_enabled(&self, enabled: bool) -> SetResult {
        let mut inner = self.inner.lock();
        if inner.meta_auto_enabled == enabled {
            return Ok(SetOutcome::Ignored);
        }
        inner.meta_auto_enabled = enabled;
        inner.meta_planner.set_armed(enabled);
        if enabled {
            inner.overclock_auto_enabled = false;
        }
        Ok(SetOutcome::Applied)
    }

    pub fn set_overclock_auto_enabled(&self, enabled: bool) -> SetResult {
        let mut inner = self.inner.lock();
        if inner.overclock_auto_enabled == enabled {
            return Ok(SetOutcome::Ignored);
        }
        inner.overclock_auto_enabled = enabled;
        if enabled {
            inner.meta_auto_enabled = false;
            inner.meta_planner.set_armed(false);
        }
        Ok(SetOutcome::Applied)
    }

    pub fn set_meta_auto_tempo_trackers(&self, mask: TempoTrackerMask) -> SetResult {
        let mut inner = self.inner.lock();
        if inner.tempo_tracker_mask == mask {
            return Ok(SetOutcome::Ignored);
        }
        inner.tempo_tracker_mask = mask;
        inner.meta_planner.reset_tracker_election();
        Ok(SetOutcome::Applied)
    }

    pub fn set_meta_auto_tempo_trackers_auto(&self, auto: bool) -> SetResult {
        let mut inner = self.inner.lock();
        if inner.tempo_trackers_auto == auto {
            return Ok(SetOutcome::Ignored);
        }
        inner.tempo_trackers_auto = auto;
        inner.meta_planner.reset_tracker_election();
        Ok(SetOutcome::Applied)
    }

    pub fn set_palette_config(&self, patch: &PaletteConfigPatch) -> SetResult {
        let mut inner = self.inner.lock();
        let base = match patch.brand {
            Some(brand) => inner.palette_store.config_for_brand(brand).clone(),
            None => inner.palette_store.global().clone(),
        };
        let merged = patch.merge(&base);
        inner.palette_store.set_manual_palette_config(patch.brand, merged, patch.clear_override);
        Ok(SetOutcome::Applied)
    }

    pub fn set_spectrum_feature_map(&self, features: Vec<SpectrumFeature>) -> SetResult {
        let mut inner = self.inner.lock();
        inner.spectrum_feature_map = features.into_iter().take(5).collect();
        Ok(SetOutcome::Applied)
    }

    pub fn set_spectrum_map_mode_manual(&self, manual: bool) -> SetResult {
        let mut inner = self.inner.lock();
        inner.spectrum_map_mode = if manual { SpectrumMapMode::Manual } else { SpectrumMapMode::Auto };
        Ok(SetOutcome::Applied)
    }

    pub fn set_genre_decade_mode(&self, mode: GenreDecadeMode) -> SetResult {
        let mut inner = self.inner.lock();
        if inner.decade_mode == mode {
            return Ok(SetOutcome::Ignored);
        }
        inner.decade_mode = mode;
        Ok(SetOutcome::Applied)
    }

    pub fn set_palette_families_alias(&self, brand: Option<lumen_palette::Brand>, names: &[String]) -> SetResult {
        let families: Vec<Family> = names.iter().filter_map(|n| Family::resolve_alias(n)).collect();
        let patch = PaletteConfigPatch { brand, families: Some(families), ..PaletteConfigPatch::default() };
        self.set_palette_config(&patch)
    }
}

#[cfg(test)]
mod tests {
    use lumen_core::{EngineConfig, RecordingEmitter, SetOutcome};

    use super::Engine;

    fn running_engine() -> Engine {
        let engine = Engine::new(EngineConfig::default(), RecordingEmitter::default());
        engine.start();
        engine
    }

    #[test]
    fn fresh_engine_starts_stopped_and_ticks_are_inert() {
        let engine = Engine::new(EngineConfig::default(), RecordingEmitter::default());
        engine.tick(16.0);
        assert!((engine.get_telemetry().energy - 0.0).abs() < 1e-6);
    }

    #[test]
    fn started_engine_advances_telemetry_on_tick() {
        let engine = running_engine();
        for _ in 0..20 {
            engine.tick(16.0);
        }
        assert!(engine.get_telemetry().scene_age_ms < u64::MAX);
    }

    #[test]
    fn set_overclock_rejects_unknown_alias() {
        let engine = running_engine();
        assert!(engine.set_overclock("not-a-real-alias").is_err());
    }

    #[test]
    fn set_overclock_disables_overclock_auto() {
        let engine = running_engine();
        engine.set_overclock_auto_enabled(true).expect("enabling overclock-auto always succeeds");
        engine.set_overclock("x4").expect("x4 is a known overclock alias");
        assert!(!engine.inner.lock().overclock_auto_enabled);
    }

    #[test]
    fn set_overclock_same_level_is_ignored() {
        let engine = running_engine();
        engine.set_overclock("x4").expect("x4 is a known overclock alias");
        assert_eq!(engine.set_overclock("x4").expect("x4 is a known overclock alias"), SetOutcome::Ignored);
    }

    #[test]
    fn meta_auto_and_overclock_auto_are_mutually_exclusive() {
        let engine = running_engine();
        engine.set_overclock_auto_enabled(true).expect("enabling overclock-auto always succeeds");
        engine.set_meta_auto_enabled(true).expect("enabling meta-auto always succeeds");
        assert!(!engine.inner.lock().overclock_auto_enabled);
        engine.set_overclock_auto_enabled(true).expect("enabling overclock-auto always succeeds");
        assert!(!engine.inner.lock().meta_auto_enabled);
    }

    #[test]
    fn set_scene_parses_auto_flow_and_named_scenes() {
        let engine = running_engine();
        assert!(engine.set_scene("flow_storm").is_ok());
        assert!(engine.set_scene("flow").is_ok());
        assert!(engine.set_scene("auto").is_ok());
        assert!(engine.set_scene("not_a_scene").is_err());
    }

    #[test]
    fn set_flow_intensity_rejects_out_of_range_values() {
        let engine = running_engine();
        assert!(engine.set_flow_intensity(0.1).is_err());
        assert!(engine.set_flow_intensity(3.0).is_err());
        assert!(engine.set_flow_intensity(1.2).is_ok());
    }

    #[test]
    fn set_behavior_only_accepts_interpret() {
        let engine = running_engine();
        assert_eq!(engine.set_behavior("interpret").expect("interpret is the only valid behavior value"), SetOutcome::Ignored);
        assert!(engine.set_behavior("manual").is_err());
    }

    #[test]
    fn set_palette_families_alias_resolves_known_names() {
        let engine = running_engine();
        assert!(engine.set_palette_families_alias(None, &["magenta".to_string(), "lime".to_string()]).is_ok());
        let inner = engine.inner.lock();
        assert_eq!(inner.palette_store.global().families.len(), 2);
    }

    #[test]
    fn stop_then_tick_leaves_telemetry_unchanged() {
        let engine = running_engine();
        engine.tick(16.0);
        engine.stop();
        let before = engine.get_telemetry();
        engine.tick(16.0);
        let after = engine.get_telemetry();
        assert_eq!(before.scene_age_ms, after.scene_age_ms);
    }
}
