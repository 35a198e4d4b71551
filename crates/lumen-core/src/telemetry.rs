//! The flat, read-only observable-state snapshot handed out by
//! `get_telemetry()`.

use crate::frame::AudioFrame;
use crate::ids::{AutoProfileName, Behavior, GenreId, Phrase, ReactivityPresetName};
use crate::intent::BrightnessTier;

/// One immutable snapshot of everything observable about the engine.
///
/// Assembled once per tick and published via `ArcSwap::store`; readers call
/// `ArcSwap::load()` and never block the tick thread.
#[derive(Debug, Clone, PartialEq)]
pub struct Telemetry {
    pub frame: AudioFrame,
    pub energy: f32,
    pub intensity: f32,

    pub beat: bool,
    pub beat_confidence: f32,
    pub beat_interval_ms: f32,
    pub bpm: f32,
    pub onset_tempo_bpm: f32,
    pub onset_tempo_confidence: f32,

    pub phrase: Phrase,
    pub drop: bool,

    pub behavior: Behavior,
    pub scene: String,
    pub scene_age_ms: u64,

    pub brightness_tier: BrightnessTier,
    pub brightness_percent: f32,

    pub overclock_level: u8,
    pub auto_profile: AutoProfileName,
    pub audio_reactivity_preset: ReactivityPresetName,

    pub meta_auto_enabled: bool,
    pub meta_auto_reason: String,
    pub meta_auto_profile: AutoProfileName,
    pub meta_auto_genre: GenreId,
    pub meta_auto_reactivity: ReactivityPresetName,
    pub meta_auto_intent_hz: f32,
    pub meta_auto_applied_hz: f32,
    pub meta_auto_range_low_pct: f32,
    pub meta_auto_range_high_pct: f32,
    pub meta_auto_dominant_tracker: Option<crate::ids::TempoTracker>,
    pub meta_auto_overclock: u8,

    pub overclock_auto_enabled: bool,

    pub transport_pressure: f32,

    pub palette_families: Vec<String>,
    pub palette_colors_per_family: u8,
    pub palette_cycle_mode: String,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self {
            frame: AudioFrame::default(),
            energy: 0.0,
            intensity: 0.0,
            beat: false,
            beat_confidence: 0.0,
            beat_interval_ms: 0.0,
            bpm: 0.0,
            onset_tempo_bpm: 0.0,
            onset_tempo_confidence: 0.0,
            phrase: Phrase::Neutral,
            drop: false,
            behavior: Behavior::Idle,
            scene: "idle_soft".to_string(),
            scene_age_ms: 0,
            brightness_tier: BrightnessTier::Silent,
            brightness_percent: 0.0,
            overclock_level: 3,
            auto_profile: AutoProfileName::Balanced,
            audio_reactivity_preset: ReactivityPresetName::Balanced,
            meta_auto_enabled: false,
            meta_auto_reason: "idle".to_string(),
            meta_auto_profile: AutoProfileName::Balanced,
            meta_auto_genre: GenreId::House,
            meta_auto_reactivity: ReactivityPresetName::Balanced,
            meta_auto_intent_hz: 0.0,
            meta_auto_applied_hz: 0.0,
            meta_auto_range_low_pct: 0.0,
            meta_auto_range_high_pct: 0.0,
            meta_auto_dominant_tracker: None,
            meta_auto_overclock: 3,
            overclock_auto_enabled: false,
            transport_pressure: 0.0,
            palette_families: Vec::new(),
            palette_colors_per_family: 5,
            palette_cycle_mode: "on_trigger".to_string(),
        }
    }
}
