//! The per-tick pipeline: ingest one audio frame, advance every state
//! machine in dependency order, resolve both brands' palettes, and emit the
//! two lighting intent streams plus a fresh telemetry snapshot.

use std::sync::Arc;

use lumen_behavior::{BehaviorInputs, FlowFeatures};
use lumen_core::color::rgb_to_hsv;
use lumen_core::ids::Phrase;
use lumen_core::{AudioFrame, Emitter, Telemetry};
use lumen_emit::{brightness_tier, desync_scene, CadenceSignal, HueEmitInputs, WizEmitInputs};
use lumen_genre::{auto_profile, decade_bias, profile_for, reactivity_preset, resolve_decade, ClassifierFeatures};
use lumen_palette::{build_sequence, pick_evenly, vibrancy_tune, Brand, CycleSignal, Family, SpectrumFeature};
use lumen_planner::MetaPlanInputs;
use lumen_tempo::{ingest, BeatCoeffs, EnergyCoeffs, OnsetEstimator, PhraseCoeffs};

use crate::engine::EngineInner;

/// How long an `OscDrop`/`ForceDrop` push forces `external_drop` into the
/// phrase detector before releasing it back to organic trend detection.
const DROP_PULSE_MS: f32 = 300.0;
/// How often the active genre/decade pair is refreshed from the
/// classifier's debounced pick.
const GENRE_REFRESH_INTERVAL_MS: f32 = 1600.0;
/// Per-tick decay applied to MIDI/OSC external energy biases.
const EXTERNAL_BIAS_DECAY: f32 = 0.9;
/// How much a tick's chosen behavior reinforces the active genre's memory.
const MEMORY_REINFORCE_AMOUNT: f32 = 0.02;

/// Advance `inner` by one tick of `dt_ms` and hand both lighting intents to
/// `emitter`. Every step here is plain float math; nothing in this
/// pipeline produces an `EngineError`, so there is nothing to swallow.
pub(crate) fn run_tick(inner: &mut EngineInner, dt_ms: f32, emitter: &mut dyn Emitter) -> Telemetry {
    inner.now_ms += dt_ms;
    let now_ms = inner.now_ms;

    let raw_frame = inner.pending_frame.take().unwrap_or_default();
    let frame = ingest(raw_frame);
    let silent = frame == AudioFrame::zeroed();

    let mut genre_profile = *profile_for(inner.active_genre);
    let decade = decade_bias(inner.active_decade);
    genre_profile.idle_offset += decade.idle_offset_delta;
    genre_profile.flow_offset += decade.flow_offset_delta;

    let auto_profile_name =
        if inner.meta_auto_enabled { inner.last_meta_plan.auto_profile } else { inner.auto_profile_name };
    let reactivity_name = if inner.meta_auto_enabled { inner.last_meta_plan.reactivity } else { inner.reactivity_name };
    let auto = auto_profile(auto_profile_name);
    let reactivity = reactivity_preset(reactivity_name);

    let energy_coeffs = EnergyCoeffs {
        audio_gain: genre_profile.audio_gain * reactivity.energy_mult,
        peak_lift: genre_profile.peak_lift,
        transient_lift: genre_profile.transient_lift,
        zcr_lift: genre_profile.zcr_lift,
        band_lift: genre_profile.band_lift,
        flux_lift: genre_profile.flux_lift,
        vocal_penalty: genre_profile.vocal_penalty,
        quiet_rms_gate: genre_profile.quiet_rms_gate,
        quiet_transient_gate: genre_profile.quiet_transient_gate,
        quiet_flux_gate: genre_profile.quiet_flux_gate,
        intensity_flux: genre_profile.intensity_flux,
        intensity_high: genre_profile.intensity_high,
    };
    inner.energy.update(&frame, &energy_coeffs, inner.external_bias, inner.drop_active);
    let energy = inner.energy.energy;
    let intensity = inner.energy.intensity(&frame, &energy_coeffs);

    let low_rise = (frame.band_low - inner.prev_band).max(0.0);
    let onset_val =
        OnsetEstimator::compute_onset(frame.spectral_flux, frame.transient, low_rise, frame.peak, frame.rms);
    inner.onset.push(onset_val);

    let drums_drive = (frame.band_low * 0.6 + frame.transient * 0.4).clamp(0.0, 1.0);
    let beat_coeffs = BeatCoeffs {
        threshold_base: (genre_profile.beat_threshold_base + genre_profile.beat_threshold_bias)
            * reactivity.beat_threshold_mult,
        threshold_transient_scale: genre_profile.beat_threshold_transient_scale,
        threshold_flux_scale: genre_profile.beat_threshold_flux_scale,
        rise_gate_base: genre_profile.beat_rise_gate_base + genre_profile.beat_rise_bias,
        rise_gate_overdue_relief: genre_profile.beat_rise_gate_overdue_relief,
        beat_gap_scale: genre_profile.beat_gap_scale,
    };
    let beat = inner.beat.detect(now_ms, energy, &frame, inner.onset.bpm, drums_drive, &beat_coeffs);

    // Proxy signals: the corpus this was distilled from reads these off a
    // dedicated drum-stem channel the core has no access to, so transient
    // and low-band energy stand in for it here.
    let motion = frame.transient.max(frame.spectral_flux).max(inner.beat.confidence).max(drums_drive);
    let body = (frame.band_low * 0.5 + frame.transient * 0.5).clamp(0.0, 1.0);
    let drive = (energy * 0.5 + body * 0.3 + motion * 0.2).clamp(0.0, 1.0);

    if inner.drop_active {
        inner.drop_decay_ms += dt_ms;
        if inner.drop_decay_ms >= DROP_PULSE_MS {
            inner.drop_active = false;
            inner.drop_decay_ms = 0.0;
        }
    }

    let phrase_coeffs = PhraseCoeffs {
        build_trend: genre_profile.build_trend,
        build_energy: genre_profile.build_energy,
        drop_slope: genre_profile.drop_slope,
        drop_energy_gate: genre_profile.drop_energy_gate,
        recover_trend: genre_profile.recover_trend,
    };
    let phrase =
        inner.phrase.update(energy, dt_ms, inner.beat.bpm, inner.drop_detection_enabled, inner.drop_active, &phrase_coeffs);
    let drop = phrase == Phrase::Drop;
    let build = phrase == Phrase::Build;

    inner.neural_bias = inner.memory.threshold_bias(inner.active_genre);
    let behavior_overclock = inner.overclock_level.saturating_add(auto.overclock_bump).min(12);
    let behavior_inputs = BehaviorInputs {
        now_ms,
        energy,
        transient: frame.transient,
        flux: frame.spectral_flux,
        rms: frame.rms,
        motion,
        phrase,
        neural_bias: inner.neural_bias,
        mode_switch_bias: inner.mode_switch_bias,
        overclock_level: behavior_overclock,
    };
    let behavior = inner.behavior_fsm.update(&behavior_inputs, &genre_profile, auto);
    inner.memory.reinforce(inner.active_genre, behavior, MEMORY_REINFORCE_AMOUNT);

    let calm = (1.0 - energy).clamp(0.0, 1.0);
    let flow_features = FlowFeatures {
        drop,
        build,
        flux: frame.spectral_flux,
        drive,
        band_low: frame.band_low,
        band_mid: frame.band_mid,
        band_high: frame.band_high,
        intensity,
        calm,
        percussive: drums_drive,
    };
    let scene = inner.scene_fsm.update(now_ms, behavior, &flow_features, inner.scene_mode, auto);
    if scene != inner.prev_scene {
        inner.scene_since_ms = now_ms;
    }
    let scene_age_ms = (now_ms - inner.scene_since_ms).max(0.0) as u64;

    let classifier = ClassifierFeatures {
        percussive: (frame.transient * 0.7 + inner.beat.confidence * 0.3).clamp(0.0, 1.0),
        groove: inner.onset.confidence,
        bass_weight: frame.band_low,
        high_weight: frame.band_high,
        harmonic: ((1.0 - frame.zcr).max(0.0) * (1.0 - frame.transient).max(0.0)).clamp(0.0, 1.0),
        calmness: ((1.0 - energy) * 0.7 + (1.0 - frame.spectral_flux) * 0.3).clamp(0.0, 1.0),
        build_bonus: f32::from(build),
        drop_bonus: f32::from(drop),
    };
    let allowed_trackers =
        if inner.tempo_trackers_auto { [true, true, true, true] } else { inner.tempo_tracker_mask.as_array() };
    let tempo_bpm = if inner.beat.bpm > 0.0 { inner.beat.bpm } else { inner.onset.bpm };
    let tempo_confidence = if inner.beat.bpm > 0.0 { inner.beat.confidence } else { inner.onset.confidence };

    let meta_inputs = MetaPlanInputs {
        drive,
        motion,
        drums_drive,
        tempo_bpm,
        tempo_confidence,
        beat_confidence: inner.beat.confidence,
        transient: frame.transient,
        flux: frame.spectral_flux,
        audio_peak: frame.peak,
        silence: silent,
        drop,
        build,
        classifier,
        allowed_trackers,
        trackers_auto: inner.tempo_trackers_auto,
        transport_raw: None,
    };
    let plan = inner.meta_planner.update(now_ms, dt_ms, &meta_inputs);
    inner.last_meta_plan = plan;

    inner.genre_ref_accum_ms += dt_ms;
    if inner.genre_ref_accum_ms >= GENRE_REFRESH_INTERVAL_MS {
        inner.genre_ref_accum_ms = 0.0;
        inner.active_genre = inner.meta_planner.classified_genre();
        inner.active_decade = resolve_decade(inner.decade_mode, inner.active_genre);
    }

    if inner.meta_auto_enabled {
        inner.overclock_level = plan.overclock_level;
    } else if inner.overclock_auto_enabled {
        inner.overclock_level = inner.overclock_auto.update(drive, motion);
    }

    inner.hue_emitter.set_overclock_level(now_ms, inner.overclock_level);
    inner.wiz_emitter.set_overclock_level(now_ms, inner.overclock_level);

    let hue_cfg = inner.palette_store.config_for_brand(Brand::Hue).clone();
    let manual_hue_sat = if hue_cfg.manual_active {
        let sig = CycleSignal {
            now_ms,
            trigger_hint: beat || drop,
            drop,
            motion,
            beat,
            elapsed_since_last_advance_ms: inner.hue_cycle_elapsed_ms,
            timed_interval_sec: hue_cfg.timed_interval_sec,
            beat_lock: hue_cfg.beat_lock,
            beat_lock_grace_ms: hue_cfg.beat_lock_grace_ms,
            bpm_delta: inner.beat.bpm - inner.prev_bpm,
            energy_delta: energy - inner.prev_energy,
            flux_delta: frame.spectral_flux - inner.prev_flux,
            band_delta: frame.band_low - inner.prev_band,
            phrase_shift: phrase != inner.prev_phrase,
            scene_shift: scene != inner.prev_scene,
            event_boost: if drop { 1.0 } else { 0.0 },
            reactive_margin: hue_cfg.reactive_margin,
            spectrum_slot_values: spectrum_slot_values(&inner.spectrum_feature_map, &frame, energy, beat),
        };
        inner.hue_cycle_elapsed_ms += dt_ms;
        let prev_index = inner.hue_cycle.current_index;
        let family_idx = inner.hue_cycle.resolve_index_for_emit(hue_cfg.families.len(), hue_cfg.cycle_mode, &sig);
        if inner.hue_cycle.current_index != prev_index {
            inner.hue_cycle_elapsed_ms = 0.0;
        }
        let family = hue_cfg.families.get(family_idx).copied().unwrap_or(Family::Blue);
        let swatches: Vec<(u8, u8, u8)> =
            pick_evenly(family, hue_cfg.colors_per_family).into_iter().map(vibrancy_tune).collect();
        if swatches.is_empty() {
            None
        } else {
            inner.hue_cycle.advance_color_offset(swatches.len(), drop, hue_cfg.disorder, hue_cfg.disorder_aggression);
            let (r, g, b) = swatches[inner.hue_cycle.color_offset % swatches.len()];
            let (h, s, _) = rgb_to_hsv(r, g, b);
            Some((h, s))
        }
    } else {
        None
    };

    let wiz_cfg = inner.palette_store.config_for_brand(Brand::Wiz).clone();
    let wiz_palette: Vec<(u8, u8, u8)> = if wiz_cfg.manual_active && !wiz_cfg.families.is_empty() {
        let sig = CycleSignal {
            now_ms,
            trigger_hint: beat || drop,
            drop,
            motion,
            beat,
            elapsed_since_last_advance_ms: inner.wiz_cycle_elapsed_ms,
            timed_interval_sec: wiz_cfg.timed_interval_sec,
            beat_lock: wiz_cfg.beat_lock,
            beat_lock_grace_ms: wiz_cfg.beat_lock_grace_ms,
            bpm_delta: inner.beat.bpm - inner.prev_bpm,
            energy_delta: energy - inner.prev_energy,
            flux_delta: frame.spectral_flux - inner.prev_flux,
            band_delta: frame.band_low - inner.prev_band,
            phrase_shift: phrase != inner.prev_phrase,
            scene_shift: scene != inner.prev_scene,
            event_boost: if drop { 1.0 } else { 0.0 },
            reactive_margin: wiz_cfg.reactive_margin,
            spectrum_slot_values: spectrum_slot_values(&inner.spectrum_feature_map, &frame, energy, beat),
        };
        inner.wiz_cycle_elapsed_ms += dt_ms;
        let prev_index = inner.wiz_cycle.current_index;
        let idx = inner.wiz_cycle.resolve_index_for_emit(wiz_cfg.families.len(), wiz_cfg.cycle_mode, &sig);
        if inner.wiz_cycle.current_index != prev_index {
            inner.wiz_cycle_elapsed_ms = 0.0;
        }
        build_sequence(&[wiz_cfg.families[idx]], wiz_cfg.colors_per_family, wiz_cfg.disorder, wiz_cfg.disorder_aggression)
    } else {
        build_sequence(&wiz_cfg.families, wiz_cfg.colors_per_family, wiz_cfg.disorder, wiz_cfg.disorder_aggression)
    };

    let cadence = CadenceSignal {
        drums: drums_drive,
        beat_recency: 0.0,
        relative_transient: frame.transient,
        relative_flux: frame.spectral_flux,
    };
    let wiz_scene = if inner.wiz_scene_sync { scene } else { desync_scene(scene) };

    let hue_inputs = HueEmitInputs {
        now_ms,
        scene,
        overclock_level: inner.overclock_level,
        energy,
        motion,
        band_low: frame.band_low,
        band_mid: frame.band_mid,
        band_high: frame.band_high,
        beat,
        drop,
        silent,
        cadence,
        manual_hue_sat,
    };
    let hue_intent = inner.hue_emitter.emit(&hue_inputs);
    emitter.emit_hue(hue_intent);

    let wiz_inputs = WizEmitInputs {
        now_ms,
        scene: wiz_scene,
        overclock_level: inner.overclock_level,
        energy,
        motion,
        drive,
        band_low: frame.band_low,
        band_mid: frame.band_mid,
        band_high: frame.band_high,
        beat,
        drop,
        cadence,
        palette: &wiz_palette,
    };
    let wiz_intent = inner.wiz_emitter.emit(&wiz_inputs);
    emitter.emit_wiz(wiz_intent);

    let brightness_percent = inner.telemetry_brightness.apply(energy, beat, drop);
    let global_palette = inner.palette_store.global();

    let telemetry = Telemetry {
        frame,
        energy,
        intensity,
        beat,
        beat_confidence: inner.beat.confidence,
        beat_interval_ms: if inner.beat.bpm > 0.0 { 60_000.0 / inner.beat.bpm } else { 0.0 },
        bpm: inner.beat.bpm,
        onset_tempo_bpm: inner.onset.bpm,
        onset_tempo_confidence: inner.onset.confidence,
        phrase,
        drop,
        behavior,
        scene: scene.as_str().to_string(),
        scene_age_ms,
        brightness_tier: brightness_tier(energy),
        brightness_percent,
        overclock_level: inner.overclock_level,
        auto_profile: auto_profile_name,
        audio_reactivity_preset: reactivity_name,
        meta_auto_enabled: inner.meta_auto_enabled,
        meta_auto_reason: meta_plan_reason_name(plan.reason).to_string(),
        meta_auto_profile: plan.auto_profile,
        meta_auto_genre: plan.meta_genre,
        meta_auto_reactivity: plan.reactivity,
        meta_auto_intent_hz: plan.intent_hz,
        meta_auto_applied_hz: plan.target_hz,
        meta_auto_range_low_pct: inner.meta_planner.range_low_pct(),
        meta_auto_range_high_pct: inner.meta_planner.range_high_pct(),
        meta_auto_dominant_tracker: Some(inner.meta_planner.dominant_tracker()),
        meta_auto_overclock: plan.overclock_level,
        overclock_auto_enabled: inner.overclock_auto_enabled,
        transport_pressure: inner.meta_planner.transport_pressure(now_ms),
        palette_families: global_palette.families.iter().map(|f| f.as_str().to_string()).collect(),
        palette_colors_per_family: global_palette.colors_per_family.min(255) as u8,
        palette_cycle_mode: cycle_mode_name(global_palette.cycle_mode).to_string(),
    };
    inner.telemetry.store(Arc::new(telemetry.clone()));

    inner.prev_bpm = inner.beat.bpm;
    inner.prev_energy = energy;
    inner.prev_flux = frame.spectral_flux;
    inner.prev_band = frame.band_low;
    inner.prev_phrase = phrase;
    inner.prev_scene = scene;
    inner.external_bias.midi_bias *= EXTERNAL_BIAS_DECAY;
    inner.external_bias.osc_bias *= EXTERNAL_BIAS_DECAY;

    telemetry
}

fn spectrum_feature_value(feature: SpectrumFeature, frame: &AudioFrame, energy: f32, beat: bool) -> f32 {
    match feature {
        SpectrumFeature::Lows => frame.band_low,
        SpectrumFeature::Mids => frame.band_mid,
        SpectrumFeature::Highs => frame.band_high,
        SpectrumFeature::Rms => frame.rms,
        SpectrumFeature::Energy => energy,
        SpectrumFeature::Flux => frame.spectral_flux,
        SpectrumFeature::Peaks => frame.peak,
        SpectrumFeature::Transients => frame.transient,
        SpectrumFeature::Beat => f32::from(beat),
    }
}

fn spectrum_slot_values(map: &[SpectrumFeature], frame: &AudioFrame, energy: f32, beat: bool) -> [f32; 5] {
    let mut out = [0.0; 5];
    for (slot, feature) in out.iter_mut().zip(map.iter()) {
        *slot = spectrum_feature_value(*feature, frame, energy, beat);
    }
    out
}

fn meta_plan_reason_name(reason: lumen_planner::MetaPlanReason) -> &'static str {
    use lumen_planner::MetaPlanReason::{Build, Drop, GenreChange, Idle, TierDown, TierUp};
    match reason {
        Idle => "idle",
        TierUp => "tier_up",
        TierDown => "tier_down",
        Drop => "drop",
        Build => "build",
        GenreChange => "genre_change",
    }
}

fn cycle_mode_name(mode: lumen_palette::CycleMode) -> &'static str {
    use lumen_palette::CycleMode::{OnTrigger, ReactiveShift, SpectrumMapper, TimedCycle};
    match mode {
        OnTrigger => "on_trigger",
        TimedCycle => "timed_cycle",
        ReactiveShift => "reactive_shift",
        SpectrumMapper => "spectrum_mapper",
    }
}
