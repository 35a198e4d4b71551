//! The meta-planner ("Meta Auto"): genre classification, joint
//! {profile, reactivity, Hz} planning, and slew-limited application.

use crate::overclock::overclock_level_from_hz;
use crate::transport::TransportPressure;
use lumen_core::ids::{AutoProfileName, GenreId, ReactivityPresetName, TempoTracker};
use lumen_genre::{classify_raw, ClassifierFeatures, GenreClassifier};
use lumen_tempo::tracker_election::{TrackerElection, TrackerEvidence};

const EVAL_INTERVAL_MS: f32 = 60.0;

/// Everything the planner reads on each evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaPlanInputs {
    pub drive: f32,
    pub motion: f32,
    pub drums_drive: f32,
    pub tempo_bpm: f32,
    pub tempo_confidence: f32,
    pub beat_confidence: f32,
    pub transient: f32,
    pub flux: f32,
    pub audio_peak: f32,
    pub silence: bool,
    pub drop: bool,
    pub build: bool,
    pub classifier: ClassifierFeatures,
    pub allowed_trackers: [bool; 4],
    pub trackers_auto: bool,
    pub transport_raw: Option<(f32, f32)>,
}

/// Output of the meta-planner, applied to the engine's overclock/profile
/// state once debounced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetaPlan {
    pub auto_profile: AutoProfileName,
    pub reactivity: ReactivityPresetName,
    pub overclock_level: u8,
    pub reason: MetaPlanReason,
    pub meta_genre: GenreId,
    pub intent_hz: f32,
    pub target_hz: f32,
    pub fast_path: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaPlanReason {
    Idle,
    TierUp,
    TierDown,
    Drop,
    Build,
    GenreChange,
}

impl Default for MetaPlan {
    fn default() -> Self {
        Self {
            auto_profile: AutoProfileName::Balanced,
            reactivity: ReactivityPresetName::Balanced,
            overclock_level: 3,
            reason: MetaPlanReason::Idle,
            meta_genre: GenreId::House,
            intent_hz: 8.0,
            target_hz: 8.0,
            fast_path: false,
        }
    }
}

fn allowed_list(mask: [bool; 4]) -> Vec<TempoTracker> {
    let all = [
        (mask[0], TempoTracker::Baseline),
        (mask[1], TempoTracker::Peaks),
        (mask[2], TempoTracker::Transients),
        (mask[3], TempoTracker::Flux),
    ];
    let list: Vec<TempoTracker> = all.into_iter().filter(|(on, _)| *on).map(|(_, t)| t).collect();
    if list.is_empty() {
        vec![TempoTracker::Baseline]
    } else {
        list
    }
}

/// Computes tier `0..=4` from power/intensity and motion, with a small
/// genre-aggression promotion.
fn compute_tier(drive: f32, motion: f32, aggression: f32) -> u8 {
    let power = (drive * 0.6 + motion * 0.4 + aggression * 0.1).clamp(0.0, 1.3);
    if power > 1.05 {
        4
    } else if power > 0.82 {
        3
    } else if power > 0.58 {
        2
    } else if power > 0.32 {
        1
    } else {
        0
    }
}

/// The meta-planner state machine.
#[derive(Debug, Clone)]
pub struct MetaPlanner {
    armed: bool,
    eval_accum_ms: f32,
    classifier: GenreClassifier,
    tracker_election: TrackerElection,
    transport: TransportPressure,
    tempo_bpm_ema: f32,
    range_low_anchor: f32,
    range_high_anchor: f32,
    plan: MetaPlan,
    candidate: MetaPlan,
    candidate_since_ms: f32,
    last_applied_ms: f32,
}

impl Default for MetaPlanner {
    fn default() -> Self {
        Self {
            armed: false,
            eval_accum_ms: 0.0,
            classifier: GenreClassifier::new(),
            tracker_election: TrackerElection::new(),
            transport: TransportPressure::new(),
            tempo_bpm_ema: 0.0,
            range_low_anchor: 0.1,
            range_high_anchor: 0.9,
            plan: MetaPlan::default(),
            candidate: MetaPlan::default(),
            candidate_since_ms: 0.0,
            last_applied_ms: 0.0,
        }
    }
}

impl MetaPlanner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_armed(&mut self, armed: bool) {
        self.armed = armed;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    #[must_use]
    pub fn plan(&self) -> MetaPlan {
        self.plan
    }

    /// The tempo-evidence channel currently driving the Hz plan. Tracked
    /// every tick regardless of `armed`, since tracker election has no
    /// dependency on the meta-auto arm switch.
    #[must_use]
    pub fn dominant_tracker(&self) -> TempoTracker {
        self.tracker_election.dominant()
    }

    /// The genre classifier's current stable pick, independent of whether
    /// the meta-planner itself is armed (classification runs unconditionally
    /// every tick).
    #[must_use]
    pub fn classified_genre(&self) -> GenreId {
        self.classifier.stable
    }

    /// Clear tracker-election scores and dominance history. Called whenever
    /// the manual tempo-tracker mask or the tracker-auto flag changes, so a
    /// stale dominant channel from the previous configuration can't linger.
    pub fn reset_tracker_election(&mut self) {
        self.tracker_election.reset();
    }

    pub fn push_transport_sample(&mut self, now_ms: f32, raw: f32, pressure: f32) {
        self.transport.push_sample(now_ms, raw, pressure);
    }

    #[must_use]
    pub fn transport_pressure(&self, now_ms: f32) -> f32 {
        self.transport.read(now_ms)
    }

    /// The auto-ranger's converged low/high drive anchors, as a fraction of
    /// the `[0, 1]` drive domain. Telemetry reports these directly rather
    /// than the per-evaluation `dynamic_range_pct`, which is transient.
    #[must_use]
    pub fn range_low_pct(&self) -> f32 {
        self.range_low_anchor
    }

    #[must_use]
    pub fn range_high_pct(&self) -> f32 {
        self.range_high_anchor
    }

    /// Advance the planner. Genre classification and tracker election
    /// update every tick (they have their own internal debounce/smoothing);
    /// the plan itself only re-evaluates on the documented ~60 ms cadence.
    pub fn update(&mut self, now_ms: f32, dt_ms: f32, inputs: &MetaPlanInputs) -> MetaPlan {
        let genre = self.classifier.update(dt_ms, &inputs.classifier);

        let allowed = allowed_list(inputs.allowed_trackers);
        let ev = TrackerEvidence {
            drums: inputs.drums_drive,
            beat_confidence: inputs.beat_confidence,
            transient: inputs.transient,
            audio_peak: inputs.audio_peak,
            drive: inputs.drive,
            motion: inputs.motion,
            flux: inputs.flux,
            drop: inputs.drop,
            build: inputs.build,
            tempo_confidence: inputs.tempo_confidence,
            hard_quiet: inputs.silence,
        };
        let dominant = self.tracker_election.update(dt_ms, &allowed, ev);

        if !self.armed {
            return self.plan;
        }

        self.eval_accum_ms += dt_ms;
        if self.eval_accum_ms < EVAL_INTERVAL_MS {
            return self.plan;
        }
        self.eval_accum_ms = 0.0;

        // 1. Tempo alias correction + EMA.
        let mut bpm = inputs.tempo_bpm;
        if bpm >= 176.0 && inputs.tempo_confidence < 0.5 {
            bpm *= 0.5;
        } else if bpm > 0.0 && bpm <= 90.0 && inputs.tempo_confidence > 0.7 {
            bpm *= 2.0;
        }
        let rise_alpha = if bpm > self.tempo_bpm_ema { 0.3 } else { 0.12 };
        if bpm > 0.0 {
            self.tempo_bpm_ema += (bpm - self.tempo_bpm_ema) * rise_alpha;
        }

        // 4. Tier.
        let profile = lumen_genre::profile_for(genre);
        let tier = compute_tier(inputs.drive, inputs.motion, profile.aggression);

        // 5. Profile/reactivity selection.
        let (mut next_profile, mut next_reactivity) = match tier {
            0 => (AutoProfileName::Cinematic, ReactivityPresetName::Precision),
            1 => (AutoProfileName::Cinematic, ReactivityPresetName::Balanced),
            2 => (AutoProfileName::Balanced, ReactivityPresetName::Balanced),
            3 => (AutoProfileName::Balanced, ReactivityPresetName::Aggressive),
            _ => (AutoProfileName::Reactive, ReactivityPresetName::Aggressive),
        };
        if next_reactivity == ReactivityPresetName::Precision && next_profile == AutoProfileName::Reactive {
            next_profile = AutoProfileName::Balanced;
        }

        // 6. Hz target.
        let curved = 2.0 + 14.0 * (self.tempo_bpm_ema / 190.0).clamp(0.0, 1.0).powf(0.7);
        let linear = 2.0 + 14.0 * (self.tempo_bpm_ema / 190.0).clamp(0.0, 1.0);
        let mut target_hz = curved * 0.6 + linear * 0.4;

        let silence_penalty = if inputs.silence { 0.5 } else { 1.0 };
        let tempo_lift =
            (inputs.beat_confidence * 1.5 + inputs.motion * 1.2 + inputs.drive * 0.8) * silence_penalty;
        target_hz += tempo_lift;

        let tracker_floor = match dominant {
            TempoTracker::Baseline => 4.0,
            TempoTracker::Peaks => 3.0,
            TempoTracker::Transients => 5.0,
            TempoTracker::Flux => 5.0,
        };
        target_hz = target_hz.max(tracker_floor);

        let range_rise_alpha = if inputs.drive > self.range_high_anchor { 0.08 } else { 0.02 };
        self.range_high_anchor += (inputs.drive - self.range_high_anchor) * range_rise_alpha;
        let range_fall_alpha = if inputs.drive < self.range_low_anchor { 0.08 } else { 0.02 };
        self.range_low_anchor += (inputs.drive - self.range_low_anchor) * range_fall_alpha;
        let span = (self.range_high_anchor - self.range_low_anchor).max(0.05);
        let dynamic_range_pct = ((inputs.drive - self.range_low_anchor) / span).clamp(0.0, 1.0);
        let dynamic_range_target_hz = 2.0 + 14.0 * dynamic_range_pct;
        let range_confidence = (span * 1.5).clamp(0.2, 1.0);
        target_hz = target_hz * (1.0 - range_confidence * 0.4) + dynamic_range_target_hz * range_confidence * 0.4;

        let transport_demand = self.transport.rate_demand(now_ms);
        target_hz += transport_demand;

        target_hz *= lumen_genre::reactivity_preset(next_reactivity).hz_mult;
        target_hz = target_hz.clamp(2.0, 16.0);

        // Per-eval slew limiting.
        let prev_target = self.plan.target_hz;
        let up_boost = if inputs.drop || inputs.build { 1.5 } else { 1.0 }
            + transport_demand.min(1.0) * 0.3;
        let max_up = 1.25 * up_boost;
        let silence_boost = if inputs.silence { 1.2 } else { 1.0 };
        let max_down = 1.08 * silence_boost;

        let slewed_target_hz = if target_hz >= prev_target {
            (prev_target + max_up).min(target_hz)
        } else {
            (prev_target - max_down).max(target_hz)
        };

        // Mid-band trap: prev in [6,10] with a tiny delta gets an extra kick
        // either way so the plan doesn't stall mid-range.
        let mut final_target_hz = slewed_target_hz;
        if (6.0..=10.0).contains(&prev_target) && (slewed_target_hz - prev_target).abs() < 0.2 {
            final_target_hz += if target_hz >= prev_target { 0.4 } else { -0.4 };
        }
        final_target_hz = final_target_hz.clamp(2.0, 16.0);

        let overclock_level = overclock_level_from_hz(final_target_hz + 0.0);

        let fast_path = inputs.drop
            || inputs.build
            || tier >= 3
            || (final_target_hz - prev_target).abs() >= 3.0;

        let reason = if inputs.drop {
            MetaPlanReason::Drop
        } else if inputs.build {
            MetaPlanReason::Build
        } else if genre != self.plan.meta_genre {
            MetaPlanReason::GenreChange
        } else if final_target_hz > prev_target {
            MetaPlanReason::TierUp
        } else if final_target_hz < prev_target {
            MetaPlanReason::TierDown
        } else {
            MetaPlanReason::Idle
        };

        let candidate = MetaPlan {
            auto_profile: next_profile,
            reactivity: next_reactivity,
            overclock_level,
            reason,
            meta_genre: genre,
            intent_hz: target_hz,
            target_hz: final_target_hz,
            fast_path,
        };

        self.apply_candidate(now_ms, candidate);
        self.plan
    }

    fn apply_candidate(&mut self, now_ms: f32, candidate: MetaPlan) {
        if candidate.overclock_level != self.candidate.overclock_level
            || candidate.auto_profile != self.candidate.auto_profile
        {
            self.candidate = candidate;
            self.candidate_since_ms = now_ms;
        } else {
            self.candidate = candidate;
        }

        let confirm_ms = if candidate.fast_path { 60.0 } else { 150.0 };
        let hold_ms = if candidate.fast_path { 90.0 } else { 260.0 };
        let level_jump = (i16::from(candidate.overclock_level) - i16::from(self.plan.overclock_level)).abs() >= 2;
        let effective_hold = if level_jump { hold_ms * 0.5 } else { hold_ms };

        if now_ms - self.candidate_since_ms >= confirm_ms && now_ms - self.last_applied_ms >= effective_hold {
            self.plan = candidate;
            self.last_applied_ms = now_ms;
        } else {
            // Always publish the continuous target_hz/reason/genre fields so
            // telemetry reflects the live estimate even while overclock/profile
            // sit in their hold window.
            self.plan.intent_hz = candidate.intent_hz;
            self.plan.target_hz = candidate.target_hz;
            self.plan.meta_genre = candidate.meta_genre;
            self.plan.reason = candidate.reason;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MetaPlanInputs, MetaPlanner};
    use lumen_core::ids::{AutoProfileName, ReactivityPresetName};
    use lumen_genre::ClassifierFeatures;

    #[test]
    fn disarmed_planner_never_changes_plan() {
        let mut mp = MetaPlanner::new();
        let inputs = MetaPlanInputs { drive: 0.9, motion: 0.9, ..MetaPlanInputs::default() };
        let before = mp.plan();
        let after = mp.update(0.0, 16.0, &inputs);
        assert_eq!(before, after);
    }

    #[test]
    fn armed_planner_raises_overclock_under_sustained_heavy_input() {
        let mut mp = MetaPlanner::new();
        mp.set_armed(true);
        let inputs = MetaPlanInputs {
            drive: 1.0,
            motion: 1.0,
            drums_drive: 0.8,
            tempo_bpm: 140.0,
            tempo_confidence: 0.8,
            beat_confidence: 0.8,
            transient: 0.6,
            flux: 0.55,
            audio_peak: 0.8,
            build: true,
            classifier: ClassifierFeatures {
                percussive: 0.9,
                bass_weight: 0.3,
                high_weight: 0.8,
                harmonic: -0.5,
                calmness: -0.8,
                ..ClassifierFeatures::default()
            },
            allowed_trackers: [true, true, true, true],
            trackers_auto: true,
            ..MetaPlanInputs::default()
        };
        let mut t = 0.0;
        let mut plan = mp.plan();
        for _ in 0..400 {
            plan = mp.update(t, 16.0, &inputs);
            t += 16.0;
        }
        assert!(plan.overclock_level >= 4);
        assert_eq!(plan.auto_profile, AutoProfileName::Reactive);
        assert_eq!(plan.reactivity, ReactivityPresetName::Aggressive);
        assert!(plan.intent_hz >= 10.0);
    }
}
