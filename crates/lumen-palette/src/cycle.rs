//! Per-brand palette cycling: advances a cursor over the active sequence
//! according to one of four cycle modes.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// How a brand's active palette group index advances over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleMode {
    OnTrigger,
    TimedCycle,
    ReactiveShift,
    SpectrumMapper,
}

/// A named audio feature the spectrum mapper can compare slots against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpectrumFeature {
    Lows,
    Mids,
    Highs,
    Rms,
    Energy,
    Flux,
    Peaks,
    Transients,
    Beat,
}

/// Per-tick signal fed into `resolve_index_for_emit`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleSignal {
    pub now_ms: f32,
    pub trigger_hint: bool,
    pub drop: bool,
    pub motion: f32,
    pub beat: bool,
    pub elapsed_since_last_advance_ms: f32,
    pub timed_interval_sec: f32,
    pub beat_lock: bool,
    pub beat_lock_grace_ms: f32,
    pub bpm_delta: f32,
    pub energy_delta: f32,
    pub flux_delta: f32,
    pub band_delta: f32,
    pub phrase_shift: bool,
    pub scene_shift: bool,
    pub event_boost: f32,
    pub reactive_margin: f32,
    /// Per-slot feature values, one per configured `spectrumFeatureMap` entry
    /// (up to 5), already sampled by the caller for the current frame.
    pub spectrum_slot_values: [f32; 5],
}

/// Mutable per-brand cycling state.
#[derive(Debug, Clone)]
pub struct PaletteCycleState {
    pub current_index: usize,
    pub color_offset: usize,
    last_shift_ms: f32,
    last_spectrum_slot: usize,
    disorder_rng: ChaCha8Rng,
}

impl Default for PaletteCycleState {
    fn default() -> Self {
        Self {
            current_index: 0,
            color_offset: 0,
            last_shift_ms: 0.0,
            last_spectrum_slot: 0,
            disorder_rng: ChaCha8Rng::seed_from_u64(0),
        }
    }
}

impl PaletteCycleState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-seed the disorder jitter RNG. Lets the engine derive a
    /// reproducible stream from a session seed instead of OS entropy,
    /// preserving emitter determinism across identical intent streams.
    pub fn seed_disorder(&mut self, seed: u64) {
        self.disorder_rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Resolve and commit this tick's group index, wrapping into
    /// `[0, length)`. `length == 0` always returns index 0 unchanged.
    pub fn resolve_index_for_emit(&mut self, length: usize, mode: CycleMode, sig: &CycleSignal) -> usize {
        if length == 0 {
            self.current_index = 0;
            return 0;
        }

        match mode {
            CycleMode::OnTrigger => self.resolve_on_trigger(length, sig),
            CycleMode::TimedCycle => self.resolve_timed_cycle(length, sig),
            CycleMode::ReactiveShift => self.resolve_reactive_shift(length, sig),
            CycleMode::SpectrumMapper => self.resolve_spectrum_mapper(length, sig),
        }

        self.current_index
    }

    fn advance(&mut self, length: usize, step: usize) {
        self.current_index = (self.current_index + step.max(1)) % length;
    }

    fn resolve_on_trigger(&mut self, length: usize, sig: &CycleSignal) {
        if !sig.trigger_hint {
            return;
        }
        let step = if sig.drop {
            4
        } else {
            1 + (sig.motion.clamp(0.0, 1.0) * 3.0) as usize
        };
        self.advance(length, step.clamp(1, 4));
    }

    fn resolve_timed_cycle(&mut self, length: usize, sig: &CycleSignal) {
        let interval_ms = (sig.timed_interval_sec.max(0.1)) * 1000.0;
        if sig.elapsed_since_last_advance_ms < interval_ms {
            return;
        }
        if sig.beat_lock {
            if sig.beat || sig.drop || sig.elapsed_since_last_advance_ms >= interval_ms + sig.beat_lock_grace_ms {
                self.advance(length, 1);
            }
        } else {
            self.advance(length, 1);
        }
    }

    fn resolve_reactive_shift(&mut self, length: usize, sig: &CycleSignal) {
        let raw_score = sig.bpm_delta.abs() * 0.3
            + sig.energy_delta.abs() * 0.8
            + sig.flux_delta.abs() * 0.6
            + sig.band_delta.abs() * 0.5
            + f32::from(sig.phrase_shift) * 0.6
            + f32::from(sig.scene_shift) * 0.4
            + sig.event_boost;
        let margin = sig.reactive_margin.max(0.05);
        let score = raw_score * margin;

        let cooldown_ms = (980.0 - margin.clamp(0.0, 2.0) / 2.0 * 720.0).clamp(260.0, 980.0);
        let since_shift = sig.now_ms - self.last_shift_ms;
        let threshold = 0.35;

        if score >= threshold && since_shift >= cooldown_ms {
            self.advance(length, 1);
            self.last_shift_ms = sig.now_ms;
        }
    }

    fn resolve_spectrum_mapper(&mut self, length: usize, sig: &CycleSignal) {
        let slots = sig.spectrum_slot_values.len().min(5);
        let mut best_slot = 0usize;
        let mut best_value = f32::NEG_INFINITY;
        for (i, &v) in sig.spectrum_slot_values.iter().take(slots).enumerate() {
            if v > best_value {
                best_value = v;
                best_slot = i;
            }
        }
        let delta = (best_value - sig.spectrum_slot_values[self.last_spectrum_slot.min(slots.max(1) - 1)]).abs();
        if best_slot != self.last_spectrum_slot && delta >= 0.05 {
            self.last_spectrum_slot = best_slot;
        }
        self.current_index = self.last_spectrum_slot % length;
    }

    /// Advance the within-group color offset: ordered step-1 (step-2 on
    /// drop), or a jittered step drawn from the seeded disorder RNG when
    /// `disorder` is set. `disorder_aggression` widens the jitter range.
    pub fn advance_color_offset(&mut self, group_len: usize, drop: bool, disorder: bool, disorder_aggression: f32) {
        if group_len == 0 {
            self.color_offset = 0;
            return;
        }
        let step = if disorder {
            let max_step = 1 + (disorder_aggression.clamp(0.0, 1.0) * (group_len.min(16) as f32)) as usize;
            self.disorder_rng.random_range(1..=max_step.max(1))
        } else if drop {
            2
        } else {
            1
        };
        self.color_offset = (self.color_offset + step.max(1)) % group_len;
    }
}

#[cfg(test)]
mod tests {
    use super::{CycleMode, CycleSignal, PaletteCycleState};

    #[test]
    fn on_trigger_only_advances_with_hint() {
        let mut st = PaletteCycleState::new();
        let sig = CycleSignal::default();
        st.resolve_index_for_emit(5, CycleMode::OnTrigger, &sig);
        assert_eq!(st.current_index, 0);
        let sig = CycleSignal { trigger_hint: true, ..CycleSignal::default() };
        st.resolve_index_for_emit(5, CycleMode::OnTrigger, &sig);
        assert_eq!(st.current_index, 1);
    }

    #[test]
    fn timed_cycle_waits_for_interval() {
        let mut st = PaletteCycleState::new();
        let sig = CycleSignal { timed_interval_sec: 2.0, elapsed_since_last_advance_ms: 500.0, ..CycleSignal::default() };
        st.resolve_index_for_emit(5, CycleMode::TimedCycle, &sig);
        assert_eq!(st.current_index, 0);
        let sig = CycleSignal { timed_interval_sec: 2.0, elapsed_since_last_advance_ms: 2500.0, ..CycleSignal::default() };
        st.resolve_index_for_emit(5, CycleMode::TimedCycle, &sig);
        assert_eq!(st.current_index, 1);
    }

    #[test]
    fn spectrum_mapper_is_sticky_under_small_delta() {
        let mut st = PaletteCycleState::new();
        let sig = CycleSignal { spectrum_slot_values: [0.5, 0.52, 0.1, 0.1, 0.1], ..CycleSignal::default() };
        st.resolve_index_for_emit(5, CycleMode::SpectrumMapper, &sig);
        assert_eq!(st.current_index, 0);
    }

    #[test]
    fn disorder_color_offset_is_seed_deterministic() {
        let mut a = PaletteCycleState::new();
        let mut b = PaletteCycleState::new();
        a.seed_disorder(42);
        b.seed_disorder(42);
        for _ in 0..10 {
            a.advance_color_offset(6, false, true, 0.8);
            b.advance_color_offset(6, false, true, 0.8);
        }
        assert_eq!(a.color_offset, b.color_offset);
    }

    #[test]
    fn ordered_color_offset_steps_by_one_or_two_on_drop() {
        let mut st = PaletteCycleState::new();
        st.advance_color_offset(6, false, false, 0.0);
        assert_eq!(st.color_offset, 1);
        st.advance_color_offset(6, true, false, 0.0);
        assert_eq!(st.color_offset, 3);
    }

    #[test]
    fn zero_length_never_panics() {
        let mut st = PaletteCycleState::new();
        let sig = CycleSignal { trigger_hint: true, ..CycleSignal::default() };
        assert_eq!(st.resolve_index_for_emit(0, CycleMode::OnTrigger, &sig), 0);
    }
}
