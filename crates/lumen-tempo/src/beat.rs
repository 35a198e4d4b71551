//! Per-tick beat onset detection and BPM stabilization.

use lumen_core::AudioFrame;
use std::collections::VecDeque;

const RING_CAPACITY: usize = 16;
const IBI_RATIOS: [f32; 9] = [0.5, 2.0 / 3.0, 0.75, 5.0 / 6.0, 1.0, 6.0 / 5.0, 4.0 / 3.0, 1.5, 2.0];

/// Genre-derived beat thresholds, supplied by the planner from the active
/// `GenreProfile`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatCoeffs {
    pub threshold_base: f32,
    pub threshold_transient_scale: f32,
    pub threshold_flux_scale: f32,
    pub rise_gate_base: f32,
    pub rise_gate_overdue_relief: f32,
    pub beat_gap_scale: f32,
}

impl Default for BeatCoeffs {
    fn default() -> Self {
        Self {
            threshold_base: 0.34,
            threshold_transient_scale: 0.18,
            threshold_flux_scale: 0.12,
            rise_gate_base: 0.06,
            rise_gate_overdue_relief: 0.03,
            beat_gap_scale: 1.0,
        }
    }
}

/// Tracks beat timing and emits a stabilized BPM.
#[derive(Debug, Clone)]
pub struct BeatDetector {
    last_beat_ms: Option<f32>,
    energy_at_last_beat: f32,
    ibi_ring: VecDeque<f32>,
    pub bpm: f32,
    pub confidence: f32,
}

impl Default for BeatDetector {
    fn default() -> Self {
        Self {
            last_beat_ms: None,
            energy_at_last_beat: 0.0,
            ibi_ring: VecDeque::with_capacity(RING_CAPACITY),
            bpm: 0.0,
            confidence: 0.0,
        }
    }
}

impl BeatDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn predicted_ms(bpm_for_gap: f32, beat_gap_scale: f32) -> f32 {
        ((60_000.0 / bpm_for_gap) * beat_gap_scale).clamp(128.0, 520.0)
    }

    /// Evaluate one tick. `now_ms` is the engine's cumulative tick clock
    /// (not wall-clock `Instant`, so emitted sequences stay deterministic
    /// given identical input streams). Returns `true` on an accepted beat.
    pub fn detect(
        &mut self,
        now_ms: f32,
        energy: f32,
        frame: &AudioFrame,
        onset_bpm: f32,
        drums: f32,
        coeffs: &BeatCoeffs,
    ) -> bool {
        let bpm_for_gap = if self.bpm > 0.0 {
            self.bpm
        } else if onset_bpm > 0.0 {
            onset_bpm
        } else {
            120.0
        };
        let predicted = Self::predicted_ms(bpm_for_gap, coeffs.beat_gap_scale);
        let gap = self.last_beat_ms.map_or(f32::INFINITY, |last| now_ms - last);

        let threshold = (coeffs.threshold_base
            - frame.transient * coeffs.threshold_transient_scale
            - frame.spectral_flux * coeffs.threshold_flux_scale)
            .max(0.05);
        let rise = energy - self.energy_at_last_beat;
        let overdue_relief = if gap > predicted * 1.5 { coeffs.rise_gate_overdue_relief } else { 0.0 };
        let rise_gate = (coeffs.rise_gate_base - overdue_relief).max(0.02);

        let threshold_hit = gap >= predicted && energy > threshold && rise > rise_gate;
        let percussive_fast_hit = gap >= predicted
            && drums > 0.26
            && (frame.transient > 0.15 || frame.spectral_flux > 0.13)
            && energy > 0.9 * threshold;
        let overdue_fallback =
            gap >= predicted * 2.0 && (energy > 0.3 || frame.transient > 0.2 || frame.spectral_flux > 0.2);

        if !(threshold_hit || percussive_fast_hit || overdue_fallback) {
            self.confidence = (self.confidence - 0.01).max(0.0);
            return false;
        }

        if let Some(last) = self.last_beat_ms {
            let raw_ibi = now_ms - last;
            let normalized = self.normalize_ibi(raw_ibi, onset_bpm);
            if self.ibi_ring.len() == RING_CAPACITY {
                self.ibi_ring.pop_front();
            }
            self.ibi_ring.push_back(normalized);
            self.stabilize();
        }

        self.last_beat_ms = Some(now_ms);
        self.energy_at_last_beat = energy;
        self.confidence = (self.confidence + 0.25).min(1.0);
        true
    }

    /// Pick the ratio candidate minimizing a weighted penalty against a
    /// blended hint (median ring IBI, current BPM, onset BPM).
    fn normalize_ibi(&self, raw_ibi: f32, onset_bpm: f32) -> f32 {
        let median_ibi = self.median_ring_ibi();
        let hint_bpm_candidates: Vec<f32> =
            [self.bpm, onset_bpm, if median_ibi > 0.0 { 60_000.0 / median_ibi } else { 0.0 }]
                .into_iter()
                .filter(|b| *b > 0.0)
                .collect();
        let hint_bpm = if hint_bpm_candidates.is_empty() {
            60_000.0 / raw_ibi.max(1.0)
        } else {
            hint_bpm_candidates.iter().sum::<f32>() / hint_bpm_candidates.len() as f32
        };
        let hint_ibi = 60_000.0 / hint_bpm.max(1.0);

        let mut best_ratio = 1.0;
        let mut best_penalty = f32::INFINITY;
        for &ratio in &IBI_RATIOS {
            let candidate = raw_ibi / ratio;
            let log_drift = (candidate / hint_ibi).ln().abs();
            let bpm_distance = ((60_000.0 / candidate) - hint_bpm).abs() / 200.0;
            let penalty = log_drift + bpm_distance;
            if penalty < best_penalty {
                best_penalty = penalty;
                best_ratio = ratio;
            }
        }
        raw_ibi / best_ratio
    }

    fn median_ring_ibi(&self) -> f32 {
        if self.ibi_ring.is_empty() {
            return 0.0;
        }
        let mut v: Vec<f32> = self.ibi_ring.iter().copied().collect();
        v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        v[v.len() / 2]
    }

    /// `bpm = stabilize(estimateFromRing())`: median-of-ring with
    /// harmonic-ratio continuity against the previous estimate.
    fn stabilize(&mut self) {
        let median_ibi = self.median_ring_ibi();
        if median_ibi <= 0.0 {
            return;
        }
        let raw_bpm = 60_000.0 / median_ibi;

        let stabilized = if self.bpm > 0.0 {
            let mut best = raw_bpm;
            let mut best_dist = f32::INFINITY;
            for mult in [0.5, 1.0, 2.0] {
                let candidate = raw_bpm * mult;
                if !(40.0..=220.0).contains(&candidate) {
                    continue;
                }
                let dist = (candidate - self.bpm).abs();
                if dist < best_dist {
                    best_dist = dist;
                    best = candidate;
                }
            }
            best
        } else {
            raw_bpm
        };

        self.bpm = stabilized;
    }
}

#[cfg(test)]
mod tests {
    use super::{BeatCoeffs, BeatDetector};
    use lumen_core::AudioFrame;

    fn loud_frame() -> AudioFrame {
        AudioFrame { rms: 0.5, peak: 0.6, transient: 0.4, spectral_flux: 0.3, band_low: 0.6, ..AudioFrame::default() }
    }

    #[test]
    fn respects_minimum_predicted_gap() {
        let mut det = BeatDetector::new();
        let coeffs = BeatCoeffs::default();
        let frame = loud_frame();
        assert!(det.detect(0.0, 0.6, &frame, 0.0, 0.0, &coeffs));
        // Far too soon: rejected by the predicted-gap floor (128 ms).
        assert!(!det.detect(20.0, 0.6, &frame, 0.0, 0.0, &coeffs));
    }

    #[test]
    fn accepts_periodic_beats_and_tracks_bpm() {
        let mut det = BeatDetector::new();
        let coeffs = BeatCoeffs::default();
        let mut t = 0.0f32;
        let period = 500.0; // 120 BPM
        let mut beats = 0;
        while t < 20_000.0 {
            let frame = loud_frame();
            if det.detect(t, 0.65, &frame, 120.0, 0.4, &coeffs) {
                beats += 1;
            }
            t += period;
        }
        assert!(beats > 10);
        assert!(det.bpm > 0.0);
    }
}
