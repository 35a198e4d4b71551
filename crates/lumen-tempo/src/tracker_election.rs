//! Tempo-tracker election: choose which evidence channels drive the Hz plan.

use lumen_core::ids::TempoTracker;

const FLOOR: f32 = 0.35;
const INSTANT_GAP: f32 = 0.18;

/// Instantaneous evidence the election process scores each tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackerEvidence {
    pub drums: f32,
    pub beat_confidence: f32,
    pub transient: f32,
    pub audio_peak: f32,
    pub drive: f32,
    pub motion: f32,
    pub flux: f32,
    pub drop: bool,
    pub build: bool,
    pub tempo_confidence: f32,
    pub hard_quiet: bool,
}

/// Elects a dominant tempo-evidence channel from the allowed subset.
#[derive(Debug, Clone)]
pub struct TrackerElection {
    scores: [f32; 4],
    dominant: TempoTracker,
    dominant_age_ms: f32,
}

impl Default for TrackerElection {
    fn default() -> Self {
        Self { scores: [0.0; 4], dominant: TempoTracker::Baseline, dominant_age_ms: 0.0 }
    }
}

fn idx(t: TempoTracker) -> usize {
    match t {
        TempoTracker::Baseline => 0,
        TempoTracker::Peaks => 1,
        TempoTracker::Transients => 2,
        TempoTracker::Flux => 3,
    }
}

impl TrackerElection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset election state: called whenever the manual mask or the auto
    /// flag changes.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn update(&mut self, dt_ms: f32, allowed: &[TempoTracker], ev: TrackerEvidence) -> TempoTracker {
        if ev.hard_quiet {
            self.dominant = TempoTracker::Baseline;
            self.dominant_age_ms = 0.0;
            return self.dominant;
        }

        let raw = [
            (ev.drums + ev.beat_confidence - ev.transient).max(0.0),
            (ev.audio_peak + ev.drive).max(0.0),
            (ev.transient + ev.beat_confidence + ev.motion).max(0.0),
            (ev.flux + ev.motion + ev.beat_confidence).max(0.0),
        ];

        for i in 0..4 {
            let alpha = if raw[i] > self.scores[i] { 0.84 } else { 0.7 };
            self.scores[i] += (raw[i] - self.scores[i]) * alpha;
        }

        self.dominant_age_ms += dt_ms;

        if ev.drop || ev.build {
            self.elect_best(allowed);
            return self.dominant;
        }

        let hold_ms = (900.0 - ev.motion.clamp(0.0, 1.0) * 400.0 - ev.tempo_confidence.clamp(0.0, 1.0) * 300.0)
            .clamp(180.0, 900.0);

        if self.dominant_age_ms < hold_ms {
            // Still within hold, unless a decisive competitor has emerged.
            if let Some((best, best_score)) = self.best_among(allowed) {
                let current_score = self.scores[idx(self.dominant)];
                if best != self.dominant && best_score >= FLOOR && best_score - current_score >= INSTANT_GAP {
                    self.dominant = best;
                    self.dominant_age_ms = 0.0;
                }
            }
            return self.dominant;
        }

        self.elect_best(allowed);
        self.dominant
    }

    fn best_among(&self, allowed: &[TempoTracker]) -> Option<(TempoTracker, f32)> {
        allowed.iter().copied().map(|t| (t, self.scores[idx(t)])).max_by(|a, b| {
            a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    fn elect_best(&mut self, allowed: &[TempoTracker]) {
        if let Some((best, _)) = self.best_among(allowed) {
            if best != self.dominant {
                self.dominant = best;
                self.dominant_age_ms = 0.0;
            }
        }
    }

    #[must_use]
    pub fn dominant(&self) -> TempoTracker {
        self.dominant
    }
}

#[cfg(test)]
mod tests {
    use super::{TrackerElection, TrackerEvidence};
    use lumen_core::ids::TempoTracker;

    #[test]
    fn hard_quiet_forces_baseline() {
        let mut te = TrackerElection::new();
        let ev = TrackerEvidence { hard_quiet: true, ..TrackerEvidence::default() };
        let dom = te.update(16.0, &TempoTracker::ALL, ev);
        assert_eq!(dom, TempoTracker::Baseline);
    }

    #[test]
    fn drop_forces_immediate_reelection() {
        let mut te = TrackerElection::new();
        let ev = TrackerEvidence { flux: 1.0, motion: 1.0, beat_confidence: 1.0, drop: true, ..TrackerEvidence::default() };
        let dom = te.update(16.0, &TempoTracker::ALL, ev);
        assert_eq!(dom, TempoTracker::Flux);
    }

    #[test]
    fn restricted_mask_is_honored() {
        let mut te = TrackerElection::new();
        let allowed = [TempoTracker::Peaks];
        let ev = TrackerEvidence { drop: true, audio_peak: 1.0, drive: 1.0, ..TrackerEvidence::default() };
        let dom = te.update(16.0, &allowed, ev);
        assert_eq!(dom, TempoTracker::Peaks);
    }
}
