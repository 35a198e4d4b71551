//! Linear genre classifier used by the meta-planner.

use lumen_core::ids::GenreId;

/// Signed per-tick feature vector the classifier scores against each
/// genre's weight row.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifierFeatures {
    pub percussive: f32,
    pub groove: f32,
    pub bass_weight: f32,
    pub high_weight: f32,
    pub harmonic: f32,
    pub calmness: f32,
    pub build_bonus: f32,
    pub drop_bonus: f32,
}

struct Weights {
    id: GenreId,
    percussive: f32,
    groove: f32,
    bass: f32,
    high: f32,
    harmonic: f32,
    calm: f32,
}

const WEIGHTS: [Weights; 12] = [
    Weights { id: GenreId::House, percussive: 0.6, groove: 0.9, bass: 0.7, high: 0.1, harmonic: 0.2, calm: -0.2 },
    Weights { id: GenreId::Techno, percussive: 0.8, groove: 0.6, bass: 0.8, high: 0.0, harmonic: -0.1, calm: -0.4 },
    Weights { id: GenreId::Trance, percussive: 0.5, groove: 0.5, bass: 0.4, high: 0.5, harmonic: 0.6, calm: -0.1 },
    Weights { id: GenreId::Dnb, percussive: 0.95, groove: 0.5, bass: 0.9, high: 0.2, harmonic: -0.2, calm: -0.6 },
    Weights { id: GenreId::Dubstep, percussive: 0.85, groove: 0.2, bass: 1.0, high: -0.1, harmonic: -0.3, calm: -0.5 },
    Weights { id: GenreId::HipHop, percussive: 0.7, groove: 0.8, bass: 0.75, high: -0.2, harmonic: 0.1, calm: 0.0 },
    Weights { id: GenreId::Pop, percussive: 0.4, groove: 0.6, bass: 0.3, high: 0.4, harmonic: 0.5, calm: 0.1 },
    Weights { id: GenreId::Rock, percussive: 0.6, groove: 0.3, bass: 0.4, high: 0.3, harmonic: 0.3, calm: -0.1 },
    Weights { id: GenreId::Metal, percussive: 0.9, groove: 0.1, bass: 0.6, high: 0.6, harmonic: -0.3, calm: -0.5 },
    Weights { id: GenreId::Rnb, percussive: 0.35, groove: 0.7, bass: 0.5, high: 0.0, harmonic: 0.6, calm: 0.3 },
    Weights { id: GenreId::Ambient, percussive: -0.3, groove: -0.4, bass: 0.1, high: 0.2, harmonic: 0.8, calm: 0.95 },
    Weights { id: GenreId::Cinematic, percussive: -0.2, groove: -0.3, bass: 0.2, high: 0.3, harmonic: 0.7, calm: 0.8 },
];

fn score(w: &Weights, f: &ClassifierFeatures) -> f32 {
    w.percussive * f.percussive
        + w.groove * f.groove
        + w.bass * f.bass_weight
        + w.high * f.high_weight
        + w.harmonic * f.harmonic
        + w.calm * f.calmness
        + 0.15 * f.build_bonus
        + 0.1 * f.drop_bonus
}

/// Score every genre and return the winner plus the margin over the
/// runner-up (used to size the debounce confirm window).
#[must_use]
pub fn classify_raw(f: &ClassifierFeatures) -> (GenreId, f32) {
    let mut best = (WEIGHTS[0].id, f32::NEG_INFINITY);
    let mut second = f32::NEG_INFINITY;
    for w in &WEIGHTS {
        let s = score(w, f);
        if s > best.1 {
            second = best.1;
            best = (w.id, s);
        } else if s > second {
            second = s;
        }
    }
    let margin = if second.is_finite() { best.1 - second } else { 1.0 };
    (best.0, margin.max(0.0))
}

/// Debounces genre classification: commits a new genre only after it has
/// been the top candidate continuously for a margin-scaled confirm window.
#[derive(Debug, Clone, Copy)]
pub struct GenreClassifier {
    pub stable: GenreId,
    candidate: GenreId,
    candidate_since_ms: f32,
}

impl Default for GenreClassifier {
    fn default() -> Self {
        Self { stable: GenreId::House, candidate: GenreId::House, candidate_since_ms: 0.0 }
    }
}

impl GenreClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, dt_ms: f32, features: &ClassifierFeatures) -> GenreId {
        let (winner, margin) = classify_raw(features);

        if winner != self.candidate {
            self.candidate = winner;
            self.candidate_since_ms = 0.0;
        } else {
            self.candidate_since_ms += dt_ms;
        }

        // Larger margin -> faster confirm, in [100, 460] ms.
        let confirm_ms = (460.0 - margin.min(2.0) / 2.0 * 360.0).clamp(100.0, 460.0);

        if self.candidate != self.stable && self.candidate_since_ms >= confirm_ms {
            self.stable = self.candidate;
        }

        self.stable
    }
}

#[cfg(test)]
mod tests {
    use super::{ClassifierFeatures, GenreClassifier};
    use lumen_core::ids::GenreId;

    #[test]
    fn calm_harmonic_material_classifies_ambient() {
        let f = ClassifierFeatures { harmonic: 0.9, calmness: 0.9, percussive: -0.5, ..ClassifierFeatures::default() };
        let mut c = GenreClassifier::new();
        let mut last = GenreId::House;
        for _ in 0..40 {
            last = c.update(16.0, &f);
        }
        assert_eq!(last, GenreId::Ambient);
    }

    #[test]
    fn debounce_requires_sustained_evidence() {
        let mut c = GenreClassifier::new();
        let dnb = ClassifierFeatures { percussive: 1.0, bass_weight: 1.0, calmness: -1.0, ..ClassifierFeatures::default() };
        let first = c.update(16.0, &dnb);
        // A single tick is not enough to flip the stable genre immediately
        // unless it was already House (the default).
        let _ = first;
        assert_eq!(c.stable, GenreId::House);
    }
}
