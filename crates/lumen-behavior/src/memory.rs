//! Bounded neural-motif memory: biases behavior thresholds per genre from
//! past behavior selection. Never persisted, never evicted.

use lumen_core::ids::{Behavior, GenreId};
use std::collections::HashMap;

/// One genre's accumulated behavior-selection weights, each in `[0.5, 3.0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryEntry {
    pub idle: f32,
    pub flow: f32,
    pub pulse: f32,
}

impl Default for MemoryEntry {
    fn default() -> Self {
        Self { idle: 1.0, flow: 1.0, pulse: 1.0 }
    }
}

impl MemoryEntry {
    fn get(&self, b: Behavior) -> f32 {
        match b {
            Behavior::Idle => self.idle,
            Behavior::Flow => self.flow,
            Behavior::Pulse => self.pulse,
        }
    }

    fn set(&mut self, b: Behavior, v: f32) {
        match b {
            Behavior::Idle => self.idle = v,
            Behavior::Flow => self.flow = v,
            Behavior::Pulse => self.pulse = v,
        }
    }
}

/// Per-genre memory bank. Created lazily on first observation of a genre,
/// never destroyed for the life of the engine.
#[derive(Debug, Clone, Default)]
pub struct MemoryBank {
    entries: HashMap<GenreId, MemoryEntry>,
}

impl MemoryBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reinforce the chosen behavior for `genre`: `chosen += amount`, every
    /// other behavior decays by `*= 0.995`.
    pub fn reinforce(&mut self, genre: GenreId, chosen: Behavior, amount: f32) {
        let entry = self.entries.entry(genre).or_default();
        for b in [Behavior::Idle, Behavior::Flow, Behavior::Pulse] {
            let v = entry.get(b);
            let updated = if b == chosen { v + amount } else { v * 0.995 };
            entry.set(b, updated.clamp(0.5, 3.0));
        }
    }

    /// A signed bias derived from the memory entry: positive when `pulse`
    /// has been reinforced relative to `idle`, used to nudge thresholds
    /// down (more pulse-prone) or up.
    #[must_use]
    pub fn threshold_bias(&self, genre: GenreId) -> f32 {
        let entry = self.entries.get(&genre).copied().unwrap_or_default();
        ((entry.pulse - entry.idle) * 0.01).clamp(-0.03, 0.03)
    }

    #[must_use]
    pub fn entry(&self, genre: GenreId) -> MemoryEntry {
        self.entries.get(&genre).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryBank;
    use lumen_core::ids::{Behavior, GenreId};

    #[test]
    fn reinforcement_stays_in_bounds() {
        let mut bank = MemoryBank::new();
        for _ in 0..5000 {
            bank.reinforce(GenreId::House, Behavior::Pulse, 0.05);
        }
        let e = bank.entry(GenreId::House);
        assert!((0.5..=3.0).contains(&e.pulse));
        assert!((0.5..=3.0).contains(&e.idle));
    }

    #[test]
    fn unseen_genre_defaults_to_neutral() {
        let bank = MemoryBank::new();
        let e = bank.entry(GenreId::Metal);
        assert_eq!(e.idle, 1.0);
        assert_eq!(e.flow, 1.0);
        assert_eq!(e.pulse, 1.0);
    }
}
