//! Deadline pacing shared by both emitters: rhythm-modulated interval,
//! deadline resnap on clock anomalies, and the fixed overclock interval map.

/// Canonical interval, in milliseconds, for overclock levels `0..=12`.
pub const INTERVALS_MS: [u16; 13] = [500, 250, 167, 125, 100, 83, 71, 62, 50, 33, 25, 20, 17];

#[must_use]
pub fn base_interval_ms(overclock_level: u8) -> u16 {
    INTERVALS_MS[usize::from(overclock_level.min(12))]
}

/// Inputs to the rhythm-cadence signal that modulates the base interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct CadenceSignal {
    pub drums: f32,
    pub beat_recency: f32,
    pub relative_transient: f32,
    pub relative_flux: f32,
}

fn cadence_factor(sig: CadenceSignal) -> f32 {
    let urgency =
        (sig.drums * 0.4 + sig.beat_recency * 0.35 + sig.relative_transient * 0.15 + sig.relative_flux * 0.1)
            .clamp(0.0, 1.0);
    // Higher urgency -> faster (smaller) interval.
    1.0 - urgency * 0.35
}

/// Modulate `base_ms` by the cadence signal, clamped to the brand's
/// documented interval window.
#[must_use]
pub fn modulated_interval_ms(base_ms: u16, sig: CadenceSignal, lo_ms: u16, hi_ms: u16) -> u16 {
    let factor = cadence_factor(sig);
    let ms = (f32::from(base_ms) * factor).round() as u16;
    ms.clamp(lo_ms, hi_ms)
}

/// Per-emitter deadline tracker with the documented resnap guard.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmitSchedule {
    pub last_emit_ms: f32,
    pub next_emit_at_ms: f32,
    pub phase: u64,
}

impl EmitSchedule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `now_ms` has crossed `next_emit_at_ms`; does not mutate
    /// state. Call `advance` once after emitting.
    #[must_use]
    pub fn is_due(&self, now_ms: f32) -> bool {
        now_ms >= self.next_emit_at_ms
    }

    /// Advance the deadline by `interval_ms`, applying the documented
    /// resnap guard against clock regressions/jumps, then bump `phase` and
    /// `last_emit_ms`. Tightens (never postpones) an already-due deadline
    /// when `interval_ms` shrank since the last schedule.
    pub fn advance(&mut self, now_ms: f32, interval_ms: u16) {
        let interval = f32::from(interval_ms);
        if self.next_emit_at_ms - now_ms > 2.0 * interval {
            self.next_emit_at_ms = now_ms;
        }
        self.next_emit_at_ms += interval;
        if self.next_emit_at_ms < now_ms - 2.0 * interval {
            self.next_emit_at_ms = now_ms + interval;
        }
        self.last_emit_ms = now_ms;
        self.phase += 1;
    }

    /// Tighten (but never postpone) the deadline to reflect a new, smaller
    /// interval — used when overclock level changes mid-cycle.
    pub fn tighten_to(&mut self, now_ms: f32, interval_ms: u16) {
        let candidate = self.last_emit_ms + f32::from(interval_ms);
        if candidate < self.next_emit_at_ms && candidate >= now_ms {
            self.next_emit_at_ms = candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{base_interval_ms, CadenceSignal, EmitSchedule, INTERVALS_MS};

    #[test]
    fn base_interval_table_has_thirteen_entries() {
        assert_eq!(INTERVALS_MS.len(), 13);
        assert_eq!(base_interval_ms(0), 500);
        assert_eq!(base_interval_ms(12), 17);
    }

    #[test]
    fn high_cadence_shrinks_interval() {
        let idle = CadenceSignal::default();
        let hot = CadenceSignal { drums: 1.0, beat_recency: 1.0, relative_transient: 1.0, relative_flux: 1.0 };
        let idle_ms = super::modulated_interval_ms(500, idle, 84, 340);
        let hot_ms = super::modulated_interval_ms(500, hot, 84, 340);
        assert!(hot_ms < idle_ms);
    }

    #[test]
    fn large_forward_jump_resnaps_to_now() {
        let mut sched = EmitSchedule::new();
        sched.next_emit_at_ms = 100.0;
        sched.advance(10_000.0, 100);
        assert_eq!(sched.next_emit_at_ms, 10_100.0);
    }

    #[test]
    fn normal_advance_accumulates_interval() {
        let mut sched = EmitSchedule::new();
        sched.advance(0.0, 100);
        assert_eq!(sched.next_emit_at_ms, 100.0);
        assert_eq!(sched.phase, 1);
    }

    #[test]
    fn tighten_never_postpones() {
        let mut sched = EmitSchedule::new();
        sched.advance(0.0, 500);
        let before = sched.next_emit_at_ms;
        sched.tighten_to(0.0, 100);
        assert!(sched.next_emit_at_ms <= before);
    }
}
