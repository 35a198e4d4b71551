//! The top-level `idle -> flow -> pulse` behavior state machine.

use crate::debounce::DebounceGate;
use lumen_core::ids::{Behavior, Phrase};
use lumen_genre::{AutoProfile, GenreProfile};

/// Everything the behavior machine reads on a given tick.
#[derive(Debug, Clone, Copy)]
pub struct BehaviorInputs {
    pub now_ms: f32,
    pub energy: f32,
    pub transient: f32,
    pub flux: f32,
    pub rms: f32,
    pub motion: f32,
    pub phrase: Phrase,
    pub neural_bias: f32,
    pub mode_switch_bias: f32,
    pub overclock_level: u8,
}

/// The `idle`/`flow`/`pulse` machine with debounce, hysteresis, and the
/// documented forced overrides.
#[derive(Debug, Clone)]
pub struct BehaviorFsm {
    gate: DebounceGate<Behavior>,
}

impl Default for BehaviorFsm {
    fn default() -> Self {
        Self { gate: DebounceGate::new(Behavior::Idle) }
    }
}

impl BehaviorFsm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Behavior {
        self.gate.stable
    }

    pub fn update(&mut self, inputs: &BehaviorInputs, genre: &GenreProfile, auto: &AutoProfile) -> Behavior {
        let overclock_bump = f32::from(inputs.overclock_level) * 0.003;
        let idle_t = (0.16 + genre.idle_offset * 0.3 - inputs.neural_bias - overclock_bump
            + inputs.mode_switch_bias)
            .max(0.04);
        let flow_t = (0.4 + genre.flow_offset * 0.3 - inputs.neural_bias - overclock_bump
            + inputs.mode_switch_bias)
            .max(idle_t + 0.05);

        let hysteresis_scale = (1.0 - f32::from(inputs.overclock_level) * 0.03).clamp(0.3, 1.0);
        let h = auto.hysteresis * hysteresis_scale;

        let mut desired = match self.gate.stable {
            Behavior::Idle => {
                if inputs.energy > flow_t + h {
                    Behavior::Pulse
                } else if inputs.energy > idle_t + h {
                    Behavior::Flow
                } else {
                    Behavior::Idle
                }
            }
            Behavior::Flow => {
                if inputs.energy < idle_t - h {
                    Behavior::Idle
                } else if inputs.energy > flow_t + h {
                    Behavior::Pulse
                } else {
                    Behavior::Flow
                }
            }
            Behavior::Pulse => {
                if inputs.energy < flow_t - h {
                    if inputs.energy < idle_t - h {
                        Behavior::Idle
                    } else {
                        Behavior::Flow
                    }
                } else {
                    Behavior::Pulse
                }
            }
        };

        let mut emergency = false;

        // 1. Drop / recover / build forced overrides.
        if inputs.phrase == Phrase::Drop {
            desired = Behavior::Pulse;
            emergency = true;
        } else if inputs.phrase == Phrase::Recover && self.gate.stable == Behavior::Pulse {
            desired = Behavior::Flow;
        } else if inputs.phrase == Phrase::Build && self.gate.stable == Behavior::Idle {
            desired = Behavior::Flow;
        }

        // 2. Extreme flux+energy force pulse.
        let force_pulse = inputs.flux > genre.force_pulse_flux && inputs.energy > genre.force_pulse_energy;
        if force_pulse {
            desired = Behavior::Pulse;
        }

        // 3. Very low flux forces pulse back down.
        if inputs.flux < genre.force_flow_low_flux && self.gate.stable == Behavior::Pulse && inputs.energy < 0.55 {
            desired = Behavior::Flow;
        }

        // 4. Heavy promote: flow -> pulse under sustained heavy momentum.
        let heavy_promote = inputs.energy > genre.heavy_promote_energy
            && inputs.transient > genre.heavy_promote_transient
            && inputs.flux > genre.heavy_promote_flux
            && inputs.motion > genre.heavy_promote_motion;
        if heavy_promote && self.gate.stable == Behavior::Flow {
            desired = Behavior::Pulse;
        }

        // 5. Selective pulse: demote pulse without motion/build/body evidence.
        let beat_driven = inputs.motion > genre.motion_beat_confidence;
        let strong_build = inputs.phrase == Phrase::Build && inputs.energy > 0.6;
        let strong_body = inputs.transient > genre.motion_transient && inputs.flux > genre.motion_flux;
        if desired == Behavior::Pulse && !(beat_driven || strong_build || strong_body || force_pulse || heavy_promote)
        {
            desired = Behavior::Flow;
        }

        // 6. Drive floors.
        let idle_floor = (0.12 + f32::from(inputs.overclock_level) * 0.003).min(0.16);
        let pulse_floor = (0.48 - f32::from(inputs.overclock_level) * 0.003).max(0.42);
        if desired == Behavior::Idle && inputs.energy >= idle_floor && inputs.energy > idle_t {
            desired = Behavior::Flow;
        }
        if desired == Behavior::Pulse && inputs.energy < pulse_floor && !force_pulse && !heavy_promote {
            desired = Behavior::Flow;
        }

        // 7. Quiet guard: no pulse when rms/transient/flux are all gated low.
        let quiet = inputs.rms < genre.quiet_rms_gate
            && inputs.transient < genre.quiet_transient_gate
            && inputs.flux < genre.quiet_flux_gate;
        if quiet && desired == Behavior::Pulse {
            desired = Behavior::Flow;
        }

        // Emergency pulse-demote: drive collapses well under the pulse floor.
        if self.gate.stable == Behavior::Pulse && inputs.energy < pulse_floor * 0.7 {
            desired = if inputs.energy < idle_t { Behavior::Idle } else { Behavior::Flow };
            emergency = true;
        }

        let confirm_ms = if emergency { 0.0 } else { auto.confirm_ms };
        let mut hold_ms = auto.hold_ms;
        // A pulse<->flow flip carries an extra guard unless drop/build.
        let is_pulse_flow_flip =
            (self.gate.stable == Behavior::Pulse && desired == Behavior::Flow)
                || (self.gate.stable == Behavior::Flow && desired == Behavior::Pulse);
        if is_pulse_flow_flip && inputs.phrase != Phrase::Drop && inputs.phrase != Phrase::Build {
            hold_ms += auto.hold_ms * 0.78;
        }

        self.gate.propose(desired, inputs.now_ms, confirm_ms, hold_ms, emergency)
    }
}

#[cfg(test)]
mod tests {
    use super::{BehaviorFsm, BehaviorInputs};
    use lumen_core::ids::{Behavior, Phrase};
    use lumen_genre::{auto_profile, profile_for};
    use lumen_core::ids::{AutoProfileName, GenreId};

    fn base_inputs(now_ms: f32, energy: f32) -> BehaviorInputs {
        BehaviorInputs {
            now_ms,
            energy,
            transient: 0.0,
            flux: 0.0,
            rms: energy,
            motion: 0.0,
            phrase: Phrase::Neutral,
            neural_bias: 0.0,
            mode_switch_bias: 0.0,
            overclock_level: 0,
        }
    }

    #[test]
    fn drop_forces_immediate_pulse() {
        let mut fsm = BehaviorFsm::new();
        let genre = profile_for(GenreId::House);
        let auto = auto_profile(AutoProfileName::Balanced);
        let mut inputs = base_inputs(0.0, 0.1);
        inputs.phrase = Phrase::Drop;
        let behavior = fsm.update(&inputs, genre, auto);
        assert_eq!(behavior, Behavior::Pulse);
    }

    #[test]
    fn quiet_guard_prevents_pulse() {
        let mut fsm = BehaviorFsm::new();
        let genre = profile_for(GenreId::House);
        let auto = auto_profile(AutoProfileName::Reactive);
        let mut t = 0.0;
        let mut last = Behavior::Idle;
        for _ in 0..200 {
            let inputs = base_inputs(t, 0.02);
            last = fsm.update(&inputs, genre, auto);
            t += 16.0;
        }
        assert_ne!(last, Behavior::Pulse);
    }

    #[test]
    fn debounce_requires_hold_before_committing() {
        let mut fsm = BehaviorFsm::new();
        let genre = profile_for(GenreId::House);
        let auto = auto_profile(AutoProfileName::Cinematic);
        let inputs = base_inputs(0.0, 0.6);
        let first = fsm.update(&inputs, genre, auto);
        assert_eq!(first, Behavior::Idle);
    }
}
