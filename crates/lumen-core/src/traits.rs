//! The output seam: an `Emitter` receives finished intents and is
//! responsible for everything downstream (transport, logging, recording).

use crate::intent::{HueIntent, WizIntent};

/// A sink for the two lighting-intent streams.
///
/// Called from the tick thread only; implementations must not block for
/// long (they are fire-and-forget from the core's perspective).
pub trait Emitter {
    fn emit_hue(&mut self, intent: HueIntent);
    fn emit_wiz(&mut self, intent: WizIntent);
}

/// An `Emitter` that records every intent it receives, for tests and
/// deterministic-replay assertions.
#[derive(Debug, Default)]
pub struct RecordingEmitter {
    pub hue: Vec<HueIntent>,
    pub wiz: Vec<WizIntent>,
}

impl Emitter for RecordingEmitter {
    fn emit_hue(&mut self, intent: HueIntent) {
        self.hue.push(intent);
    }

    fn emit_wiz(&mut self, intent: WizIntent) {
        self.wiz.push(intent);
    }
}

#[cfg(test)]
mod tests {
    use super::{Emitter, RecordingEmitter};
    use crate::intent::{HueIntent, HueState};

    #[test]
    fn recording_emitter_accumulates() {
        let mut e = RecordingEmitter::default();
        e.emit_hue(HueIntent {
            phase: 1,
            energy: 0.5,
            rate_ms: 100,
            force_rate: false,
            force_delta: false,
            delta_scale: 1.0,
            state: HueState { on: true, hue: 0, sat: 200, bri: 100, transitiontime: 2 },
        });
        assert_eq!(e.hue.len(), 1);
    }
}
