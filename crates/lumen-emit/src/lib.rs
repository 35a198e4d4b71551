//! The dual-rate emitter scheduler: deadline pacing shared by both brands,
//! brightness tiering, and the Hue/WiZ intent synthesizers.

pub mod brightness;
pub mod hue_emit;
pub mod schedule;
pub mod wiz_emit;

pub use brightness::{brightness_tier, BrightnessSmoother};
pub use hue_emit::{HueEmitInputs, HueEmitter};
pub use schedule::{base_interval_ms, CadenceSignal, EmitSchedule, INTERVALS_MS};
pub use wiz_emit::{desync_scene, WizEmitInputs, WizEmitter};
