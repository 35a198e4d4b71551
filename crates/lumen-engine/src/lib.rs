//! The orchestration crate: owns the mutable per-tick state, wires the
//! tempo/genre/behavior/planner/palette/emit crates together into a single
//! 16ms tick, and exposes the external setter surface described for a
//! music-reactive lighting controller.

pub mod config_patch;
pub mod engine;
pub mod overclock_auto;
pub mod tick;

pub use config_patch::{scene_from_str, PaletteConfigPatch, TempoTrackerMask};
pub use engine::Engine;
pub use overclock_auto::OverclockAutoPlanner;
