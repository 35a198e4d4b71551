//! Behavior and scene state machines, and the bounded neural-motif memory.

pub mod behavior;
pub mod debounce;
pub mod memory;
pub mod scene;

pub use behavior::{BehaviorFsm, BehaviorInputs};
pub use debounce::DebounceGate;
pub use memory::{MemoryBank, MemoryEntry};
pub use scene::{scene_params, select_flow_scene, FlowFeatures, Scene, SceneFsm, SceneMode, SceneParams};
