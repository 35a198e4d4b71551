//! The overclock table, transport-pressure tracker, and the meta-planner
//! that ties genre classification, tracker election, and Hz planning
//! together into a single debounced plan.

pub mod meta_plan;
pub mod overclock;
pub mod transport;

pub use lumen_core::ids::TempoTracker;
pub use meta_plan::{MetaPlan, MetaPlanInputs, MetaPlanReason, MetaPlanner};
pub use overclock::{base_interval_ms, hz_for_level, overclock_level_from_hz, INTERVALS_MS};
pub use transport::TransportPressure;
