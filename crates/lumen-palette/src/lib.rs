//! Palette engine: family tables, sequence builder, per-brand cycling, and
//! layered configuration.

pub mod builder;
pub mod config;
pub mod cycle;
pub mod families;

pub use builder::{build_sequence, pick_evenly, vibrancy_tune};
pub use config::{Brand, PaletteConfig, PaletteConfigStore};
pub use cycle::{CycleMode, CycleSignal, PaletteCycleState, SpectrumFeature};
pub use families::{family_swatches, Family, BLUE_FAMILY, GREEN_FAMILY, RED_FAMILY};
