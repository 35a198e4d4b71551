//! Static coefficient tables (genre profiles, reactivity presets,
//! auto-profiles, decade bias) and the genre classifier that reads them.

pub mod autoprofile;
pub mod classify;
pub mod decade;
pub mod profiles;
pub mod reactivity;

pub use autoprofile::{auto_profile, AutoProfile, AUTO_PROFILES};
pub use classify::{classify_raw, ClassifierFeatures, GenreClassifier};
pub use decade::{decade_bias, resolve_decade, Decade, DecadeBias};
pub use profiles::{profile_for, GenreProfile, GENRE_PROFILES};
pub use reactivity::{reactivity_preset, ReactivityPreset, REACTIVITY_PRESETS};
