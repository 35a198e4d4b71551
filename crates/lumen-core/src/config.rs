//! Engine startup configuration, loaded from environment variables and
//! merged with documented defaults.
//!
//! Mirrors the corpus's merge-with-defaults config loader, applied to
//! `std::env::var` instead of a TOML file: a malformed value never panics,
//! it falls back to the default and logs a warning.

use crate::ids::{AutoProfileName, GenreDecadeMode, ReactivityPresetName};

/// Startup configuration for the engine, assembled once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub default_overclock_level: u8,
    pub drop_enabled: bool,
    pub auto_profile: AutoProfileName,
    pub audio_reactivity_preset: ReactivityPresetName,
    pub flow_intensity: f32,
    pub wiz_scene_sync: bool,
    pub meta_auto_default: bool,
    pub overclock_auto_default: bool,
    pub tempo_tracker_baseline: bool,
    pub tempo_tracker_peaks: bool,
    pub tempo_tracker_transients: bool,
    pub tempo_tracker_flux: bool,
    pub tempo_trackers_auto: bool,
    pub genre_decade_mode: GenreDecadeMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_overclock_level: 3,
            drop_enabled: true,
            auto_profile: AutoProfileName::Balanced,
            audio_reactivity_preset: ReactivityPresetName::Balanced,
            flow_intensity: 1.0,
            wiz_scene_sync: true,
            meta_auto_default: false,
            overclock_auto_default: false,
            tempo_tracker_baseline: true,
            tempo_tracker_peaks: true,
            tempo_tracker_transients: true,
            tempo_tracker_flux: true,
            tempo_trackers_auto: true,
            genre_decade_mode: GenreDecadeMode::Auto,
        }
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            other => {
                log::warn!("{key}: unrecognized bool `{other}`, using default {default}");
                default
            }
        },
        Err(_) => default,
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(v) => v.trim().parse::<T>().unwrap_or_else(|_| {
            log::warn!("{key}: malformed value `{v}`, using default");
            default
        }),
        Err(_) => default,
    }
}

fn env_enum<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(v) => T::from_str(v.trim()).unwrap_or_else(|_| {
            log::warn!("{key}: unrecognized value `{v}`, using default");
            default
        }),
        Err(_) => default,
    }
}

impl EngineConfig {
    /// Load configuration from the environment table documented in the
    /// external-interfaces section, falling back to defaults on any missing
    /// or malformed value.
    #[must_use]
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            default_overclock_level: env_parsed("DEFAULT_OVERCLOCK_LEVEL", d.default_overclock_level)
                .min(12),
            drop_enabled: env_bool("DROP_ENABLED", d.drop_enabled),
            auto_profile: env_enum("AUTO_PROFILE", d.auto_profile),
            audio_reactivity_preset: env_enum("AUDIO_REACTIVITY_PRESET", d.audio_reactivity_preset),
            flow_intensity: env_parsed("FLOW_INTENSITY", d.flow_intensity).clamp(0.35, 2.5),
            wiz_scene_sync: env_bool("WIZ_SCENE_SYNC", d.wiz_scene_sync),
            meta_auto_default: env_bool("META_AUTO_DEFAULT", d.meta_auto_default),
            overclock_auto_default: env_bool("OVERCLOCK_AUTO_DEFAULT", d.overclock_auto_default),
            tempo_tracker_baseline: env_bool(
                "META_AUTO_BASELINE_TEMPO_TRACKER",
                d.tempo_tracker_baseline,
            ),
            tempo_tracker_peaks: env_bool("META_AUTO_PEAKS_TEMPO_TRACKER", d.tempo_tracker_peaks),
            tempo_tracker_transients: env_bool(
                "META_AUTO_TRANSIENTS_TEMPO_TRACKER",
                d.tempo_tracker_transients,
            ),
            tempo_tracker_flux: env_bool("META_AUTO_FLUX_TEMPO_TRACKER", d.tempo_tracker_flux),
            tempo_trackers_auto: env_bool("META_AUTO_TEMPO_TRACKERS_AUTO", d.tempo_trackers_auto),
            genre_decade_mode: env_enum("GENRE_DECADE_MODE", d.genre_decade_mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EngineConfig;

    #[test]
    fn default_is_sane() {
        let c = EngineConfig::default();
        assert!(c.default_overclock_level <= 12);
        assert!((0.35..=2.5).contains(&c.flow_intensity));
    }

    #[test]
    fn from_env_never_panics_on_missing_vars() {
        // SAFETY-free: reading absent vars always falls back to defaults.
        let c = EngineConfig::from_env();
        assert!(c.default_overclock_level <= 12);
    }
}
