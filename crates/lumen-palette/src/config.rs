//! Palette configuration: a global layer plus optional per-brand overrides.

use crate::cycle::CycleMode;
use crate::families::Family;

/// Which lighting brand a palette override (or emission) targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Brand {
    Hue,
    Wiz,
}

/// A single palette configuration layer: the set of knobs the builder and
/// cycle state read from.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteConfig {
    pub families: Vec<Family>,
    pub colors_per_family: usize,
    pub disorder: bool,
    pub disorder_aggression: f32,
    pub cycle_mode: CycleMode,
    pub timed_interval_sec: f32,
    pub beat_lock: bool,
    pub beat_lock_grace_ms: f32,
    pub reactive_margin: f32,
    pub manual_active: bool,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            families: vec![Family::Blue],
            colors_per_family: 4,
            disorder: false,
            disorder_aggression: 0.3,
            cycle_mode: CycleMode::ReactiveShift,
            timed_interval_sec: 6.0,
            beat_lock: false,
            beat_lock_grace_ms: 1200.0,
            reactive_margin: 1.0,
            manual_active: false,
        }
    }
}

/// The global layer plus an optional override per brand. Overrides are
/// partial: only `Some` fields replace the global layer's corresponding
/// field. Modeled as a full `PaletteConfig` clone-on-override for
/// simplicity, since every field has a meaningful global default.
#[derive(Debug, Clone, Default)]
pub struct PaletteConfigStore {
    global: PaletteConfig,
    hue_override: Option<PaletteConfig>,
    wiz_override: Option<PaletteConfig>,
}

impl PaletteConfigStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn global(&self) -> &PaletteConfig {
        &self.global
    }

    pub fn set_global(&mut self, config: PaletteConfig) {
        self.global = config;
    }

    /// `getPaletteConfigForBrand`: the brand's override if set, else global.
    #[must_use]
    pub fn config_for_brand(&self, brand: Brand) -> &PaletteConfig {
        let slot = match brand {
            Brand::Hue => &self.hue_override,
            Brand::Wiz => &self.wiz_override,
        };
        slot.as_ref().unwrap_or(&self.global)
    }

    /// `setManualPaletteConfig`: update the global layer, or a specific
    /// brand's override layer when `brand` is `Some`. `clear_override`
    /// removes the targeted brand's override instead of writing to it
    /// (ignored when `brand` is `None`).
    pub fn set_manual_palette_config(&mut self, brand: Option<Brand>, config: PaletteConfig, clear_override: bool) {
        match brand {
            None => self.global = config,
            Some(Brand::Hue) => {
                self.hue_override = if clear_override { None } else { Some(config) };
            }
            Some(Brand::Wiz) => {
                self.wiz_override = if clear_override { None } else { Some(config) };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Brand, PaletteConfig, PaletteConfigStore};
    use crate::families::Family;

    #[test]
    fn brand_without_override_falls_back_to_global() {
        let store = PaletteConfigStore::new();
        assert_eq!(store.config_for_brand(Brand::Hue), store.global());
    }

    #[test]
    fn brand_override_replaces_global_for_that_brand_only() {
        let mut store = PaletteConfigStore::new();
        let override_cfg = PaletteConfig { families: vec![Family::Red], ..PaletteConfig::default() };
        store.set_manual_palette_config(Some(Brand::Hue), override_cfg.clone(), false);
        assert_eq!(store.config_for_brand(Brand::Hue), &override_cfg);
        assert_ne!(store.config_for_brand(Brand::Wiz), &override_cfg);
    }

    #[test]
    fn clear_override_removes_it() {
        let mut store = PaletteConfigStore::new();
        let override_cfg = PaletteConfig { families: vec![Family::Red], ..PaletteConfig::default() };
        store.set_manual_palette_config(Some(Brand::Wiz), override_cfg, false);
        store.set_manual_palette_config(Some(Brand::Wiz), PaletteConfig::default(), true);
        assert_eq!(store.config_for_brand(Brand::Wiz), store.global());
    }
}
