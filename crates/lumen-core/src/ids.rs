//! Enumerated identifiers shared by the config, genre and planner layers.
//!
//! These are kept in the data-model crate (rather than alongside the tables
//! that use them) so every other crate can name an `AutoProfileName` or a
//! `ReactivityPresetName` without depending on the table crate that owns the
//! actual coefficient rows.

use std::fmt;
use std::str::FromStr;

/// One of the three debounce/hysteresis timing presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutoProfileName {
    Reactive,
    Balanced,
    Cinematic,
}

impl FromStr for AutoProfileName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reactive" => Ok(Self::Reactive),
            "balanced" => Ok(Self::Balanced),
            "cinematic" => Ok(Self::Cinematic),
            _ => Err(()),
        }
    }
}

impl fmt::Display for AutoProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Reactive => "reactive",
            Self::Balanced => "balanced",
            Self::Cinematic => "cinematic",
        };
        write!(f, "{s}")
    }
}

/// Multiplier overlay applied on top of a `GenreProfile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactivityPresetName {
    Balanced,
    Aggressive,
    Precision,
}

impl FromStr for ReactivityPresetName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "balanced" => Ok(Self::Balanced),
            "aggressive" => Ok(Self::Aggressive),
            "precision" => Ok(Self::Precision),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ReactivityPresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Balanced => "balanced",
            Self::Aggressive => "aggressive",
            Self::Precision => "precision",
        };
        write!(f, "{s}")
    }
}

/// Per-genre reference-decade resolution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GenreDecadeMode {
    #[default]
    Auto,
    D90s,
    D00s,
    D10s,
    D20s,
}

impl FromStr for GenreDecadeMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "90s" => Ok(Self::D90s),
            "00s" => Ok(Self::D00s),
            "10s" => Ok(Self::D10s),
            "20s" => Ok(Self::D20s),
            _ => Err(()),
        }
    }
}

impl fmt::Display for GenreDecadeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Auto => "auto",
            Self::D90s => "90s",
            Self::D00s => "00s",
            Self::D10s => "10s",
            Self::D20s => "20s",
        };
        write!(f, "{s}")
    }
}

/// The top-level visual regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Behavior {
    #[default]
    Idle,
    Flow,
    Pulse,
}

impl Behavior {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Flow => "flow",
            Self::Pulse => "pulse",
        }
    }
}

/// Phrase classification from the energy-trend detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phrase {
    #[default]
    Neutral,
    Build,
    Recover,
    Drop,
}

impl Phrase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Build => "build",
            Self::Recover => "recover",
            Self::Drop => "drop",
        }
    }
}

/// The closed set of tempo-evidence channels the election process scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TempoTracker {
    Baseline,
    Peaks,
    Transients,
    Flux,
}

impl TempoTracker {
    pub const ALL: [Self; 4] = [Self::Baseline, Self::Peaks, Self::Transients, Self::Flux];
}

/// A closed set of twelve genre labels the classifier emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenreId {
    House,
    Techno,
    Trance,
    Dnb,
    Dubstep,
    HipHop,
    Pop,
    Rock,
    Metal,
    Rnb,
    Ambient,
    Cinematic,
}

impl GenreId {
    pub const ALL: [Self; 12] = [
        Self::House,
        Self::Techno,
        Self::Trance,
        Self::Dnb,
        Self::Dubstep,
        Self::HipHop,
        Self::Pop,
        Self::Rock,
        Self::Metal,
        Self::Rnb,
        Self::Ambient,
        Self::Cinematic,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::House => "house",
            Self::Techno => "techno",
            Self::Trance => "trance",
            Self::Dnb => "dnb",
            Self::Dubstep => "dubstep",
            Self::HipHop => "hiphop",
            Self::Pop => "pop",
            Self::Rock => "rock",
            Self::Metal => "metal",
            Self::Rnb => "rnb",
            Self::Ambient => "ambient",
            Self::Cinematic => "cinematic",
        }
    }
}

/// Resolve an overclock setter's string alias to a level in `[0, 12]`.
///
/// Accepts plain integers (`"5"`) and the named aliases from §6.1.
#[must_use]
pub fn overclock_alias_to_level(alias: &str) -> Option<u8> {
    if let Ok(n) = alias.parse::<u8>() {
        if n <= 12 {
            return Some(n);
        }
        return None;
    }
    match alias {
        "x1" => Some(0),
        "x2" => Some(2),
        "x4" => Some(4),
        "x6" => Some(6),
        "turbo8" => Some(8),
        "ludicrous" => Some(7),
        "destructive60" => Some(12),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{overclock_alias_to_level, AutoProfileName, GenreDecadeMode, ReactivityPresetName};
    use std::str::FromStr;

    #[test]
    fn parses_known_names() {
        assert_eq!(AutoProfileName::from_str("balanced"), Ok(AutoProfileName::Balanced));
        assert_eq!(ReactivityPresetName::from_str("aggressive"), Ok(ReactivityPresetName::Aggressive));
        assert_eq!(GenreDecadeMode::from_str("90s"), Ok(GenreDecadeMode::D90s));
        assert!(AutoProfileName::from_str("nope").is_err());
    }

    #[test]
    fn alias_resolution() {
        assert_eq!(overclock_alias_to_level("turbo8"), Some(8));
        assert_eq!(overclock_alias_to_level("ludicrous"), Some(7));
        assert_eq!(overclock_alias_to_level("5"), Some(5));
        assert_eq!(overclock_alias_to_level("13"), None);
        assert_eq!(overclock_alias_to_level("bogus"), None);
    }
}
