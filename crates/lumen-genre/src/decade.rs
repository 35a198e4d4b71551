//! Decade bias overlay: per-decade offsets applied to a genre's resolved
//! reference metadata.

use lumen_core::ids::{GenreDecadeMode, GenreId};

/// A concrete (non-`auto`) decade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decade {
    D90s,
    D00s,
    D10s,
    D20s,
}

/// Offsets applied on top of a `GenreProfile`'s behavior thresholds for a
/// given decade's production style (older material tends to sit lower
/// energy/brighter mids; newer material runs hotter and more compressed).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecadeBias {
    pub decade: Decade,
    pub idle_offset_delta: f32,
    pub flow_offset_delta: f32,
    pub bpm_scale: f32,
}

pub const DECADE_BIASES: [DecadeBias; 4] = [
    DecadeBias { decade: Decade::D90s, idle_offset_delta: 0.01, flow_offset_delta: 0.01, bpm_scale: 0.98 },
    DecadeBias { decade: Decade::D00s, idle_offset_delta: 0.005, flow_offset_delta: 0.0, bpm_scale: 1.0 },
    DecadeBias { decade: Decade::D10s, idle_offset_delta: -0.005, flow_offset_delta: -0.005, bpm_scale: 1.02 },
    DecadeBias { decade: Decade::D20s, idle_offset_delta: -0.01, flow_offset_delta: -0.01, bpm_scale: 1.04 },
];

#[must_use]
pub fn decade_bias(decade: Decade) -> &'static DecadeBias {
    DECADE_BIASES.iter().find(|b| b.decade == decade).unwrap_or(&DECADE_BIASES[1])
}

/// Resolve the mode into a concrete decade. In `auto` mode, the genre's
/// typical commercial era is used as a stand-in for detecting the track's
/// actual decade (the core has no access to metadata beyond the audio
/// signal itself).
#[must_use]
pub fn resolve_decade(mode: GenreDecadeMode, genre: GenreId) -> Decade {
    match mode {
        GenreDecadeMode::D90s => Decade::D90s,
        GenreDecadeMode::D00s => Decade::D00s,
        GenreDecadeMode::D10s => Decade::D10s,
        GenreDecadeMode::D20s => Decade::D20s,
        GenreDecadeMode::Auto => match genre {
            GenreId::House | GenreId::HipHop | GenreId::Rnb => Decade::D90s,
            GenreId::Rock | GenreId::Pop | GenreId::Techno => Decade::D00s,
            GenreId::Trance | GenreId::Dubstep | GenreId::Metal => Decade::D10s,
            GenreId::Dnb | GenreId::Ambient | GenreId::Cinematic => Decade::D20s,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_decade, Decade};
    use lumen_core::ids::{GenreDecadeMode, GenreId};

    #[test]
    fn explicit_mode_overrides_genre_heuristic() {
        assert_eq!(resolve_decade(GenreDecadeMode::D20s, GenreId::House), Decade::D20s);
    }

    #[test]
    fn auto_mode_resolves_deterministically() {
        let a = resolve_decade(GenreDecadeMode::Auto, GenreId::Dnb);
        let b = resolve_decade(GenreDecadeMode::Auto, GenreId::Dnb);
        assert_eq!(a, b);
    }
}
