//! The per-genre coefficient table: immutable program data, never loaded
//! from a file, enumerated exhaustively over the twelve supported genres.

use lumen_core::ids::GenreId;

/// One genre's full coefficient set: energy-follower gains, beat
/// thresholds, phrase gates, behavior-promotion gates, and reference-track
/// metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenreProfile {
    pub id: GenreId,
    pub title: &'static str,
    pub artist: &'static str,
    pub bpm: f32,
    pub detect_bpm: bool,
    pub beat_gap_scale: f32,

    pub idle_offset: f32,
    pub flow_offset: f32,
    pub pulse_floor_offset: f32,

    pub heavy_promote_energy: f32,
    pub heavy_promote_transient: f32,
    pub heavy_promote_flux: f32,
    pub heavy_promote_motion: f32,

    pub motion_beat_confidence: f32,
    pub motion_transient: f32,
    pub motion_flux: f32,

    pub quiet_rms_gate: f32,
    pub quiet_transient_gate: f32,
    pub quiet_flux_gate: f32,

    pub beat_threshold_bias: f32,
    pub beat_rise_bias: f32,

    pub audio_gain: f32,
    pub peak_lift: f32,
    pub transient_lift: f32,
    pub zcr_lift: f32,
    pub band_lift: f32,
    pub flux_lift: f32,
    pub vocal_penalty: f32,
    pub intensity_flux: f32,
    pub intensity_high: f32,

    pub beat_threshold_base: f32,
    pub beat_threshold_transient_scale: f32,
    pub beat_threshold_flux_scale: f32,
    pub beat_rise_gate_base: f32,
    pub beat_rise_gate_overdue_relief: f32,

    pub build_trend: f32,
    pub build_energy: f32,
    pub drop_slope: f32,
    pub drop_energy_gate: f32,
    pub recover_trend: f32,

    pub force_pulse_flux: f32,
    pub force_pulse_energy: f32,
    pub force_flow_low_flux: f32,

    pub aggression: f32,
}

macro_rules! profile {
    ($id:expr, $title:expr, $artist:expr, $bpm:expr, $detect:expr, $gap:expr,
     $idle:expr, $flow:expr, $pulse_floor:expr,
     $hp_e:expr, $hp_t:expr, $hp_f:expr, $hp_m:expr,
     $m_bc:expr, $m_t:expr, $m_f:expr,
     $q_rms:expr, $q_t:expr, $q_f:expr,
     $bt_bias:expr, $br_bias:expr,
     $gain:expr, $peak:expr, $trans:expr, $zcr:expr, $band:expr, $flux:expr, $vocal:expr, $i_flux:expr, $i_high:expr,
     $bt_base:expr, $bt_t_scale:expr, $bt_f_scale:expr, $br_base:expr, $br_relief:expr,
     $build_trend:expr, $build_energy:expr, $drop_slope:expr, $drop_gate:expr, $recover_trend:expr,
     $fp_flux:expr, $fp_energy:expr, $ff_low_flux:expr,
     $aggression:expr) => {
        GenreProfile {
            id: $id,
            title: $title,
            artist: $artist,
            bpm: $bpm,
            detect_bpm: $detect,
            beat_gap_scale: $gap,
            idle_offset: $idle,
            flow_offset: $flow,
            pulse_floor_offset: $pulse_floor,
            heavy_promote_energy: $hp_e,
            heavy_promote_transient: $hp_t,
            heavy_promote_flux: $hp_f,
            heavy_promote_motion: $hp_m,
            motion_beat_confidence: $m_bc,
            motion_transient: $m_t,
            motion_flux: $m_f,
            quiet_rms_gate: $q_rms,
            quiet_transient_gate: $q_t,
            quiet_flux_gate: $q_f,
            beat_threshold_bias: $bt_bias,
            beat_rise_bias: $br_bias,
            audio_gain: $gain,
            peak_lift: $peak,
            transient_lift: $trans,
            zcr_lift: $zcr,
            band_lift: $band,
            flux_lift: $flux,
            vocal_penalty: $vocal,
            intensity_flux: $i_flux,
            intensity_high: $i_high,
            beat_threshold_base: $bt_base,
            beat_threshold_transient_scale: $bt_t_scale,
            beat_threshold_flux_scale: $bt_f_scale,
            beat_rise_gate_base: $br_base,
            beat_rise_gate_overdue_relief: $br_relief,
            build_trend: $build_trend,
            build_energy: $build_energy,
            drop_slope: $drop_slope,
            drop_energy_gate: $drop_gate,
            recover_trend: $recover_trend,
            force_pulse_flux: $fp_flux,
            force_pulse_energy: $fp_energy,
            force_flow_low_flux: $ff_low_flux,
            aggression: $aggression,
        }
    };
}

pub const GENRE_PROFILES: [GenreProfile; 12] = [
    profile!(GenreId::House, "Can You Feel It", "Mr. Fingers", 122.0, true, 1.0,
        0.16, 0.42, 0.44, 0.62, 0.42, 0.40, 0.55, 0.5, 0.35, 0.3, 0.16, 0.14, 0.12, 0.0, 0.0,
        0.95, 0.12, 0.18, 0.05, 0.16, 0.14, 0.08, 0.18, 0.14,
        0.32, 0.16, 0.1, 0.06, 0.03, 0.016, 0.45, -0.02, 0.55, 0.01,
        0.62, 0.52, 0.18, 0.45),
    profile!(GenreId::Techno, "Spastik", "Plastikman", 130.0, true, 0.96,
        0.18, 0.44, 0.46, 0.6, 0.44, 0.42, 0.58, 0.52, 0.36, 0.31, 0.17, 0.15, 0.14, 0.01, 0.0,
        0.97, 0.1, 0.2, 0.05, 0.14, 0.16, 0.07, 0.2, 0.12,
        0.34, 0.17, 0.11, 0.065, 0.03, 0.017, 0.46, -0.022, 0.56, 0.01,
        0.6, 0.5, 0.16, 0.5),
    profile!(GenreId::Trance, "Adagio for Strings", "Tiesto", 138.0, true, 0.94,
        0.17, 0.43, 0.45, 0.58, 0.4, 0.38, 0.6, 0.55, 0.34, 0.3, 0.15, 0.13, 0.11, 0.02, 0.01,
        0.93, 0.14, 0.17, 0.05, 0.17, 0.15, 0.08, 0.19, 0.15,
        0.31, 0.15, 0.1, 0.055, 0.028, 0.018, 0.44, -0.019, 0.52, 0.011,
        0.58, 0.5, 0.17, 0.46),
    profile!(GenreId::Dnb, "Inner City Life", "Goldie", 174.0, true, 1.08,
        0.2, 0.46, 0.48, 0.68, 0.5, 0.48, 0.65, 0.5, 0.4, 0.34, 0.19, 0.17, 0.15, 0.02, 0.01,
        0.98, 0.11, 0.24, 0.06, 0.15, 0.19, 0.06, 0.22, 0.13,
        0.35, 0.19, 0.13, 0.07, 0.035, 0.02, 0.48, -0.025, 0.58, 0.009,
        0.7, 0.55, 0.2, 0.6),
    profile!(GenreId::Dubstep, "Scary Monsters and Nice Sprites", "Skrillex", 140.0, true, 1.1,
        0.21, 0.47, 0.5, 0.7, 0.55, 0.52, 0.6, 0.48, 0.42, 0.36, 0.2, 0.18, 0.16, 0.02, 0.02,
        1.0, 0.13, 0.26, 0.06, 0.2, 0.2, 0.06, 0.24, 0.18,
        0.36, 0.2, 0.14, 0.07, 0.04, 0.02, 0.5, -0.028, 0.6, 0.008,
        0.72, 0.56, 0.22, 0.62),
    profile!(GenreId::HipHop, "The Message", "Grandmaster Flash", 94.0, true, 0.88,
        0.14, 0.38, 0.4, 0.5, 0.3, 0.3, 0.5, 0.45, 0.28, 0.27, 0.14, 0.12, 0.1, -0.01, -0.01,
        0.9, 0.13, 0.16, 0.07, 0.2, 0.1, 0.12, 0.14, 0.12,
        0.3, 0.14, 0.08, 0.05, 0.025, 0.014, 0.4, -0.016, 0.48, 0.012,
        0.5, 0.46, 0.14, 0.36),
    profile!(GenreId::Pop, "Blinding Lights", "The Weeknd", 171.0, true, 1.0,
        0.15, 0.4, 0.42, 0.55, 0.36, 0.34, 0.52, 0.48, 0.3, 0.28, 0.15, 0.13, 0.11, -0.01, 0.0,
        0.9, 0.14, 0.15, 0.06, 0.15, 0.12, 0.1, 0.14, 0.12,
        0.3, 0.14, 0.09, 0.055, 0.028, 0.015, 0.4, -0.017, 0.48, 0.012,
        0.52, 0.46, 0.15, 0.35),
    profile!(GenreId::Rock, "Seven Nation Army", "The White Stripes", 124.0, true, 1.0,
        0.16, 0.41, 0.44, 0.58, 0.4, 0.36, 0.5, 0.45, 0.32, 0.3, 0.16, 0.14, 0.12, 0.0, 0.0,
        0.95, 0.13, 0.2, 0.07, 0.14, 0.13, 0.1, 0.16, 0.13,
        0.32, 0.16, 0.1, 0.06, 0.03, 0.016, 0.42, -0.018, 0.5, 0.011,
        0.56, 0.48, 0.16, 0.42),
    profile!(GenreId::Metal, "Raining Blood", "Slayer", 176.0, true, 1.12,
        0.22, 0.48, 0.52, 0.72, 0.58, 0.54, 0.55, 0.44, 0.44, 0.38, 0.22, 0.19, 0.17, 0.03, 0.02,
        1.02, 0.12, 0.28, 0.08, 0.12, 0.18, 0.1, 0.2, 0.1,
        0.38, 0.21, 0.15, 0.075, 0.042, 0.022, 0.52, -0.03, 0.6, 0.008,
        0.75, 0.58, 0.24, 0.68),
    profile!(GenreId::Rnb, "No Diggity", "Blackstreet", 97.0, true, 0.84,
        0.13, 0.37, 0.39, 0.48, 0.28, 0.26, 0.48, 0.44, 0.26, 0.25, 0.13, 0.11, 0.09, -0.02, -0.01,
        0.88, 0.15, 0.14, 0.07, 0.22, 0.09, 0.14, 0.12, 0.12,
        0.29, 0.13, 0.08, 0.045, 0.022, 0.013, 0.38, -0.014, 0.46, 0.013,
        0.46, 0.44, 0.13, 0.3),
    profile!(GenreId::Ambient, "An Ending (Ascent)", "Brian Eno", 70.0, false, 0.7,
        0.1, 0.3, 0.32, 0.4, 0.2, 0.18, 0.4, 0.38, 0.2, 0.2, 0.1, 0.08, 0.06, -0.03, -0.02,
        0.8, 0.16, 0.1, 0.08, 0.3, 0.06, 0.18, 0.08, 0.1,
        0.24, 0.1, 0.06, 0.035, 0.018, 0.01, 0.32, -0.01, 0.4, 0.015,
        0.38, 0.4, 0.1, 0.18),
    profile!(GenreId::Cinematic, "Time", "Hans Zimmer", 60.0, false, 0.68,
        0.12, 0.34, 0.36, 0.46, 0.26, 0.22, 0.42, 0.4, 0.24, 0.22, 0.12, 0.1, 0.08, -0.02, -0.01,
        0.85, 0.18, 0.13, 0.08, 0.25, 0.08, 0.16, 0.1, 0.12,
        0.27, 0.12, 0.07, 0.04, 0.02, 0.012, 0.35, -0.012, 0.42, 0.014,
        0.44, 0.42, 0.12, 0.25),
];

/// Look up a genre's coefficient row. `GENRE_PROFILES` always contains
/// exactly one row per `GenreId::ALL` entry, so this never falls back.
#[must_use]
pub fn profile_for(id: GenreId) -> &'static GenreProfile {
    GENRE_PROFILES
        .iter()
        .find(|p| p.id == id)
        .unwrap_or(&GENRE_PROFILES[0])
}

#[cfg(test)]
mod tests {
    use super::{profile_for, GENRE_PROFILES};
    use lumen_core::ids::GenreId;

    #[test]
    fn every_genre_id_has_exactly_one_row() {
        assert_eq!(GENRE_PROFILES.len(), GenreId::ALL.len());
        for id in GenreId::ALL {
            let p = profile_for(id);
            assert_eq!(p.id, id);
        }
    }

    #[test]
    fn coefficients_are_in_sane_ranges() {
        for p in &GENRE_PROFILES {
            assert!(p.bpm > 0.0 && p.bpm < 220.0);
            assert!((0.0..=1.0).contains(&p.aggression));
        }
    }
}
