//! Frame ingress and the near-silence deadzone.

use lumen_core::AudioFrame;

/// Clamp `frame` to its documented domain, then hard-zero every field when
/// the joint near-silence predicate holds.
#[must_use]
pub fn ingest(frame: AudioFrame) -> AudioFrame {
    let clamped = frame.clamp_to_domain();
    if clamped.is_near_silent() {
        AudioFrame::zeroed()
    } else {
        clamped
    }
}

#[cfg(test)]
mod tests {
    use super::ingest;
    use lumen_core::AudioFrame;

    #[test]
    fn clamps_every_field_into_domain() {
        let f = AudioFrame {
            rms: 4.0,
            peak: -3.0,
            transient: 99.0,
            zcr: -9.0,
            band_low: 20.0,
            band_mid: 0.4,
            band_high: -2.0,
            spectral_flux: 12.0,
        };
        let out = ingest(f);
        assert!((0.0..=1.0).contains(&out.rms));
        assert!((0.0..=1.5).contains(&out.peak));
        assert!((0.0..=1.2).contains(&out.transient));
        assert!((0.0..=1.0).contains(&out.zcr));
        assert!((0.0..=1.0).contains(&out.band_low));
        assert!((0.0..=1.0).contains(&out.band_mid));
        assert!((0.0..=1.0).contains(&out.band_high));
        assert!((0.0..=1.0).contains(&out.spectral_flux));
    }

    #[test]
    fn near_silence_latches_all_fields_to_zero() {
        let f = AudioFrame {
            rms: 0.04,
            peak: 0.09,
            transient: 0.05,
            zcr: 0.2,
            band_low: 0.2,
            band_mid: 0.2,
            band_high: 0.2,
            spectral_flux: 0.04,
        };
        let out = ingest(f);
        assert_eq!(out, AudioFrame::zeroed());
    }

    #[test]
    fn loud_frame_passes_through_clamped() {
        let f = AudioFrame { rms: 0.4, peak: 0.5, band_low: 0.5, ..AudioFrame::default() };
        let out = ingest(f);
        assert!(out.rms > 0.0);
    }
}
