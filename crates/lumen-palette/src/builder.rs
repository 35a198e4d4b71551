//! Sequence builder: picks swatches from each selected family, vibrancy-tunes
//! them, and (when requested) contrast-orients family segments before
//! concatenating into the final emitted sequence.

use crate::families::{family_swatches, Family};
use lumen_core::color::{enforce_min_saturation, hue_distance, rgb_to_hsv, saturation_boost};

/// Evenly sample `count` swatches from a 12-entry family table.
///
/// `count == 0` returns an empty segment; `count >= 12` returns the whole
/// table. Otherwise indices are spread as evenly as the 12-wide table
/// allows, always landing on distinct swatches.
#[must_use]
pub fn pick_evenly(family: Family, count: usize) -> Vec<(u8, u8, u8)> {
    let table = family_swatches(family);
    if count == 0 {
        return Vec::new();
    }
    if count >= table.len() {
        return table.to_vec();
    }
    (0..count)
        .map(|i| {
            let idx = (i * table.len()) / count;
            table[idx]
        })
        .collect()
}

/// Vibrancy-tune a swatch: boost saturation, enforce a floor, except for
/// swatches that are already near-white/near-black ("soft tones"), which
/// are left alone so neutral accents survive.
#[must_use]
pub fn vibrancy_tune(color: (u8, u8, u8)) -> (u8, u8, u8) {
    let (h, s, v) = rgb_to_hsv(color.0, color.1, color.2);
    let is_soft_tone = v < 0.12 || v > 0.97;
    if is_soft_tone {
        return color;
    }
    let s = enforce_min_saturation(saturation_boost(s, 1.18), 0.55);
    lumen_core::color::hsv_to_rgb(h, s, v)
}

fn hue_of(color: (u8, u8, u8)) -> f32 {
    rgb_to_hsv(color.0, color.1, color.2).0
}

/// One family's picked-and-tuned segment, kept distinct until the final
/// concatenation so contrast-orientation can permute whole segments.
#[derive(Debug, Clone, PartialEq)]
struct Segment {
    colors: Vec<(u8, u8, u8)>,
}

impl Segment {
    fn candidates(&self) -> Vec<Vec<(u8, u8, u8)>> {
        let mut out = vec![self.colors.clone()];
        let mut reversed = self.colors.clone();
        reversed.reverse();
        if reversed != self.colors {
            out.push(reversed);
        }
        // Rotations: each distinct cyclic rotation of the segment.
        for start in 1..self.colors.len() {
            let mut rotated = self.colors[start..].to_vec();
            rotated.extend_from_slice(&self.colors[..start]);
            if !out.contains(&rotated) {
                out.push(rotated);
            }
        }
        out
    }
}

fn path_cost(order: &[Vec<(u8, u8, u8)>]) -> f32 {
    let flat: Vec<(u8, u8, u8)> = order.iter().flatten().copied().collect();
    if flat.len() < 2 {
        return 0.0;
    }
    let mut cost = 0.0;
    for w in flat.windows(2) {
        cost += hue_distance(hue_of(w[0]), hue_of(w[1]));
    }
    // Cycle closure: distance from the last color back to the first.
    cost += hue_distance(hue_of(flat[flat.len() - 1]), hue_of(flat[0]));
    cost
}

/// Exhaustively choose, per segment, a rotation/reversal candidate that
/// minimizes the combined adjacent-hue-distance + cycle-closure cost across
/// all segments. Deterministic: ties keep the earliest-found (lowest-index)
/// candidate combination.
fn contrast_orient(segments: Vec<Segment>) -> Vec<(u8, u8, u8)> {
    if segments.len() < 2 {
        return segments.into_iter().flat_map(|s| s.colors).collect();
    }
    let per_segment_candidates: Vec<Vec<Vec<(u8, u8, u8)>>> = segments.iter().map(Segment::candidates).collect();

    let mut best: Option<(f32, Vec<Vec<(u8, u8, u8)>>)> = None;
    let mut indices = vec![0usize; per_segment_candidates.len()];
    loop {
        let combo: Vec<Vec<(u8, u8, u8)>> =
            indices.iter().enumerate().map(|(seg, &i)| per_segment_candidates[seg][i].clone()).collect();
        let cost = path_cost(&combo);
        if best.as_ref().is_none_or(|(best_cost, _)| cost < *best_cost) {
            best = Some((cost, combo));
        }

        // Odometer increment over the candidate-index vector.
        let mut pos = indices.len();
        loop {
            if pos == 0 {
                return best.map(|(_, c)| c.into_iter().flatten().collect()).unwrap_or_default();
            }
            pos -= 1;
            indices[pos] += 1;
            if indices[pos] < per_segment_candidates[pos].len() {
                break;
            }
            indices[pos] = 0;
        }
    }
}

/// Build the final emitted sequence from selected families.
///
/// When `disorder` is false and at least two families are selected, segments
/// are contrast-oriented before concatenation; otherwise they are
/// concatenated in selection order. Falls back to a single deterministic
/// `Family::Blue` segment (`colors_per_family` swatches) when `families` is
/// empty.
#[must_use]
pub fn build_sequence(
    families: &[Family],
    colors_per_family: usize,
    disorder: bool,
    _disorder_aggression: f32,
) -> Vec<(u8, u8, u8)> {
    if families.is_empty() {
        return pick_evenly(Family::Blue, colors_per_family.max(1)).into_iter().map(vibrancy_tune).collect();
    }

    let segments: Vec<Segment> = families
        .iter()
        .map(|&f| Segment { colors: pick_evenly(f, colors_per_family).into_iter().map(vibrancy_tune).collect() })
        .collect();

    if disorder || segments.len() < 2 {
        segments.into_iter().flat_map(|s| s.colors).collect()
    } else {
        contrast_orient(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::{build_sequence, pick_evenly};
    use crate::families::Family;
    use lumen_core::color::hue_distance;

    #[test]
    fn pick_evenly_returns_distinct_indices() {
        let picked = pick_evenly(Family::Red, 3);
        assert_eq!(picked.len(), 3);
    }

    #[test]
    fn pick_evenly_zero_is_empty() {
        assert!(pick_evenly(Family::Green, 0).is_empty());
    }

    #[test]
    fn sequence_length_matches_selection() {
        let seq = build_sequence(&[Family::Red, Family::Green, Family::Blue], 3, false, 0.0);
        assert_eq!(seq.len(), 9);
    }

    #[test]
    fn empty_family_selection_falls_back_to_single_family() {
        let seq = build_sequence(&[], 4, false, 0.0);
        assert_eq!(seq.len(), 4);
    }

    #[test]
    fn contrast_orient_is_a_permutation_of_disordered_concat() {
        let ordered = build_sequence(&[Family::Red, Family::Blue], 3, false, 0.0);
        let disordered = build_sequence(&[Family::Red, Family::Blue], 3, true, 0.0);
        let mut a = ordered.clone();
        let mut b = disordered.clone();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }

    #[test]
    fn contrast_orient_never_increases_total_adjacent_hue_distance() {
        use lumen_core::color::rgb_to_hsv;
        let ordered = build_sequence(&[Family::Red, Family::Green, Family::Blue], 2, false, 0.0);
        let disordered = build_sequence(&[Family::Red, Family::Green, Family::Blue], 2, true, 0.0);
        let cost = |seq: &[(u8, u8, u8)]| -> f32 {
            seq.windows(2).map(|w| hue_distance(rgb_to_hsv(w[0].0, w[0].1, w[0].2).0, rgb_to_hsv(w[1].0, w[1].1, w[1].2).0)).sum()
        };
        assert!(cost(&ordered) <= cost(&disordered) + 1e-4);
    }
}
