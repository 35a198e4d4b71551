//! The Hz-only auto-planner: a simplified drive/motion to cadence mapping,
//! mutually exclusive with the full meta-auto planner.
//!
//! Unlike `MetaPlanner`, this planner never touches genre, reactivity preset
//! or auto-profile selection — it only chases a target refresh rate.

use lumen_planner::overclock_level_from_hz;

const MIN_HZ: f32 = 2.0;
const MAX_HZ: f32 = 16.0;
const RISE_ALPHA: f32 = 0.12;
const FALL_ALPHA: f32 = 0.06;

/// Tracks a target Hz derived from drive/motion, smoothed asymmetrically
/// (rises faster than it falls) and quantized to an overclock level.
#[derive(Debug, Clone, Copy)]
pub struct OverclockAutoPlanner {
    current_level: u8,
    target_hz_ema: f32,
}

impl Default for OverclockAutoPlanner {
    fn default() -> Self {
        Self { current_level: 3, target_hz_ema: lumen_planner::hz_for_level(3) }
    }
}

impl OverclockAutoPlanner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn level(&self) -> u8 {
        self.current_level
    }

    /// Advance the planner by one tick. `drive` and `motion` are both
    /// expected in `[0, 1]`.
    pub fn update(&mut self, drive: f32, motion: f32) -> u8 {
        let drive = drive.clamp(0.0, 1.0);
        let motion = motion.clamp(0.0, 1.0);
        let target_hz = (MIN_HZ + (MAX_HZ - MIN_HZ) * (drive * 0.6 + motion * 0.4)).clamp(MIN_HZ, MAX_HZ);

        let alpha = if target_hz > self.target_hz_ema { RISE_ALPHA } else { FALL_ALPHA };
        self.target_hz_ema += (target_hz - self.target_hz_ema) * alpha;

        self.current_level = overclock_level_from_hz(self.target_hz_ema);
        self.current_level
    }
}

#[cfg(test)]
mod tests {
    use super::OverclockAutoPlanner;

    #[test]
    fn idle_input_settles_near_default_level() {
        let mut planner = OverclockAutoPlanner::new();
        for _ in 0..200 {
            planner.update(0.0, 0.0);
        }
        assert!(planner.level() <= 2);
    }

    #[test]
    fn sustained_high_drive_raises_level() {
        let mut planner = OverclockAutoPlanner::new();
        let mut last = planner.level();
        for _ in 0..400 {
            last = planner.update(1.0, 1.0);
        }
        assert!(last >= 8);
    }

    #[test]
    fn rising_edge_moves_faster_than_falling_edge() {
        let mut rising = OverclockAutoPlanner::new();
        let mut falling = OverclockAutoPlanner { current_level: 3, target_hz_ema: lumen_planner::hz_for_level(10) };
        let before = falling.target_hz_ema;
        rising.update(1.0, 1.0);
        falling.update(0.0, 0.0);
        let rise_delta = rising.target_hz_ema - lumen_planner::hz_for_level(3);
        let fall_delta = before - falling.target_hz_ema;
        assert!(rise_delta > fall_delta);
    }
}
