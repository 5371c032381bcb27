/// Starting ceiling for a band that has not seen signal yet.
pub const PEAK_FLOOR_DB: f32 = -30.0;

/// How fast the ceiling falls when the input is quieter, in dB per frame.
/// Slow on purpose: one loud transient should not pin the scale for long,
/// but the reference line must not chase every dip either.
pub const PEAK_DECAY_DB: f32 = 0.06;

/// Adaptive per-band ceiling: instant attack, linear decay.
pub struct PeakTracker {
    peaks: Vec<f32>,
    decay: f32,
}

impl PeakTracker {
    pub fn new(band_count: usize) -> Self {
        Self {
            peaks: vec![PEAK_FLOOR_DB; band_count],
            decay: PEAK_DECAY_DB,
        }
    }

    /// Feed one frame's dB value for band `i`; returns the updated ceiling.
    pub fn update(&mut self, i: usize, db: f32) -> f32 {
        self.peaks[i] = db.max(self.peaks[i] - self.decay);
        self.peaks[i]
    }

    pub fn peak(&self, i: usize) -> f32 {
        self.peaks[i]
    }
}

/// Map `db` into `0..=max_level` relative to the band's own ceiling:
/// `peak` lights everything, `peak - db_range` lights nothing.
pub fn normalize(db: f32, peak: f32, db_range: f32, max_level: u32) -> u32 {
    let floor = peak - db_range;
    let t = ((db - floor) / db_range).clamp(0.0, 1.0);
    ((t * max_level as f32).round() as u32).min(max_level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_is_instant() {
        let mut tracker = PeakTracker::new(1);
        assert_eq!(tracker.update(0, -10.0), -10.0);
        // Constant input keeps the ceiling pinned there.
        assert_eq!(tracker.update(0, -10.0), -10.0);
        assert_eq!(tracker.update(0, -10.0), -10.0);
    }

    #[test]
    fn decay_is_linear() {
        let mut tracker = PeakTracker::new(1);
        tracker.update(0, -10.0);
        tracker.update(0, -120.0);
        assert!((tracker.peak(0) - (-10.0 - PEAK_DECAY_DB)).abs() < 1e-5);
        tracker.update(0, -120.0);
        assert!((tracker.peak(0) - (-10.0 - 2.0 * PEAK_DECAY_DB)).abs() < 1e-5);
    }

    #[test]
    fn starts_at_the_floor() {
        let tracker = PeakTracker::new(3);
        for i in 0..3 {
            assert_eq!(tracker.peak(i), PEAK_FLOOR_DB);
        }
    }

    #[test]
    fn normalization_boundaries() {
        // db_range=60, max_level=10, peak=-10.
        assert_eq!(normalize(-10.0, -10.0, 60.0, 10), 10);
        assert_eq!(normalize(-70.0, -10.0, 60.0, 10), 0);
        assert_eq!(normalize(-40.0, -10.0, 60.0, 10), 5);
        // Below the floor clamps, above the peak clamps.
        assert_eq!(normalize(-200.0, -10.0, 60.0, 10), 0);
        assert_eq!(normalize(20.0, -10.0, 60.0, 10), 10);
    }

    #[test]
    fn normalization_is_monotone_in_input() {
        let mut last = 0;
        for db in (-70..=-10).step_by(2) {
            let level = normalize(db as f32, -10.0, 60.0, 10);
            assert!(level >= last);
            last = level;
        }
        assert_eq!(last, 10);
    }

    #[test]
    fn narrow_range_drops_quiet_input_faster() {
        let narrow = normalize(-40.0, -10.0, 45.0, 10);
        let wide = normalize(-40.0, -10.0, 75.0, 10);
        // -40 dB at peak -10: 45 dB range -> t=15/45, 75 dB range -> t=45/75.
        assert_eq!(narrow, 3);
        assert_eq!(wide, 6);
    }
}
