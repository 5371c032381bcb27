use super::analyzer::SILENCE_DB;

const POWER_EPSILON: f32 = 1e-12;

/// Per-band steady-state noise floor in dB, learned from a calibration
/// window. Absent until the first successful learn; lives only for the
/// process lifetime.
#[derive(Clone, Debug)]
pub struct NoiseProfile {
    band_db: Vec<f32>,
}

impl NoiseProfile {
    /// Collapse calibration frames (per-band P90 scores, one row per frame)
    /// into a profile via the per-band median. Returns `None` when nothing
    /// was captured, leaving any prior profile in place.
    pub fn from_frames(frames: &[Vec<f32>]) -> Option<Self> {
        let first = frames.first()?;
        let band_db = (0..first.len())
            .map(|i| {
                let column: Vec<f32> = frames.iter().map(|f| f[i]).collect();
                median(&column)
            })
            .collect();
        Some(Self { band_db })
    }

    pub fn band_db(&self) -> &[f32] {
        &self.band_db
    }

    /// Power-domain spectral subtraction plus a gate, in place.
    ///
    /// The gate deliberately kills real signal sitting at the noise floor;
    /// residual hiss flickering at one segment looks worse than a dark band.
    pub fn apply(&self, band_db: &mut [f32], strength: f32, gate_margin_db: f32) {
        for (db, &noise) in band_db.iter_mut().zip(&self.band_db) {
            let power = 10.0f32.powf(*db / 10.0);
            let noise_power = 10.0f32.powf(noise / 10.0);
            let clean = (power - strength * noise_power).max(POWER_EPSILON);
            let mut out = 10.0 * clean.log10();
            if out < noise + gate_margin_db {
                out = SILENCE_DB;
            }
            *db = out;
        }
    }
}

/// Median with the even-count average-of-middle-pair convention.
pub fn median(values: &[f32]) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_conventions() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
        assert_eq!(median(&[5.0]), 5.0);
    }

    #[test]
    fn profile_is_per_band_median_across_frames() {
        let frames = vec![
            vec![-60.0, -40.0],
            vec![-50.0, -44.0],
            vec![-70.0, -42.0],
        ];
        let profile = NoiseProfile::from_frames(&frames).unwrap();
        assert_eq!(profile.band_db(), &[-60.0, -42.0]);
    }

    #[test]
    fn zero_frames_yield_no_profile() {
        assert!(NoiseProfile::from_frames(&[]).is_none());
    }

    #[test]
    fn constant_frames_learn_that_constant() {
        let frames = vec![vec![-48.0; 4]; 12];
        let profile = NoiseProfile::from_frames(&frames).unwrap();
        assert_eq!(profile.band_db(), &[-48.0; 4]);
    }

    #[test]
    fn strength_zero_is_identity_above_the_gate() {
        let profile = NoiseProfile::from_frames(&[vec![-60.0]]).unwrap();
        let mut bands = vec![-30.0];
        profile.apply(&mut bands, 0.0, 0.0);
        assert!((bands[0] - -30.0).abs() < 1e-4);
    }

    #[test]
    fn subtraction_reduces_near_floor_signal() {
        let profile = NoiseProfile::from_frames(&[vec![-40.0]]).unwrap();
        // 3 dB above the floor: subtracting the full noise power costs far
        // more than 3 dB, which then trips the gate.
        let mut bands = vec![-37.0];
        profile.apply(&mut bands, 1.0, 0.0);
        assert_eq!(bands[0], SILENCE_DB);
    }

    #[test]
    fn loud_signal_survives_subtraction() {
        let profile = NoiseProfile::from_frames(&[vec![-60.0]]).unwrap();
        let mut bands = vec![-10.0];
        profile.apply(&mut bands, 1.8, 0.0);
        // 50 dB of headroom: the subtracted power is negligible.
        assert!((bands[0] - -10.0).abs() < 0.1);
    }

    #[test]
    fn gate_margin_widens_the_kill_zone() {
        let profile = NoiseProfile::from_frames(&[vec![-40.0]]).unwrap();
        // Identity subtraction; -25 >= -40 + 14 -> survives.
        let mut bands = vec![-25.0];
        profile.apply(&mut bands, 0.0, 14.0);
        assert!((bands[0] - -25.0).abs() < 1e-4);
        // -25 < -40 + 20 -> gated.
        let mut bands = vec![-25.0];
        profile.apply(&mut bands, 0.0, 20.0);
        assert_eq!(bands[0], SILENCE_DB);
    }

    #[test]
    fn subtraction_never_produces_nan() {
        let profile = NoiseProfile::from_frames(&[vec![0.0]]).unwrap();
        let mut bands = vec![SILENCE_DB];
        profile.apply(&mut bands, 1.8, 0.0);
        assert!(bands[0].is_finite());
        assert_eq!(bands[0], SILENCE_DB);
    }
}
