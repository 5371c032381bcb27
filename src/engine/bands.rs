use std::ops::Range;

use super::EngineError;

/// Mapping from display bands to half-spectrum bin ranges.
///
/// Built once at startup from the transform geometry; immutable afterwards.
/// Band edges are log-spaced so low bands are narrower in Hz, matching how
/// the ear weighs frequency. A band that captures no bins stays in the plan
/// as an empty range and reads as permanently silent downstream.
#[derive(Clone, Debug)]
pub struct BandPlan {
    bands: Vec<Range<usize>>,
}

impl BandPlan {
    pub fn new(
        sample_rate: u32,
        fft_size: usize,
        band_count: usize,
        fmin: f32,
        fmax: f32,
    ) -> Result<Self, EngineError> {
        if sample_rate == 0 {
            return Err(EngineError::InvalidSampleRate(sample_rate));
        }
        if fft_size == 0 || !fft_size.is_power_of_two() {
            return Err(EngineError::InvalidFftSize(fft_size));
        }
        if band_count == 0 {
            return Err(EngineError::InvalidBandCount);
        }
        let nyquist = sample_rate as f32 / 2.0;
        if !(fmin > 0.0 && fmin < fmax && fmax <= nyquist) {
            return Err(EngineError::InvalidFrequencyBounds { fmin, fmax, nyquist });
        }

        let half = fft_size / 2;
        let bin_hz = sample_rate as f32 / fft_size as f32;
        let ratio = fmax / fmin;
        let edge = |i: usize| fmin * ratio.powf(i as f32 / band_count as f32);

        let mut bands = Vec::with_capacity(band_count);
        for i in 0..band_count {
            let (lo, hi) = (edge(i), edge(i + 1));
            let mut start = None;
            let mut end = 0;
            for k in 0..=half {
                let freq = k as f32 * bin_hz;
                if freq >= lo && freq < hi {
                    start.get_or_insert(k);
                    end = k + 1;
                }
            }
            bands.push(match start {
                Some(s) => s..end,
                None => 0..0,
            });
        }

        Ok(Self { bands })
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn bands(&self) -> &[Range<usize>] {
        &self.bands
    }
}
