use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::bands::BandPlan;
use super::EngineError;

/// Display floor. Empty bands, gated bands and digital silence all read as
/// this value so the renderer sees one consistent "nothing here".
pub const SILENCE_DB: f32 = -120.0;

const MAG_EPSILON: f32 = 1e-8;
const RMS_EPSILON: f32 = 1e-12;

/// Per-band loudness statistic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BandStat {
    /// Maximum bin. Jumpy; emphasizes transients and sibilance.
    Max,
    /// 90th percentile, linear-interpolated rank. Robust to single-bin spikes.
    P90,
    /// Amplitude-domain RMS, converted back to dB. Closest to energy.
    Rms,
}

impl FromStr for BandStat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max" => Ok(Self::Max),
            "p90" => Ok(Self::P90),
            "rms" => Ok(Self::Rms),
            other => Err(EngineError::UnknownStat(other.to_string())),
        }
    }
}

impl fmt::Display for BandStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Max => "max",
            Self::P90 => "p90",
            Self::Rms => "rms",
        })
    }
}

/// Windowed forward transform, reused every frame.
pub struct FrameAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    size: usize,
}

impl FrameAnalyzer {
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        Self {
            fft: planner.plan_fft_forward(fft_size),
            window: hann_window(fft_size),
            size: fft_size,
        }
    }

    /// Mono frame of `fft_size` samples -> dB half-spectrum (`fft_size/2 + 1`
    /// bins), floored at [`SILENCE_DB`].
    pub fn spectrum_db(&self, frame: &[f32]) -> Vec<f32> {
        debug_assert_eq!(frame.len(), self.size);
        let mut buffer: Vec<Complex<f32>> = frame
            .iter()
            .zip(&self.window)
            .map(|(&s, &w)| Complex::new(s * w, 0.0))
            .collect();
        self.fft.process(&mut buffer);

        buffer[..self.size / 2 + 1]
            .iter()
            .map(|c| (20.0 * (c.norm() + MAG_EPSILON).log10()).max(SILENCE_DB))
            .collect()
    }
}

/// Reduce a dB spectrum to one scalar per band. Empty bands read as silence.
pub fn band_levels_db(spectrum_db: &[f32], plan: &BandPlan, stat: BandStat) -> Vec<f32> {
    plan.bands()
        .iter()
        .map(|range| {
            let seg = &spectrum_db[range.clone()];
            if seg.is_empty() {
                return SILENCE_DB;
            }
            match stat {
                BandStat::Max => seg.iter().copied().fold(f32::NEG_INFINITY, f32::max),
                BandStat::P90 => percentile(seg, 90.0),
                BandStat::Rms => {
                    // RMS belongs in the amplitude domain; averaging dB
                    // directly would understate loud bins.
                    let mean_sq: f32 = seg
                        .iter()
                        .map(|&db| {
                            let amp = 10.0f32.powf(db / 20.0);
                            amp * amp
                        })
                        .sum::<f32>()
                        / seg.len() as f32;
                    20.0 * (mean_sq.sqrt() + RMS_EPSILON).log10()
                }
            }
        })
        .collect()
}

/// Linear-interpolated rank percentile: rank = q/100 * (n-1), interpolated
/// between the surrounding order statistics.
pub fn percentile(values: &[f32], q: f32) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);
    let rank = q / 100.0 * (sorted.len() - 1) as f32;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (rank - lo as f32) * (sorted[hi] - sorted[lo])
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos())
        })
        .collect()
}
