pub mod analyzer;
pub mod bands;
pub mod change;
pub mod control;
pub mod denoise;
pub mod peak;
pub mod worker;

use thiserror::Error;

/// Configuration-time validation errors. Raised before the worker starts,
/// never mid-stream.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("sample rate must be positive, got {0}")]
    InvalidSampleRate(u32),

    #[error("fft size must be a non-zero power of two, got {0}")]
    InvalidFftSize(usize),

    #[error("band count must be at least 1")]
    InvalidBandCount,

    #[error("invalid frequency bounds {fmin}..{fmax} Hz (nyquist {nyquist} Hz)")]
    InvalidFrequencyBounds { fmin: f32, fmax: f32, nyquist: f32 },

    #[error("max level must be positive")]
    InvalidMaxLevel,

    #[error("unknown band statistic '{0}' (expected max, p90 or rms)")]
    UnknownStat(String),

    #[error("unknown background '{0}' (expected transparent, white or black)")]
    UnknownBackground(String),

    #[error("unknown sensitivity '{0}' (expected high, medium, low or a dB value)")]
    UnknownSensitivity(String),

    #[error("unknown denoise strength '{0}' (expected light, medium, strong or a number)")]
    UnknownStrength(String),
}
