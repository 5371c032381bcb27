use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "spectray", about = "Real-time per-band audio level engine")]
pub struct Cli {
    /// Sample rate of the incoming stream in Hz
    #[arg(long, default_value_t = 48000)]
    pub rate: u32,

    /// Transform size in samples (power of two); also the block size read per frame
    #[arg(long, default_value_t = 4096)]
    pub fft_size: usize,

    /// Number of display bands
    #[arg(long, default_value_t = 8)]
    pub bands: usize,

    /// Lowest analyzed frequency in Hz
    #[arg(long, default_value_t = 80.0)]
    pub fmin: f32,

    /// Highest analyzed frequency in Hz (at most rate/2)
    #[arg(long, default_value_t = 16000.0)]
    pub fmax: f32,

    /// Channel count of the incoming stream (downmixed to mono)
    #[arg(long, default_value_t = 2)]
    pub channels: usize,

    /// Sample format of the stdin stream (f32le, s16le)
    #[arg(long, default_value = "f32le")]
    pub format: String,

    /// Generate a test tone at this frequency instead of reading stdin
    #[arg(long)]
    pub tone: Option<f32>,

    /// Stop after this many seconds (0 = run until the stream ends)
    #[arg(long, default_value_t = 0.0)]
    pub duration: f32,

    /// Sensitivity: high, medium, low, or a custom dB range
    #[arg(long, default_value = "medium")]
    pub sensitivity: String,

    /// Number of lit segments at full scale
    #[arg(long, default_value_t = 10)]
    pub max_level: u32,

    /// Per-band statistic: max, p90, rms
    #[arg(long, default_value = "rms")]
    pub stat: String,

    /// Bar background: transparent, white, black
    #[arg(long, default_value = "black")]
    pub background: String,

    /// Enable noise suppression of the displayed levels
    #[arg(long)]
    pub denoise: bool,

    /// Suppression strength: light, medium, strong, or a custom multiplier
    #[arg(long, default_value = "medium")]
    pub denoise_strength: String,

    /// Extra dB above the noise floor below which a band is blanked
    #[arg(long, default_value_t = 0.0)]
    pub gate_margin: f32,

    /// Learn the noise profile this many seconds after startup
    #[arg(long)]
    pub learn_after: Option<f32>,

    /// Config file path (default: spectray.toml or the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
