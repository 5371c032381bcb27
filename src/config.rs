use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub denoise: DenoiseConfig,
}

#[derive(Debug, Deserialize)]
pub struct StreamConfig {
    #[serde(default = "default_rate")]
    pub rate: u32,
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,
    #[serde(default = "default_bands")]
    pub bands: usize,
    #[serde(default = "default_fmin")]
    pub fmin: f32,
    #[serde(default = "default_fmax")]
    pub fmax: f32,
    #[serde(default = "default_channels")]
    pub channels: usize,
    #[serde(default = "default_format")]
    pub format: String,
}

#[derive(Debug, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_sensitivity")]
    pub sensitivity: String,
    #[serde(default = "default_max_level")]
    pub max_level: u32,
    #[serde(default = "default_stat")]
    pub stat: String,
    #[serde(default = "default_background")]
    pub background: String,
}

#[derive(Debug, Deserialize)]
pub struct DenoiseConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_strength")]
    pub strength: String,
    #[serde(default)]
    pub gate_margin: f32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            rate: default_rate(),
            fft_size: default_fft_size(),
            bands: default_bands(),
            fmin: default_fmin(),
            fmax: default_fmax(),
            channels: default_channels(),
            format: default_format(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            sensitivity: default_sensitivity(),
            max_level: default_max_level(),
            stat: default_stat(),
            background: default_background(),
        }
    }
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            strength: default_strength(),
            gate_margin: 0.0,
        }
    }
}

fn default_rate() -> u32 { 48000 }
fn default_fft_size() -> usize { 4096 }
fn default_bands() -> usize { 8 }
fn default_fmin() -> f32 { 80.0 }
fn default_fmax() -> f32 { 16000.0 }
fn default_channels() -> usize { 2 }
fn default_format() -> String { "f32le".into() }
fn default_sensitivity() -> String { "medium".into() }
fn default_max_level() -> u32 { 10 }
fn default_stat() -> String { "rms".into() }
fn default_background() -> String { "black".into() }
fn default_strength() -> String { "medium".into() }

pub fn load_config(path: &PathBuf) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.stream.rate, 48000);
        assert_eq!(cfg.stream.fft_size, 4096);
        assert_eq!(cfg.display.stat, "rms");
        assert!(!cfg.denoise.enabled);
    }

    #[test]
    fn partial_sections_fill_in() {
        let cfg: Config = toml::from_str(
            "[display]\nsensitivity = \"high\"\n\n[denoise]\nenabled = true\n",
        )
        .unwrap();
        assert_eq!(cfg.display.sensitivity, "high");
        assert_eq!(cfg.display.max_level, 10);
        assert!(cfg.denoise.enabled);
        assert_eq!(cfg.denoise.strength, "medium");
        assert_eq!(cfg.stream.bands, 8);
    }
}
