mod cli;
mod config;
mod engine;
mod render;
mod source;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use engine::analyzer::BandStat;
use engine::control::{parse_db_range, parse_strength, Background, Controls, Settings};
use engine::worker::Engine;
use engine::EngineError;
use render::TerminalSink;
use source::{FrameSource, RawPcmSource, SampleFormat, ToneSource};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect spectray.toml / global config
    let config_path = cli.config.clone().or_else(|| {
        let local = std::path::PathBuf::from("spectray.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("spectray").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("spectray").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    });
    if let Some(ref path) = config_path {
        if let Some(cfg) = config::load_config(path) {
            log::info!("Loaded config from {}", path.display());
            // Merge: config values apply only when CLI is at its default
            if cli.rate == 48000 { cli.rate = cfg.stream.rate; }
            if cli.fft_size == 4096 { cli.fft_size = cfg.stream.fft_size; }
            if cli.bands == 8 { cli.bands = cfg.stream.bands; }
            if cli.fmin == 80.0 { cli.fmin = cfg.stream.fmin; }
            if cli.fmax == 16000.0 { cli.fmax = cfg.stream.fmax; }
            if cli.channels == 2 { cli.channels = cfg.stream.channels; }
            if cli.format == "f32le" { cli.format = cfg.stream.format; }
            if cli.sensitivity == "medium" { cli.sensitivity = cfg.display.sensitivity; }
            if cli.max_level == 10 { cli.max_level = cfg.display.max_level; }
            if cli.stat == "rms" { cli.stat = cfg.display.stat; }
            if cli.background == "black" { cli.background = cfg.display.background; }
            if !cli.denoise { cli.denoise = cfg.denoise.enabled; }
            if cli.denoise_strength == "medium" { cli.denoise_strength = cfg.denoise.strength; }
            if cli.gate_margin == 0.0 { cli.gate_margin = cfg.denoise.gate_margin; }
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    // Validate the string-typed modes up front; past this point everything
    // is a closed enum or a checked number.
    let stat: BandStat = cli.stat.parse()?;
    let background: Background = cli.background.parse()?;
    let db_range = parse_db_range(&cli.sensitivity)?;
    let denoise_strength = parse_strength(&cli.denoise_strength)?;
    let format: SampleFormat = cli.format.parse()?;
    if cli.max_level == 0 {
        return Err(EngineError::InvalidMaxLevel.into());
    }
    if cli.channels == 0 {
        anyhow::bail!("channel count must be positive");
    }

    let settings = Settings {
        db_range,
        max_level: cli.max_level,
        stat,
        denoise_enabled: cli.denoise,
        denoise_strength,
        gate_margin_db: cli.gate_margin,
        background,
    };

    let mut engine = Engine::new(cli.rate, cli.fft_size, cli.bands, cli.fmin, cli.fmax)?;
    let controls = Arc::new(Controls::new(settings));

    log::info!(
        "spectray: {} bands over {}-{} Hz, stat {}, sensitivity {} dB",
        engine.band_count(), cli.fmin, cli.fmax, stat, db_range
    );

    if cli.duration > 0.0 {
        let controls = Arc::clone(&controls);
        let duration = cli.duration;
        thread::spawn(move || {
            thread::sleep(Duration::from_secs_f32(duration));
            log::info!("duration elapsed, stopping");
            controls.stop();
        });
    }

    if let Some(delay) = cli.learn_after {
        let controls = Arc::clone(&controls);
        thread::spawn(move || {
            thread::sleep(Duration::from_secs_f32(delay));
            log::info!("requesting noise calibration");
            controls.request_learn_noise();
        });
    }

    let mut source: Box<dyn FrameSource> = match cli.tone {
        Some(freq) => {
            log::info!("using a {freq} Hz test tone");
            Box::new(ToneSource::new(cli.rate, cli.fft_size, freq))
        }
        None => {
            log::info!("reading {} x{} PCM from stdin", cli.format, cli.channels);
            Box::new(RawPcmSource::new(
                std::io::stdin().lock(),
                format,
                cli.channels,
                cli.fft_size,
            ))
        }
    };

    let mut sink = TerminalSink::stdout();
    engine.run(source.as_mut(), &controls, &mut sink)?;

    println!();
    log::info!("Done");
    Ok(())
}
