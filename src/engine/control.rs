use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::analyzer::BandStat;
use super::EngineError;

/// Sensitivity presets, expressed as the dB span mapped to the full bar.
/// Smaller span = more sensitive.
pub const DB_RANGE_PRESETS: [(&str, f32); 3] =
    [("high", 45.0), ("medium", 60.0), ("low", 75.0)];

/// Spectral-subtraction strength presets.
pub const STRENGTH_PRESETS: [(&str, f32); 3] =
    [("light", 0.8), ("medium", 1.2), ("strong", 1.8)];

/// Icon background behind the bars. Unlit segments are never drawn, so a
/// transparent background shows nothing where a band is dark.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Background {
    Transparent,
    White,
    Black,
}

impl FromStr for Background {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transparent" => Ok(Self::Transparent),
            "white" => Ok(Self::White),
            "black" => Ok(Self::Black),
            other => Err(EngineError::UnknownBackground(other.to_string())),
        }
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Transparent => "transparent",
            Self::White => "white",
            Self::Black => "black",
        })
    }
}

/// One consistent view of the display settings, taken once per frame so the
/// worker never computes half a frame with old values and half with new.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    pub db_range: f32,
    pub max_level: u32,
    pub stat: BandStat,
    pub denoise_enabled: bool,
    pub denoise_strength: f32,
    pub gate_margin_db: f32,
    pub background: Background,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_range: 60.0,
            max_level: 10,
            stat: BandStat::Rms,
            denoise_enabled: false,
            denoise_strength: 1.2,
            gate_margin_db: 0.0,
            background: Background::Black,
        }
    }
}

/// Shared control surface between the worker and whatever drives it (tray
/// menu in the full application, timer threads in the shipped binary).
///
/// The stop/redraw/learn flags are edge-triggered: setting twice is the same
/// as setting once, and `take_*` consumes exactly one edge.
pub struct Controls {
    settings: Mutex<Settings>,
    force_redraw: AtomicBool,
    learn_noise: AtomicBool,
    stop: AtomicBool,
}

impl Controls {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
            force_redraw: AtomicBool::new(false),
            learn_noise: AtomicBool::new(false),
            stop: AtomicBool::new(false),
        }
    }

    pub fn snapshot(&self) -> Settings {
        *self.settings.lock().unwrap()
    }

    fn mutate(&self, f: impl FnOnce(&mut Settings)) {
        f(&mut self.settings.lock().unwrap());
        self.request_redraw();
    }

    pub fn set_db_range(&self, db_range: f32) {
        self.mutate(|s| s.db_range = db_range);
    }

    pub fn set_max_level(&self, max_level: u32) {
        self.mutate(|s| s.max_level = max_level);
    }

    pub fn set_stat(&self, stat: BandStat) {
        self.mutate(|s| s.stat = stat);
    }

    pub fn set_background(&self, background: Background) {
        self.mutate(|s| s.background = background);
    }

    pub fn set_denoise_enabled(&self, enabled: bool) {
        self.mutate(|s| s.denoise_enabled = enabled);
    }

    pub fn set_denoise_strength(&self, strength: f32) {
        self.mutate(|s| s.denoise_strength = strength);
    }

    pub fn request_redraw(&self) {
        self.force_redraw.store(true, Ordering::SeqCst);
    }

    pub fn take_redraw(&self) -> bool {
        self.force_redraw.swap(false, Ordering::SeqCst)
    }

    pub fn request_learn_noise(&self) {
        self.learn_noise.store(true, Ordering::SeqCst);
    }

    pub fn take_learn_noise(&self) -> bool {
        self.learn_noise.swap(false, Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

/// Parse a sensitivity preset name or a custom dB span.
pub fn parse_db_range(s: &str) -> Result<f32, EngineError> {
    if let Some(&(_, db)) = DB_RANGE_PRESETS.iter().find(|(name, _)| *name == s) {
        return Ok(db);
    }
    match s.parse::<f32>() {
        Ok(db) if db > 0.0 => Ok(db),
        _ => Err(EngineError::UnknownSensitivity(s.to_string())),
    }
}

/// Parse a denoise-strength preset name or a custom multiplier.
pub fn parse_strength(s: &str) -> Result<f32, EngineError> {
    if let Some(&(_, x)) = STRENGTH_PRESETS.iter().find(|(name, _)| *name == s) {
        return Ok(x);
    }
    match s.parse::<f32>() {
        Ok(x) if x >= 0.0 => Ok(x),
        _ => Err(EngineError::UnknownStrength(s.to_string())),
    }
}
