use anyhow::Result;

use crate::source::{downmix, FrameSource};

use super::analyzer::{band_levels_db, BandStat, FrameAnalyzer};
use super::bands::BandPlan;
use super::change::ChangeDetector;
use super::control::{Background, Controls};
use super::denoise::NoiseProfile;
use super::peak::{normalize, PeakTracker};
use super::EngineError;

/// One accepted frame of output: the level vector plus the settings that
/// produced it, everything a renderer needs to rasterize.
#[derive(Clone, Debug)]
pub struct LevelFrame {
    pub levels: Vec<u32>,
    pub max_level: u32,
    pub db_range: f32,
    pub background: Background,
    pub stat: BandStat,
}

/// Renderer seam. Contract: draw only the bottom `level` segments of
/// `max_level` per band; unlit segments are absent, not dimmed.
pub trait LevelSink {
    fn deliver(&mut self, frame: &LevelFrame);
}

/// The spectral level engine. A single worker owns the peaks, the noise
/// profile, the change state and the source cursor; everything else reaches
/// it through [`Controls`].
pub struct Engine {
    sample_rate: u32,
    fft_size: usize,
    plan: BandPlan,
    analyzer: FrameAnalyzer,
    peaks: PeakTracker,
    change: ChangeDetector,
    noise: Option<NoiseProfile>,
}

impl Engine {
    pub fn new(
        sample_rate: u32,
        fft_size: usize,
        band_count: usize,
        fmin: f32,
        fmax: f32,
    ) -> Result<Self, EngineError> {
        let plan = BandPlan::new(sample_rate, fft_size, band_count, fmin, fmax)?;
        Ok(Self {
            sample_rate,
            fft_size,
            analyzer: FrameAnalyzer::new(fft_size),
            peaks: PeakTracker::new(plan.len()),
            change: ChangeDetector::new(),
            noise: None,
            plan,
        })
    }

    pub fn band_count(&self) -> usize {
        self.plan.len()
    }

    pub fn noise_profile(&self) -> Option<&NoiseProfile> {
        self.noise.as_ref()
    }

    /// Run the pipeline until the source ends or a stop is requested.
    ///
    /// Blocks only on `next_block` (roughly `fft_size / sample_rate` seconds
    /// per frame). Short or empty blocks are skipped, never retried; a
    /// source error is fatal.
    pub fn run(
        &mut self,
        source: &mut dyn FrameSource,
        controls: &Controls,
        sink: &mut dyn LevelSink,
    ) -> Result<()> {
        log::info!(
            "engine running: {} bands, fft {} @ {} Hz (~{:.0} ms/frame)",
            self.plan.len(),
            self.fft_size,
            self.sample_rate,
            1000.0 * self.fft_size as f32 / self.sample_rate as f32,
        );

        while !controls.stopped() {
            let Some(block) = source.next_block()? else {
                log::info!("source ended");
                break;
            };
            let mono = downmix(&block, source.channels());
            if mono.len() != self.fft_size {
                log::debug!("skipping short block ({} of {} samples)", mono.len(), self.fft_size);
                continue;
            }

            let spectrum = self.analyzer.spectrum_db(&mono);

            if controls.take_learn_noise() {
                match self.calibrate(source, controls)? {
                    Some(profile) => {
                        log::info!("noise profile learned: {:?}", profile.band_db());
                        self.noise = Some(profile);
                        controls.request_redraw();
                    }
                    None => {
                        log::warn!("noise calibration captured nothing; keeping previous profile");
                    }
                }
            }

            let settings = controls.snapshot();
            let mut band_db = band_levels_db(&spectrum, &self.plan, settings.stat);

            if settings.denoise_enabled {
                if let Some(profile) = &self.noise {
                    profile.apply(&mut band_db, settings.denoise_strength, settings.gate_margin_db);
                }
            }

            let levels = band_db
                .iter()
                .enumerate()
                .map(|(i, &db)| {
                    let peak = self.peaks.update(i, db);
                    normalize(db, peak, settings.db_range, settings.max_level)
                })
                .collect();

            let frame = LevelFrame {
                levels,
                max_level: settings.max_level,
                db_range: settings.db_range,
                background: settings.background,
                stat: settings.stat,
            };
            let force = controls.take_redraw();
            if self.change.should_deliver(&frame, force) {
                sink.deliver(&frame);
            }
        }

        Ok(())
    }

    /// Calibration sub-state: capture a few seconds of additional frames and
    /// collapse them into a noise profile. Stop aborts within one frame;
    /// whatever was captured by then still counts.
    fn calibrate(
        &mut self,
        source: &mut dyn FrameSource,
        controls: &Controls,
    ) -> Result<Option<NoiseProfile>> {
        let budget = (3 * self.sample_rate as usize).div_ceil(self.fft_size).max(12);
        log::info!("learning noise profile over {} frames", budget);

        let mut scores = Vec::with_capacity(budget);
        for _ in 0..budget {
            if controls.stopped() {
                break;
            }
            let Some(block) = source.next_block()? else {
                break;
            };
            let mono = downmix(&block, source.channels());
            if mono.len() != self.fft_size {
                continue;
            }
            let spectrum = self.analyzer.spectrum_db(&mono);
            // Always P90 here, whatever the display statistic: calibration
            // must not chase transients.
            scores.push(band_levels_db(&spectrum, &self.plan, BandStat::P90));
        }

        Ok(NoiseProfile::from_frames(&scores))
    }
}
