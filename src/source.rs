use std::io::Read;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

/// Acquisition seam. The real application feeds loopback capture through
/// this; the shipped binary feeds raw PCM from stdin or a test tone.
pub trait FrameSource {
    fn channels(&self) -> usize;

    /// Blocks until the next interleaved block is available. `Ok(None)`
    /// means the stream ended. Blocks may come up short (device hiccup,
    /// stream tail); the engine skips those frames.
    fn next_block(&mut self) -> Result<Option<Vec<f32>>>;
}

/// Average interleaved channels down to mono. Trailing partial frames are
/// dropped.
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleFormat {
    F32Le,
    S16Le,
}

impl SampleFormat {
    fn bytes_per_sample(self) -> usize {
        match self {
            Self::F32Le => 4,
            Self::S16Le => 2,
        }
    }
}

impl FromStr for SampleFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "f32le" => Ok(Self::F32Le),
            "s16le" => Ok(Self::S16Le),
            other => anyhow::bail!("unknown sample format '{other}' (expected f32le or s16le)"),
        }
    }
}

/// Raw interleaved PCM from any reader, typically a pipe:
/// `ffmpeg -f ... -f f32le -` or `arecord -f FLOAT_LE` into stdin.
pub struct RawPcmSource<R> {
    reader: R,
    format: SampleFormat,
    channels: usize,
    frames_per_block: usize,
    buf: Vec<u8>,
}

impl<R: Read> RawPcmSource<R> {
    pub fn new(reader: R, format: SampleFormat, channels: usize, frames_per_block: usize) -> Self {
        let bytes = frames_per_block * channels * format.bytes_per_sample();
        Self {
            reader,
            format,
            channels,
            frames_per_block,
            buf: vec![0; bytes],
        }
    }
}

impl<R: Read> FrameSource for RawPcmSource<R> {
    fn channels(&self) -> usize {
        self.channels
    }

    fn next_block(&mut self) -> Result<Option<Vec<f32>>> {
        let wanted = self.frames_per_block * self.channels * self.format.bytes_per_sample();
        let mut filled = 0;
        while filled < wanted {
            let n = self
                .reader
                .read(&mut self.buf[filled..wanted])
                .context("reading PCM stream")?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled == 0 {
            return Ok(None);
        }

        let whole = filled - filled % self.format.bytes_per_sample();
        let samples = match self.format {
            SampleFormat::F32Le => self.buf[..whole]
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect(),
            SampleFormat::S16Le => self.buf[..whole]
                .chunks_exact(2)
                .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
                .collect(),
        };
        Ok(Some(samples))
    }
}

/// Synthetic sine source for trying the display without any capture setup.
/// Paced to real time so the bars move at the same cadence as live input.
pub struct ToneSource {
    sample_rate: u32,
    frames_per_block: usize,
    freq: f32,
    phase: f32,
    paced: bool,
}

impl ToneSource {
    pub fn new(sample_rate: u32, frames_per_block: usize, freq: f32) -> Self {
        Self {
            sample_rate,
            frames_per_block,
            freq,
            phase: 0.0,
            paced: true,
        }
    }

    #[cfg(test)]
    pub fn unpaced(mut self) -> Self {
        self.paced = false;
        self
    }
}

impl FrameSource for ToneSource {
    fn channels(&self) -> usize {
        1
    }

    fn next_block(&mut self) -> Result<Option<Vec<f32>>> {
        if self.paced {
            thread::sleep(Duration::from_secs_f32(
                self.frames_per_block as f32 / self.sample_rate as f32,
            ));
        }
        let step = 2.0 * std::f32::consts::PI * self.freq / self.sample_rate as f32;
        let block = (0..self.frames_per_block)
            .map(|_| {
                let s = 0.5 * self.phase.sin();
                self.phase = (self.phase + step) % (2.0 * std::f32::consts::PI);
                s
            })
            .collect();
        Ok(Some(block))
    }
}
