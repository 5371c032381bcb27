use std::io::{self, Write};

use crate::engine::control::Background;
use crate::engine::worker::{LevelFrame, LevelSink};

const GLYPHS: [char; 9] = [' ', '\u{2581}', '\u{2582}', '\u{2583}', '\u{2584}', '\u{2585}', '\u{2586}', '\u{2587}', '\u{2588}'];

/// Minimal renderer collaborator: one glyph per band on a single redrawn
/// line. Unlit levels render as blank space, never as a dimmed glyph, per
/// the engine's delivery contract.
pub struct TerminalSink<W: Write> {
    out: W,
}

impl TerminalSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> LevelSink for TerminalSink<W> {
    fn deliver(&mut self, frame: &LevelFrame) {
        let mut line = String::with_capacity(frame.levels.len() + 16);
        if frame.background == Background::White {
            line.push_str("\x1b[7m");
        }
        for &lv in &frame.levels {
            line.push(glyph(lv, frame.max_level));
        }
        if frame.background == Background::White {
            line.push_str("\x1b[0m");
        }
        // Errors on a closed terminal are not worth killing the worker over.
        let _ = write!(self.out, "\r{line} ");
        let _ = self.out.flush();
    }
}

fn glyph(level: u32, max_level: u32) -> char {
    if level == 0 || max_level == 0 {
        return GLYPHS[0];
    }
    let idx = (level as f32 / max_level as f32 * 8.0).round() as usize;
    GLYPHS[idx.clamp(1, 8)]
}
