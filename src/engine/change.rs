use super::control::Background;
use super::analyzer::BandStat;
use super::worker::LevelFrame;

/// Gate on delivery to the renderer: only pass a frame when the visible
/// output (levels or the settings that shaped it) actually changed, or when
/// a forced redraw was requested.
#[derive(Default)]
pub struct ChangeDetector {
    last: Option<Delivered>,
}

struct Delivered {
    levels: Vec<u32>,
    db_range: f32,
    background: Background,
    stat: BandStat,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `frame` should go out, recording it as delivered if
    /// so. `force` is the already-consumed redraw flag for this frame.
    pub fn should_deliver(&mut self, frame: &LevelFrame, force: bool) -> bool {
        let unchanged = self.last.as_ref().is_some_and(|d| {
            d.levels == frame.levels
                && d.db_range == frame.db_range
                && d.background == frame.background
                && d.stat == frame.stat
        });
        if unchanged && !force {
            return false;
        }
        self.last = Some(Delivered {
            levels: frame.levels.clone(),
            db_range: frame.db_range,
            background: frame.background,
            stat: frame.stat,
        });
        true
    }
}
