//! Seam to the rendering engine
//!
//! The machine never draws. It tells a [`Presenter`] where symbols go, how
//! long each move takes, and when the start trigger and win highlights
//! change. Sprites, tweens and the DOM button live behind this trait.

/// Rendering collaborator driven by the machine
pub trait Presenter {
    /// Enable or disable the start trigger
    fn set_trigger_enabled(&mut self, enabled: bool);

    /// Stop all running tweens and win highlights from the previous pull
    fn cancel_animations(&mut self);

    /// Snap a symbol to a position (setup and wrap-around)
    fn place_symbol(&mut self, reel: usize, symbol: usize, x: f64, y: f64);

    /// Linearly move a symbol from `from_y` to `to_y` over `duration_ms`
    fn move_symbol(&mut self, reel: usize, symbol: usize, from_y: f64, to_y: f64, duration_ms: f64);

    /// Play the win highlight on a centre-row symbol
    fn play_win_highlight(&mut self, reel: usize, symbol: usize, fps: f64, looping: bool);
}

/// Presenter that ignores every call
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn set_trigger_enabled(&mut self, _enabled: bool) {}
    fn cancel_animations(&mut self) {}
    fn place_symbol(&mut self, _reel: usize, _symbol: usize, _x: f64, _y: f64) {}
    fn move_symbol(&mut self, _reel: usize, _symbol: usize, _from_y: f64, _to_y: f64, _ms: f64) {}
    fn play_win_highlight(&mut self, _reel: usize, _symbol: usize, _fps: f64, _looping: bool) {}
}

/// Presenter that traces every call through `log`
///
/// Tracks the trigger state so headless drivers can read it back.
#[derive(Debug, Clone)]
pub struct LogPresenter {
    trigger_enabled: bool,
    highlights: usize,
}

impl LogPresenter {
    pub fn new() -> Self {
        Self {
            trigger_enabled: true,
            highlights: 0,
        }
    }

    pub fn trigger_enabled(&self) -> bool {
        self.trigger_enabled
    }

    /// Highlights started since the last cancel
    pub fn active_highlights(&self) -> usize {
        self.highlights
    }
}

impl Default for LogPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for LogPresenter {
    fn set_trigger_enabled(&mut self, enabled: bool) {
        self.trigger_enabled = enabled;
        log::trace!("trigger {}", if enabled { "enabled" } else { "disabled" });
    }

    fn cancel_animations(&mut self) {
        self.highlights = 0;
        log::trace!("animations cancelled");
    }

    fn place_symbol(&mut self, reel: usize, symbol: usize, x: f64, y: f64) {
        log::trace!("place reel {reel} symbol {symbol} at ({x}, {y})");
    }

    fn move_symbol(&mut self, reel: usize, symbol: usize, from_y: f64, to_y: f64, duration_ms: f64) {
        log::trace!("move reel {reel} symbol {symbol} {from_y} -> {to_y} over {duration_ms:.1}ms");
    }

    fn play_win_highlight(&mut self, reel: usize, symbol: usize, fps: f64, looping: bool) {
        self.highlights += 1;
        log::trace!("highlight reel {reel} symbol {symbol} at {fps}fps looping={looping}");
    }
}
