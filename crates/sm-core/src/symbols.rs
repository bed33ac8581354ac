//! Reel symbols

/// Index of the symbol that drives a reel's offset bookkeeping
pub const DRIVER_INDEX: usize = 0;

/// A single position on a reel
///
/// The identity never changes after construction. The vertical screen
/// position mirrors what the presenter shows and moves one symbol height per
/// step.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Identity used for win matching (e.g. "e", "h")
    identity: String,
    /// Position within the owning reel (0-based)
    index: usize,
    /// Current vertical screen position in pixels
    y: f64,
}

impl Symbol {
    /// Create a symbol at its initial screen position
    pub fn new(identity: impl Into<String>, index: usize, y: f64) -> Self {
        Self {
            identity: identity.into(),
            index,
            y,
        }
    }

    /// Identity used for win matching
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Position within the owning reel
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether this symbol advances the reel offset when it steps
    pub fn is_driver(&self) -> bool {
        self.index == DRIVER_INDEX
    }

    /// Current vertical screen position
    pub fn y(&self) -> f64 {
        self.y
    }

    pub(crate) fn set_y(&mut self, y: f64) {
        self.y = y;
    }

    /// Sprite key the presenter loads for this identity ("e" -> "symbolE")
    pub fn sprite_key(&self) -> String {
        format!("symbol{}", self.identity.to_uppercase())
    }
}
