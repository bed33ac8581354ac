//! Machine configuration and built-in profiles

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MachineError, MachineResult};
use crate::paytable::{WORD_SUPER_WINS, WORD_WINS, WinKind, WinTables};
use crate::shuffle::ShuffleKind;
use crate::timing::{StepRange, StepTiming};

/// Symbol template shared by every reel of the words build
pub const WORD_REEL_TEMPLATE: &[&str] = &[
    "e", "e", "e", "e", "r", "r", "r", "r", "h", "n", "n", "o", "o", "o", "s", "s", "u", "u",
];

// ═══════════════════════════════════════════════════════════════════════════════
// LAYOUT
// ═══════════════════════════════════════════════════════════════════════════════

/// Screen geometry of reels and symbols
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Symbol sprite width (px)
    pub symbol_width: f64,
    /// Symbol sprite height (px), also the distance of one step
    pub symbol_height: f64,
    /// Number of rows visible through the reel window
    pub visible_rows: u32,
}

impl Layout {
    /// 216×144 symbols, three rows shown
    pub fn legacy() -> Self {
        Self {
            symbol_width: 216.0,
            symbol_height: 144.0,
            visible_rows: 3,
        }
    }

    /// Horizontal position of a reel
    pub fn reel_x(&self, reel_index: usize) -> f64 {
        self.symbol_width * reel_index as f64
    }

    /// Initial vertical position of the symbol at `index`
    pub fn symbol_y(&self, index: usize) -> f64 {
        self.symbol_height * index as f64
    }

    /// Height of the visible reel window
    pub fn reel_height(&self) -> f64 {
        self.symbol_height * self.visible_rows as f64
    }

    /// Row whose symbols count toward the outcome
    pub fn center_row(&self) -> usize {
        self.visible_rows as usize / 2
    }

    /// Top edge of the wrap window; symbols re-enter here
    pub fn wrap_top(&self) -> f64 {
        -self.symbol_height
    }

    /// Lowest position a symbol may occupy on a reel of `reel_len` symbols
    pub fn wrap_bottom(&self, reel_len: usize) -> f64 {
        self.symbol_height * (reel_len as f64 - 2.0)
    }

    /// Wrap a vertical position into `[wrap_top, wrap_bottom]`
    ///
    /// The window spans exactly `reel_len` rows, so a symbol leaving the
    /// bottom reappears one row above the visible area.
    pub fn wrap_y(&self, y: f64, reel_len: usize) -> f64 {
        let span = self.symbol_height * reel_len as f64;
        if span <= 0.0 {
            return y;
        }
        let top = self.wrap_top();
        top + (y - top).rem_euclid(span)
    }

    pub fn validate(&self, reel_len: usize) -> MachineResult<()> {
        for (name, value) in [
            ("symbol_width", self.symbol_width),
            ("symbol_height", self.symbol_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(MachineError::InvalidLayout(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.visible_rows == 0 {
            return Err(MachineError::InvalidLayout(
                "visible_rows must be at least 1".into(),
            ));
        }
        if self.visible_rows as usize > reel_len {
            return Err(MachineError::InvalidLayout(format!(
                "{} visible rows exceed reel length {}",
                self.visible_rows, reel_len
            )));
        }
        Ok(())
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::legacy()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HIGHLIGHT POLICY
// ═══════════════════════════════════════════════════════════════════════════════

/// Which win categories loop their highlight animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightPolicy {
    pub loop_regular: bool,
    pub loop_super: bool,
}

impl HighlightPolicy {
    /// Loop only on super wins
    pub fn super_loops() -> Self {
        Self {
            loop_regular: false,
            loop_super: true,
        }
    }

    /// Play every highlight once
    pub fn play_once() -> Self {
        Self {
            loop_regular: false,
            loop_super: false,
        }
    }

    pub fn looping(&self, win: WinKind) -> bool {
        match win {
            WinKind::None => false,
            WinKind::Regular => self.loop_regular,
            WinKind::Super => self.loop_super,
        }
    }
}

impl Default for HighlightPolicy {
    fn default() -> Self {
        Self::super_loops()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MACHINE CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

/// Complete construction-time configuration of a machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Profile name for reference
    pub name: String,
    /// Number of reels
    pub reel_count: usize,
    /// Ordered symbol identities every reel is shuffled from
    pub reel_template: Vec<String>,
    #[serde(default)]
    pub layout: Layout,
    /// Steps a reel travels per pull (inclusive)
    #[serde(default)]
    pub steps: StepRange,
    #[serde(default)]
    pub timing: StepTiming,
    #[serde(default)]
    pub highlight: HighlightPolicy,
    #[serde(default)]
    pub shuffle: ShuffleKind,
    /// Regular winning combinations
    #[serde(default)]
    pub win_table: Vec<String>,
    /// Super winning combinations
    #[serde(default)]
    pub super_win_table: Vec<String>,
}

impl MachineConfig {
    /// Words build: 1..=58 steps, highlight loops on super wins
    pub fn words() -> Self {
        Self {
            name: "Words".into(),
            reel_count: 3,
            reel_template: WORD_REEL_TEMPLATE.iter().map(|s| s.to_string()).collect(),
            layout: Layout::legacy(),
            steps: StepRange::words(),
            timing: StepTiming::legacy(),
            highlight: HighlightPolicy::super_loops(),
            shuffle: ShuffleKind::Uniform,
            win_table: WORD_WINS.iter().map(|s| s.to_string()).collect(),
            super_win_table: WORD_SUPER_WINS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Second build: 0..=57 steps, highlights never loop
    pub fn variant_b() -> Self {
        Self {
            name: "Variant B".into(),
            steps: StepRange::variant_b(),
            highlight: HighlightPolicy::play_once(),
            ..Self::words()
        }
    }

    /// Builder: set reel count
    pub fn with_reel_count(mut self, reel_count: usize) -> Self {
        self.reel_count = reel_count;
        self
    }

    /// Builder: set step range
    pub fn with_steps(mut self, steps: StepRange) -> Self {
        self.steps = steps;
        self
    }

    /// Builder: set timing
    pub fn with_timing(mut self, timing: StepTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Builder: set shuffle mode
    pub fn with_shuffle(mut self, shuffle: ShuffleKind) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Builder: replace both win tables
    pub fn with_tables(
        mut self,
        win_table: impl IntoIterator<Item = impl Into<String>>,
        super_win_table: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.win_table = win_table.into_iter().map(Into::into).collect();
        self.super_win_table = super_win_table.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: replace the reel template
    pub fn with_template(mut self, template: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.reel_template = template.into_iter().map(Into::into).collect();
        self
    }

    /// Check every construction-time precondition
    pub fn validate(&self) -> MachineResult<()> {
        if self.reel_template.is_empty() {
            return Err(MachineError::EmptyTemplate);
        }
        if self.reel_count == 0 {
            return Err(MachineError::NoReels);
        }
        if self.reel_template.iter().any(String::is_empty) {
            return Err(MachineError::InvalidConfig(
                "reel template contains an empty symbol identity".into(),
            ));
        }
        self.layout.validate(self.reel_template.len())?;
        self.steps.validate()?;
        self.timing.validate()?;
        Ok(())
    }

    /// Build the win tables described by this config
    pub fn win_tables(&self) -> MachineResult<WinTables> {
        WinTables::new(self.win_table.iter().cloned(), self.super_win_table.iter().cloned())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> MachineResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML config
    pub fn from_yaml_str(yaml: &str) -> MachineResult<Self> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, picking the format from its extension
    pub fn from_path(path: impl AsRef<Path>) -> MachineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            other => Err(MachineError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    pub fn to_json_string(&self) -> MachineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml_string(&self) -> MachineResult<String> {
        Ok(serde_yml::to_string(self)?)
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::words()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROFILES
// ═══════════════════════════════════════════════════════════════════════════════

/// Built-in configuration profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Profile {
    #[default]
    Words,
    VariantB,
}

impl Profile {
    pub fn config(&self) -> MachineConfig {
        match self {
            Profile::Words => MachineConfig::words(),
            Profile::VariantB => MachineConfig::variant_b(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Profile::Words => "words",
            Profile::VariantB => "variant-b",
        }
    }
}

impl FromStr for Profile {
    type Err = MachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "words" | "a" => Ok(Profile::Words),
            "variant-b" | "variant_b" | "b" => Ok(Profile::VariantB),
            other => Err(MachineError::InvalidConfig(format!(
                "unknown profile '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
