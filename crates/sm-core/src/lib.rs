//! # sm-core — Slot Machine Core
//!
//! Reels, win tables and the pull/spin/stop/evaluate state machine of a
//! three-reel word slot machine. Rendering is delegated to a [`Presenter`];
//! time is a virtual millisecond clock advanced by the host.
//!
//! ## Features
//!
//! - **Reels**: circular symbol strips with a modulo rotation offset
//! - **Shuffle**: independent Fisher–Yates shuffle per reel on a seedable RNG
//! - **Single-flight pulls**: a pull during a spin is ignored
//! - **Exactly-once evaluation**: per-reel stop flags guard the outcome
//! - **Profiles**: the words build and the variant B build, or a JSON/YAML file
//!
//! ## Architecture
//!
//! ```text
//! Machine
//!     │
//!     ├── MachineConfig (template, layout, steps, timing, tables)
//!     ├── Vec<Reel> ── Vec<Symbol>
//!     ├── WinTables (regular / super)
//!     ├── Scheduler<SpinEvent> (virtual clock)
//!     └── Presenter (trigger, tweens, highlights)
//!           │
//!           v
//!     SpinOutcome + Vec<MachineEvent>
//! ```

pub mod config;
pub mod error;
pub mod machine;
pub mod outcome;
pub mod paytable;
pub mod presenter;
pub mod reel;
pub mod scheduler;
pub mod shuffle;
pub mod symbols;
pub mod timing;

pub use config::*;
pub use error::*;
pub use machine::*;
pub use outcome::*;
pub use paytable::*;
pub use presenter::*;
pub use reel::*;
pub use scheduler::*;
pub use shuffle::*;
pub use symbols::*;
pub use timing::*;
