//! Error types for machine construction and configuration loading

use thiserror::Error;

/// Machine construction errors
///
/// Only configuration can fail. Once a [`crate::Machine`] exists, pulling,
/// stepping and evaluation never return an error.
#[derive(Error, Debug)]
pub enum MachineError {
    #[error("Reel template is empty")]
    EmptyTemplate,

    #[error("Reel count must be at least 1")]
    NoReels,

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Invalid step range: min {min} is greater than max {max}")]
    InvalidStepRange { min: u32, max: u32 },

    #[error("Invalid timing: {0}")]
    InvalidTiming(String),

    #[error("Empty entry in {table} table")]
    EmptyWinEntry { table: &'static str },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for machine operations
pub type MachineResult<T> = Result<T, MachineError>;
