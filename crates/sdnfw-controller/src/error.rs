//! Error types for the controller host.

use sdnfw_core::{FrameError, RuleError};

/// Errors raised while loading configuration or feeding events to a switch.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("switch {switch}: rule {index}: {source}")]
    Rule {
        switch: String,
        index: usize,
        #[source]
        source: RuleError,
    },
    #[error("unknown switch: {0}")]
    UnknownSwitch(String),
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
    #[error("invalid frame hex: {0}")]
    Hex(#[from] hex::FromHexError),
}
