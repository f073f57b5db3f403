//! Host-side wiring for the SDN firewall core.
//!
//! Loads per-switch rule sets from TOML, builds one dispatch policy per
//! switch and records the commands each policy emits.

pub mod config;
pub mod controller;
pub mod error;
pub mod first_seen;
pub mod logging;
pub mod recording;
pub mod ruleset;

pub use config::{ControllerConfig, RuleToken, SwitchEntry};
pub use controller::{Controller, SwitchPolicy};
pub use error::ControllerError;
pub use first_seen::{FirstSeenRegistry, SharedFirstSeen};
pub use recording::{RecordingForwarder, RecordingInstaller};
