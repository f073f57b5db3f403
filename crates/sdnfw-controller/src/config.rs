//! TOML-based configuration for the firewall controller.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use sdnfw_core::constants::DEFAULT_REVERSE_PORT;
use sdnfw_core::{OffloadSettings, PortId, RuleSet, SwitchId};

use crate::error::ControllerError;
use crate::ruleset::load_rules;

/// Top-level controller configuration loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct ControllerConfig {
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub switches: Vec<SwitchEntry>,
}

impl ControllerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ControllerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ControllerError::Config(format!("failed to read config file: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ControllerError> {
        let config: Self = toml::from_str(s)
            .map_err(|e| ControllerError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Look up a switch by name.
    pub fn switch(&self, name: &str) -> Option<&SwitchEntry> {
        self.switches.iter().find(|s| s.name == name)
    }

    fn validate(&self) -> Result<(), ControllerError> {
        for (i, entry) in self.switches.iter().enumerate() {
            if self.switches[..i].iter().any(|s| s.name == entry.name) {
                return Err(ControllerError::Config(format!(
                    "duplicate switch name: {}",
                    entry.name
                )));
            }
            if self.switches[..i].iter().any(|s| s.dpid == entry.dpid) {
                return Err(ControllerError::Config(format!(
                    "duplicate dpid {} on switch {}",
                    entry.dpid, entry.name
                )));
            }
        }
        Ok(())
    }
}

/// The `[logging]` section.
#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// A `[[switches]]` entry: one firewall instance bound to a datapath.
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchEntry {
    pub name: String,
    pub dpid: u64,
    /// Install forward and return-path entries for admitted ICMP/TCP flows.
    #[serde(default)]
    pub reverse_offload: bool,
    /// Ingress port whose flows are eligible for offload.
    #[serde(default = "default_reverse_port")]
    pub reverse_port: u16,
    /// Ordered 7-field rule tuples.
    #[serde(default)]
    pub rules: Vec<Vec<RuleToken>>,
}

fn default_reverse_port() -> u16 {
    DEFAULT_REVERSE_PORT.0
}

impl SwitchEntry {
    pub fn switch_id(&self) -> SwitchId {
        SwitchId(self.dpid)
    }

    pub fn offload_settings(&self) -> OffloadSettings {
        OffloadSettings {
            reverse_offload: self.reverse_offload,
            reverse_port: PortId(self.reverse_port),
        }
    }

    /// Build the rule snapshot, reporting the index of the first bad rule.
    pub fn rule_set(&self) -> Result<RuleSet, ControllerError> {
        load_rules(&self.name, &self.rules)
    }
}

/// One field of a rule tuple.
///
/// Ports may be written as bare integers; everything else is a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RuleToken {
    Int(i64),
    Text(String),
}

impl fmt::Display for RuleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleToken::Int(n) => write!(f, "{n}"),
            RuleToken::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RuleToken {
    fn from(s: &str) -> Self {
        RuleToken::Text(s.to_string())
    }
}
