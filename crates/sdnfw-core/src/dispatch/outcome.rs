//! Terminal dispatch states and the reverse-offload gate.

use std::fmt;

use crate::constants::DEFAULT_REVERSE_PORT;
use crate::flow::synth::OffloadProtocol;
use crate::types::PortId;

/// Per-switch opt-in for return-path offload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffloadSettings {
    /// Whether admitted ICMP/TCP flows get flow entries at all.
    pub reverse_offload: bool,
    /// Only flows entering on this port are offloaded.
    pub reverse_port: PortId,
}

impl Default for OffloadSettings {
    fn default() -> Self {
        Self {
            reverse_offload: false,
            reverse_port: DEFAULT_REVERSE_PORT,
        }
    }
}

/// Why an event was ignored without a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IgnoreReason {
    /// The frame could not be decoded.
    Unparsed,
    /// Neither IPv4 nor ARP.
    NotIpv4,
}

/// The state a packet-in event ended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "outcome", rename_all = "snake_case"))]
pub enum DispatchOutcome {
    Ignored { reason: IgnoreReason },
    /// ARP handed to the default forwarder without classification.
    PassedThrough,
    /// Blocked by rule `rule`, or by default-deny when `None`.
    Dropped { rule: Option<usize> },
    /// Allowed; the default forwarder handled this one packet.
    Forwarded { rule: usize },
    /// Allowed; forward and reverse entries were installed.
    Offloaded {
        rule: usize,
        protocol: OffloadProtocol,
    },
}

impl DispatchOutcome {
    /// Whether the packet was let through in any form.
    pub fn is_admitted(&self) -> bool {
        matches!(
            self,
            DispatchOutcome::PassedThrough
                | DispatchOutcome::Forwarded { .. }
                | DispatchOutcome::Offloaded { .. }
        )
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::Ignored {
                reason: IgnoreReason::Unparsed,
            } => f.write_str("ignored (unparsed frame)"),
            DispatchOutcome::Ignored {
                reason: IgnoreReason::NotIpv4,
            } => f.write_str("ignored (not ipv4)"),
            DispatchOutcome::PassedThrough => f.write_str("passed through (arp)"),
            DispatchOutcome::Dropped { rule: None } => f.write_str("dropped (no rule matched)"),
            DispatchOutcome::Dropped { rule: Some(index) } => write!(f, "dropped by rule {index}"),
            DispatchOutcome::Forwarded { rule } => write!(f, "forwarded by rule {rule}"),
            DispatchOutcome::Offloaded { rule, protocol } => {
                write!(f, "offloaded {protocol} flow by rule {rule}")
            }
        }
    }
}

/// Decide whether an admitted packet is offloaded, and with which variant.
///
/// All of these must hold: the switch opted in, the packet entered on the
/// reverse port, and its IPv4 protocol is ICMP or TCP.
pub fn offload_protocol(
    ip_protocol: u8,
    in_port: PortId,
    settings: &OffloadSettings,
) -> Option<OffloadProtocol> {
    if !settings.reverse_offload || in_port != settings.reverse_port {
        return None;
    }
    OffloadProtocol::from_ip_proto(ip_protocol)
}
