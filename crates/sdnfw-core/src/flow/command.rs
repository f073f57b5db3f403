//! Flow install commands handed to the switch.

use crate::flow::matching::FlowMatch;
use crate::types::{BufferedPacket, PortId};

/// An action applied to packets hitting a flow entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FlowAction {
    Output(PortId),
}

/// A flow entry to add to a switch's table.
///
/// Once handed to the installer the core keeps no record of it; expiry is
/// enforced by the switch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FlowInstallCommand {
    pub flow_match: FlowMatch,
    pub actions: Vec<FlowAction>,
    /// Seconds without traffic before the entry is removed.
    pub idle_timeout: u16,
    /// Seconds after installation before the entry is removed regardless.
    pub hard_timeout: u16,
    /// Packet to release through the entry as part of the install.
    pub buffered: Option<BufferedPacket>,
}

impl FlowInstallCommand {
    /// The ports this entry outputs to, in action order.
    pub fn output_ports(&self) -> impl Iterator<Item = PortId> + '_ {
        self.actions.iter().map(|action| match action {
            FlowAction::Output(port) => *port,
        })
    }
}
