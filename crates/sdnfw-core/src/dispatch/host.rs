//! The packet-in event and the host capabilities the policy drives.
//!
//! The host controller owns the control channel to the switch. The policy
//! never waits on these calls or observes whether they succeeded.

use crate::flow::command::FlowInstallCommand;
use crate::types::{BufferedPacket, MacAddr, PortId, SwitchId, SwitchLocation};

/// A frame the switch sent to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketIn {
    pub switch_id: SwitchId,
    pub in_port: PortId,
    /// The frame bytes as delivered by the switch.
    pub data: Vec<u8>,
    /// Set when the switch kept the full packet in one of its buffers.
    pub buffer_id: Option<u32>,
}

impl PacketIn {
    pub fn location(&self) -> SwitchLocation {
        SwitchLocation {
            switch: self.switch_id,
            port: self.in_port,
        }
    }

    /// The handle a flow install uses to release this packet.
    pub fn buffered_packet(&self) -> BufferedPacket {
        match self.buffer_id {
            Some(id) => BufferedPacket::BufferId(id),
            None => BufferedPacket::Data(self.data.clone()),
        }
    }
}

/// Sends flow-table entries to the switch.
pub trait FlowInstaller {
    /// Fire-and-forget; delivery failures are the implementor's concern.
    fn install(&mut self, command: FlowInstallCommand);
}

/// Ordinary learning-switch forwarding for a single packet.
pub trait DefaultForwarder {
    fn forward(&mut self, event: &PacketIn);
}

/// Informational sink for where source addresses appear.
pub trait AddressTracker {
    fn record_first_seen(&mut self, mac: MacAddr, location: &SwitchLocation);
}

impl<T: FlowInstaller + ?Sized> FlowInstaller for &mut T {
    fn install(&mut self, command: FlowInstallCommand) {
        (**self).install(command);
    }
}

impl<T: DefaultForwarder + ?Sized> DefaultForwarder for &mut T {
    fn forward(&mut self, event: &PacketIn) {
        (**self).forward(event);
    }
}

impl<T: AddressTracker + ?Sized> AddressTracker for &mut T {
    fn record_first_seen(&mut self, mac: MacAddr, location: &SwitchLocation) {
        (**self).record_first_seen(mac, location);
    }
}

/// Discards address sightings.
impl AddressTracker for () {
    fn record_first_seen(&mut self, _mac: MacAddr, _location: &SwitchLocation) {}
}
