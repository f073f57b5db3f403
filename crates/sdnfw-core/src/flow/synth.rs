//! Forward and return-path flow entries for an admitted flow.
//!
//! The deployment has two relevant ports that are each other's peer. The
//! forward entry sends the flow out the peer of its ingress port and carries
//! the buffered packet; the reverse entry matches the swapped flow arriving on
//! port 1 and sends it back out the original ingress port.

use std::fmt;

use crate::constants::{
    ETHERTYPE_IPV4, IP_PROTO_ICMP, IP_PROTO_TCP, OFFLOAD_HARD_TIMEOUT, OFFLOAD_IDLE_TIMEOUT,
    RETURN_INGRESS_PORT,
};
use crate::flow::command::{FlowAction, FlowInstallCommand};
use crate::flow::matching::FlowMatch;
use crate::packet::ethernet::EthernetFrame;
use crate::packet::ipv4::Ipv4Packet;
use crate::types::{BufferedPacket, PortId};

/// Protocols that get a return-path entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum OffloadProtocol {
    Icmp,
    Tcp,
}

impl OffloadProtocol {
    /// Select by IPv4 protocol number.
    pub fn from_ip_proto(protocol: u8) -> Option<Self> {
        match protocol {
            IP_PROTO_ICMP => Some(OffloadProtocol::Icmp),
            IP_PROTO_TCP => Some(OffloadProtocol::Tcp),
            _ => None,
        }
    }
}

impl fmt::Display for OffloadProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OffloadProtocol::Icmp => f.write_str("ICMP"),
            OffloadProtocol::Tcp => f.write_str("TCP"),
        }
    }
}

/// The two entries installed for one offloaded flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffloadPair {
    pub forward: FlowInstallCommand,
    pub reverse: FlowInstallCommand,
}

/// The other port of the two-port pair: 2 for ingress 1, otherwise 1.
pub fn peer_port(in_port: PortId) -> PortId {
    if in_port == PortId(1) {
        PortId(2)
    } else {
        PortId(1)
    }
}

/// Build the forward and reverse entries for a flow admitted on `in_port`.
pub fn synthesize(
    protocol: OffloadProtocol,
    in_port: PortId,
    buffered: BufferedPacket,
    frame: &EthernetFrame,
    packet: &Ipv4Packet,
) -> OffloadPair {
    let forward = FlowInstallCommand {
        flow_match: FlowMatch::from_packet(frame, in_port),
        actions: vec![FlowAction::Output(peer_port(in_port))],
        idle_timeout: OFFLOAD_IDLE_TIMEOUT,
        hard_timeout: OFFLOAD_HARD_TIMEOUT,
        buffered: Some(buffered),
    };

    let reverse_match = match protocol {
        OffloadProtocol::Icmp => FlowMatch {
            in_port: Some(RETURN_INGRESS_PORT),
            dl_type: Some(ETHERTYPE_IPV4),
            nw_proto: Some(IP_PROTO_ICMP),
            dl_src: Some(frame.dst),
            dl_dst: Some(frame.src),
            nw_src: Some(packet.dst),
            nw_dst: Some(packet.src),
            ..FlowMatch::default()
        },
        OffloadProtocol::Tcp => forward.flow_match.flip(RETURN_INGRESS_PORT),
    };

    let reverse = FlowInstallCommand {
        flow_match: reverse_match,
        actions: vec![FlowAction::Output(in_port)],
        idle_timeout: OFFLOAD_IDLE_TIMEOUT,
        hard_timeout: OFFLOAD_HARD_TIMEOUT,
        buffered: None,
    };

    OffloadPair { forward, reverse }
}
