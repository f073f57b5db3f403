//! Protocol numbers, header sizes, and offload policy constants.

use crate::types::PortId;

// Ethernet
pub const ETHERNET_HEADER_SIZE: usize = 14;
pub const VLAN_TAG_SIZE: usize = 4;
pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_ARP: u16 = 0x0806;
pub const ETHERTYPE_VLAN: u16 = 0x8100;
pub const VLAN_ID_MASK: u16 = 0x0FFF;

// IPv4
pub const IPV4_HEADER_MIN_SIZE: usize = 20;
pub const IP_PROTO_ICMP: u8 = 1;
pub const IP_PROTO_TCP: u8 = 6;
pub const IP_PROTO_UDP: u8 = 17;

// Transport
pub const TCP_HEADER_MIN_SIZE: usize = 20;
pub const UDP_HEADER_SIZE: usize = 8;
pub const ICMP_HEADER_MIN_SIZE: usize = 4;

/// Idle timeout (seconds) carried by both offloaded flow entries.
pub const OFFLOAD_IDLE_TIMEOUT: u16 = 10;

/// Hard timeout (seconds) carried by both offloaded flow entries.
pub const OFFLOAD_HARD_TIMEOUT: u16 = 30;

/// Ingress port pinned on every reverse flow entry.
pub const RETURN_INGRESS_PORT: PortId = PortId(1);

/// Ingress port on which reverse offload is triggered unless configured otherwise.
pub const DEFAULT_REVERSE_PORT: PortId = PortId(2);
