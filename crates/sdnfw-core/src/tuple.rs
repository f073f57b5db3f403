//! Header extraction: the normalized tuple a rule list is evaluated against.

use core::fmt;
use core::str::FromStr;
use std::net::Ipv4Addr;

use crate::error::RuleError;
use crate::packet::ipv4::Ipv4Packet;
use crate::packet::transport::Transport;
use crate::types::PortId;

/// Transport protocols a rule can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Icmp => "ICMP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical names only; matching is case-sensitive.
impl FromStr for Protocol {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TCP" => Ok(Protocol::Tcp),
            "UDP" => Ok(Protocol::Udp),
            "ICMP" => Ok(Protocol::Icmp),
            other => Err(RuleError::UnknownProtocol(other.to_string())),
        }
    }
}

/// ICMP type and code. Carried in the tuple but not used for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpKind {
    pub icmp_type: u8,
    pub code: u8,
}

/// The fields of one packet that rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketTuple {
    pub ingress_port: PortId,
    /// `None` when no recognised transport header was found.
    pub protocol: Option<Protocol>,
    pub src_addr: Ipv4Addr,
    pub src_port: Option<u16>,
    pub dst_addr: Ipv4Addr,
    pub dst_port: Option<u16>,
    pub icmp: Option<IcmpKind>,
}

/// Derive the tuple for `packet` arriving on `ingress_port`.
///
/// Never fails: an unrecognised or truncated transport yields a tuple with no
/// protocol and no ports.
pub fn extract_tuple(packet: &Ipv4Packet, ingress_port: PortId) -> PacketTuple {
    let mut tuple = PacketTuple {
        ingress_port,
        protocol: None,
        src_addr: packet.src,
        src_port: None,
        dst_addr: packet.dst,
        dst_port: None,
        icmp: None,
    };

    match packet.transport {
        Transport::Tcp(tcp) => {
            tuple.protocol = Some(Protocol::Tcp);
            tuple.src_port = Some(tcp.src_port);
            tuple.dst_port = Some(tcp.dst_port);
        }
        Transport::Udp(udp) => {
            tuple.protocol = Some(Protocol::Udp);
            tuple.src_port = Some(udp.src_port);
            tuple.dst_port = Some(udp.dst_port);
        }
        Transport::Icmp(icmp) => {
            tuple.protocol = Some(Protocol::Icmp);
            tuple.icmp = Some(IcmpKind {
                icmp_type: icmp.icmp_type,
                code: icmp.code,
            });
        }
        Transport::Other { .. } => {}
    }

    tuple
}
