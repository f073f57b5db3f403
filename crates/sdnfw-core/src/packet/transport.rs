//! Transport headers carried inside an IPv4 packet.

use crate::constants::{
    ICMP_HEADER_MIN_SIZE, IP_PROTO_ICMP, IP_PROTO_TCP, IP_PROTO_UDP, TCP_HEADER_MIN_SIZE,
    UDP_HEADER_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpHeader {
    pub src_port: u16,
    pub dst_port: u16,
}

impl TcpHeader {
    pub fn parse(raw: &[u8]) -> Option<Self> {
        if raw.len() < TCP_HEADER_MIN_SIZE {
            return None;
        }
        Some(Self {
            src_port: u16::from_be_bytes([raw[0], raw[1]]),
            dst_port: u16::from_be_bytes([raw[2], raw[3]]),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpHeader {
    pub src_port: u16,
    pub dst_port: u16,
}

impl UdpHeader {
    pub fn parse(raw: &[u8]) -> Option<Self> {
        if raw.len() < UDP_HEADER_SIZE {
            return None;
        }
        Some(Self {
            src_port: u16::from_be_bytes([raw[0], raw[1]]),
            dst_port: u16::from_be_bytes([raw[2], raw[3]]),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpHeader {
    pub icmp_type: u8,
    pub code: u8,
}

impl IcmpHeader {
    pub fn parse(raw: &[u8]) -> Option<Self> {
        if raw.len() < ICMP_HEADER_MIN_SIZE {
            return None;
        }
        Some(Self {
            icmp_type: raw[0],
            code: raw[1],
        })
    }
}

/// The transport layer found inside an IPv4 packet.
///
/// `Other` covers unknown protocols as well as known ones whose header was
/// truncated or sits in a non-initial fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Tcp(TcpHeader),
    Udp(UdpHeader),
    Icmp(IcmpHeader),
    Other { protocol: u8 },
}

impl Transport {
    /// Decode the transport header for `protocol` from the IPv4 payload.
    pub fn parse(protocol: u8, payload: &[u8]) -> Self {
        let parsed = match protocol {
            IP_PROTO_TCP => TcpHeader::parse(payload).map(Transport::Tcp),
            IP_PROTO_UDP => UdpHeader::parse(payload).map(Transport::Udp),
            IP_PROTO_ICMP => IcmpHeader::parse(payload).map(Transport::Icmp),
            _ => None,
        };
        parsed.unwrap_or(Transport::Other { protocol })
    }
}
