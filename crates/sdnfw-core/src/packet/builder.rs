//! Encoding of minimal frames, used to synthesise packet-in payloads.
//!
//! Checksums are left zero; the decoder never verifies them.

use std::net::Ipv4Addr;

use crate::constants::{
    ETHERTYPE_ARP, ETHERTYPE_IPV4, ETHERTYPE_VLAN, IP_PROTO_ICMP, IP_PROTO_TCP, IP_PROTO_UDP,
};
use crate::packet::ethernet::VlanTag;
use crate::types::MacAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Body {
    Tcp { src_port: u16, dst_port: u16, flags: u8 },
    Udp { src_port: u16, dst_port: u16 },
    Icmp { icmp_type: u8, code: u8 },
    Raw { protocol: u8 },
}

/// Builder for an Ethernet frame carrying IPv4 (or ARP).
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    src_mac: MacAddr,
    dst_mac: MacAddr,
    vlan: Option<VlanTag>,
    src_ip: Ipv4Addr,
    dst_ip: Ipv4Addr,
    tos: u8,
    body: Body,
}

impl FrameBuilder {
    pub fn new(src_mac: MacAddr, dst_mac: MacAddr) -> Self {
        Self {
            src_mac,
            dst_mac,
            vlan: None,
            src_ip: Ipv4Addr::UNSPECIFIED,
            dst_ip: Ipv4Addr::UNSPECIFIED,
            tos: 0,
            body: Body::Raw { protocol: 0 },
        }
    }

    pub fn vlan(mut self, tag: VlanTag) -> Self {
        self.vlan = Some(tag);
        self
    }

    pub fn ips(mut self, src: Ipv4Addr, dst: Ipv4Addr) -> Self {
        self.src_ip = src;
        self.dst_ip = dst;
        self
    }

    pub fn tos(mut self, tos: u8) -> Self {
        self.tos = tos;
        self
    }

    pub fn tcp(mut self, src_port: u16, dst_port: u16, flags: u8) -> Self {
        self.body = Body::Tcp {
            src_port,
            dst_port,
            flags,
        };
        self
    }

    pub fn udp(mut self, src_port: u16, dst_port: u16) -> Self {
        self.body = Body::Udp { src_port, dst_port };
        self
    }

    pub fn icmp(mut self, icmp_type: u8, code: u8) -> Self {
        self.body = Body::Icmp { icmp_type, code };
        self
    }

    /// An IPv4 packet with no transport header for `protocol`.
    pub fn raw_protocol(mut self, protocol: u8) -> Self {
        self.body = Body::Raw { protocol };
        self
    }

    fn ethernet_header(&self, ethertype: u16) -> Vec<u8> {
        let mut out = Vec::with_capacity(64);
        out.extend_from_slice(self.dst_mac.as_ref());
        out.extend_from_slice(self.src_mac.as_ref());
        if let Some(tag) = self.vlan {
            out.extend_from_slice(&ETHERTYPE_VLAN.to_be_bytes());
            let tci = (u16::from(tag.pcp) << 13) | (tag.id & 0x0FFF);
            out.extend_from_slice(&tci.to_be_bytes());
        }
        out.extend_from_slice(&ethertype.to_be_bytes());
        out
    }

    /// Encode an IPv4 frame.
    pub fn build(&self) -> Vec<u8> {
        let (protocol, transport) = match self.body {
            Body::Tcp {
                src_port,
                dst_port,
                flags,
            } => {
                let mut t = vec![0u8; 20];
                t[0..2].copy_from_slice(&src_port.to_be_bytes());
                t[2..4].copy_from_slice(&dst_port.to_be_bytes());
                t[12] = 5 << 4;
                t[13] = flags;
                (IP_PROTO_TCP, t)
            }
            Body::Udp { src_port, dst_port } => {
                let mut t = vec![0u8; 8];
                t[0..2].copy_from_slice(&src_port.to_be_bytes());
                t[2..4].copy_from_slice(&dst_port.to_be_bytes());
                t[4..6].copy_from_slice(&8u16.to_be_bytes());
                (IP_PROTO_UDP, t)
            }
            Body::Icmp { icmp_type, code } => (IP_PROTO_ICMP, vec![icmp_type, code, 0, 0, 0, 0, 0, 0]),
            Body::Raw { protocol } => (protocol, Vec::new()),
        };

        let total_len = (20 + transport.len()) as u16;
        let mut out = self.ethernet_header(ETHERTYPE_IPV4);
        out.extend_from_slice(&[0x45, self.tos]);
        out.extend_from_slice(&total_len.to_be_bytes());
        out.extend_from_slice(&[0, 0, 0x40, 0, 64, protocol, 0, 0]);
        out.extend_from_slice(&self.src_ip.octets());
        out.extend_from_slice(&self.dst_ip.octets());
        out.extend_from_slice(&transport);
        out
    }

    /// Encode an ARP request frame (who-has `dst_ip`, tell `src_ip`).
    pub fn build_arp(&self) -> Vec<u8> {
        let mut out = self.ethernet_header(ETHERTYPE_ARP);
        out.extend_from_slice(&[0x00, 0x01, 0x08, 0x00, 6, 4, 0x00, 0x01]);
        out.extend_from_slice(self.src_mac.as_ref());
        out.extend_from_slice(&self.src_ip.octets());
        out.extend_from_slice(&[0u8; 6]);
        out.extend_from_slice(&self.dst_ip.octets());
        out
    }
}
