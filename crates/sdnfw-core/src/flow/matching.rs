//! Exact-match flow predicates in the OpenFlow 1.0 field layout.

use std::net::Ipv4Addr;

use crate::packet::ethernet::EthernetFrame;
use crate::packet::transport::Transport;
use crate::types::{MacAddr, PortId};

/// `dl_vlan` value for frames without an 802.1Q tag.
pub const OFP_VLAN_NONE: u16 = 0xFFFF;

/// A flow-table match. `None` fields are wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FlowMatch {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub in_port: Option<PortId>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub dl_src: Option<MacAddr>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub dl_dst: Option<MacAddr>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub dl_vlan: Option<u16>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub dl_vlan_pcp: Option<u8>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub dl_type: Option<u16>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub nw_tos: Option<u8>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub nw_proto: Option<u8>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub nw_src: Option<Ipv4Addr>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub nw_dst: Option<Ipv4Addr>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub tp_src: Option<u16>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub tp_dst: Option<u16>,
}

impl FlowMatch {
    /// Build a match pinning every header field of `frame` as seen on `in_port`.
    ///
    /// For ICMP the type and code occupy `tp_src` and `tp_dst`. The DSCP bits
    /// of the TOS byte are kept and the ECN bits dropped.
    pub fn from_packet(frame: &EthernetFrame, in_port: PortId) -> Self {
        let mut m = Self {
            in_port: Some(in_port),
            dl_src: Some(frame.src),
            dl_dst: Some(frame.dst),
            dl_vlan: Some(frame.vlan.map_or(OFP_VLAN_NONE, |tag| tag.id)),
            dl_vlan_pcp: Some(frame.vlan.map_or(0, |tag| tag.pcp)),
            dl_type: Some(frame.ethertype),
            ..Self::default()
        };

        if let Some(ip) = frame.ipv4() {
            m.nw_tos = Some(ip.tos & 0xFC);
            m.nw_proto = Some(ip.protocol);
            m.nw_src = Some(ip.src);
            m.nw_dst = Some(ip.dst);
            match ip.transport {
                Transport::Tcp(tcp) => {
                    m.tp_src = Some(tcp.src_port);
                    m.tp_dst = Some(tcp.dst_port);
                }
                Transport::Udp(udp) => {
                    m.tp_src = Some(udp.src_port);
                    m.tp_dst = Some(udp.dst_port);
                }
                Transport::Icmp(icmp) => {
                    m.tp_src = Some(u16::from(icmp.icmp_type));
                    m.tp_dst = Some(u16::from(icmp.code));
                }
                Transport::Other { .. } => {}
            }
        }

        m
    }

    /// The same flow seen in the opposite direction, arriving on `in_port`.
    ///
    /// Swaps link, network and transport source/destination.
    #[must_use]
    pub fn flip(&self, in_port: PortId) -> Self {
        Self {
            in_port: Some(in_port),
            dl_src: self.dl_dst,
            dl_dst: self.dl_src,
            nw_src: self.nw_dst,
            nw_dst: self.nw_src,
            tp_src: self.tp_dst,
            tp_dst: self.tp_src,
            ..self.clone()
        }
    }
}
