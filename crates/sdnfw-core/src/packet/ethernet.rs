//! Ethernet II framing with optional 802.1Q tag.

use crate::constants::{
    ETHERNET_HEADER_SIZE, ETHERTYPE_ARP, ETHERTYPE_IPV4, ETHERTYPE_VLAN, VLAN_ID_MASK,
    VLAN_TAG_SIZE,
};
use crate::error::FrameError;
use crate::packet::ipv4::Ipv4Packet;
use crate::types::MacAddr;

const ARP_PACKET_SIZE: usize = 28;

/// An 802.1Q tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VlanTag {
    pub id: u16,
    pub pcp: u8,
}

/// What an Ethernet frame carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EtherPayload {
    Ipv4(Ipv4Packet),
    /// ARP is recognised but not decoded: it bypasses the firewall.
    Arp,
    Other,
}

/// A decoded Ethernet frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthernetFrame {
    pub dst: MacAddr,
    pub src: MacAddr,
    pub vlan: Option<VlanTag>,
    /// The ethertype of the payload (inner ethertype when tagged).
    pub ethertype: u16,
    pub payload: EtherPayload,
}

impl EthernetFrame {
    /// Parse a complete frame as delivered in a packet-in event.
    pub fn parse(raw: &[u8]) -> Result<Self, FrameError> {
        if raw.len() < ETHERNET_HEADER_SIZE {
            return Err(FrameError::TooShort {
                layer: "ethernet",
                min: ETHERNET_HEADER_SIZE,
                actual: raw.len(),
            });
        }

        let dst = MacAddr::new([raw[0], raw[1], raw[2], raw[3], raw[4], raw[5]]);
        let src = MacAddr::new([raw[6], raw[7], raw[8], raw[9], raw[10], raw[11]]);
        let outer_type = u16::from_be_bytes([raw[12], raw[13]]);

        let (vlan, ethertype, offset) = if outer_type == ETHERTYPE_VLAN {
            let tagged_size = ETHERNET_HEADER_SIZE + VLAN_TAG_SIZE;
            if raw.len() < tagged_size {
                return Err(FrameError::TooShort {
                    layer: "vlan",
                    min: tagged_size,
                    actual: raw.len(),
                });
            }
            let tci = u16::from_be_bytes([raw[14], raw[15]]);
            let tag = VlanTag {
                id: tci & VLAN_ID_MASK,
                pcp: (tci >> 13) as u8,
            };
            (Some(tag), u16::from_be_bytes([raw[16], raw[17]]), tagged_size)
        } else {
            (None, outer_type, ETHERNET_HEADER_SIZE)
        };

        let body = &raw[offset..];
        let payload = match ethertype {
            ETHERTYPE_IPV4 => EtherPayload::Ipv4(Ipv4Packet::parse(body)?),
            ETHERTYPE_ARP => {
                if body.len() < ARP_PACKET_SIZE {
                    return Err(FrameError::TooShort {
                        layer: "arp",
                        min: ARP_PACKET_SIZE,
                        actual: body.len(),
                    });
                }
                EtherPayload::Arp
            }
            _ => EtherPayload::Other,
        };

        Ok(Self {
            dst,
            src,
            vlan,
            ethertype,
            payload,
        })
    }

    pub fn ipv4(&self) -> Option<&Ipv4Packet> {
        match &self.payload {
            EtherPayload::Ipv4(ip) => Some(ip),
            _ => None,
        }
    }

    pub fn is_arp(&self) -> bool {
        matches!(self.payload, EtherPayload::Arp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::transport::Transport;

    fn eth_header(ethertype: u16) -> Vec<u8> {
        let mut raw = vec![0xFF; 6];
        raw.extend_from_slice(&[0x02, 0, 0, 0, 0, 0x0A]);
        raw.extend_from_slice(&ethertype.to_be_bytes());
        raw
    }

    fn ipv4_icmp() -> Vec<u8> {
        let mut raw = vec![0x45, 0, 0, 24, 0, 0, 0, 0, 64, 1, 0, 0];
        raw.extend_from_slice(&[10, 0, 0, 1, 10, 0, 0, 2]);
        raw.extend_from_slice(&[8, 0, 0, 0]);
        raw
    }

    #[test]
    fn untagged_ipv4() {
        let mut raw = eth_header(ETHERTYPE_IPV4);
        raw.extend_from_slice(&ipv4_icmp());
        let frame = EthernetFrame::parse(&raw).unwrap();
        assert_eq!(frame.dst, MacAddr::new([0xFF; 6]));
        assert_eq!(frame.src, MacAddr::new([0x02, 0, 0, 0, 0, 0x0A]));
        assert_eq!(frame.vlan, None);
        assert_eq!(frame.ethertype, ETHERTYPE_IPV4);
        let ip = frame.ipv4().unwrap();
        assert!(matches!(ip.transport, Transport::Icmp(_)));
    }

    #[test]
    fn tagged_ipv4() {
        let mut raw = eth_header(ETHERTYPE_VLAN);
        // pcp=5, vid=100
        raw.extend_from_slice(&((5u16 << 13) | 100).to_be_bytes());
        raw.extend_from_slice(&ETHERTYPE_IPV4.to_be_bytes());
        raw.extend_from_slice(&ipv4_icmp());
        let frame = EthernetFrame::parse(&raw).unwrap();
        assert_eq!(frame.vlan, Some(VlanTag { id: 100, pcp: 5 }));
        assert_eq!(frame.ethertype, ETHERTYPE_IPV4);
        assert!(frame.ipv4().is_some());
    }

    #[test]
    fn arp_is_marked() {
        let mut raw = eth_header(ETHERTYPE_ARP);
        raw.extend_from_slice(&[0u8; 28]);
        let frame = EthernetFrame::parse(&raw).unwrap();
        assert!(frame.is_arp());
        assert!(frame.ipv4().is_none());
    }

    #[test]
    fn truncated_arp_fails() {
        let mut raw = eth_header(ETHERTYPE_ARP);
        raw.extend_from_slice(&[0u8; 10]);
        assert!(matches!(
            EthernetFrame::parse(&raw),
            Err(FrameError::TooShort { layer: "arp", .. })
        ));
    }

    #[test]
    fn other_ethertype() {
        let mut raw = eth_header(0x86DD);
        raw.extend_from_slice(&[0u8; 40]);
        let frame = EthernetFrame::parse(&raw).unwrap();
        assert_eq!(frame.payload, EtherPayload::Other);
    }

    #[test]
    fn too_short_for_ethernet() {
        assert_eq!(
            EthernetFrame::parse(&[0u8; 13]).unwrap_err(),
            FrameError::TooShort {
                layer: "ethernet",
                min: 14,
                actual: 13
            }
        );
    }

    #[test]
    fn truncated_vlan_tag() {
        let mut raw = eth_header(ETHERTYPE_VLAN);
        raw.push(0);
        assert!(matches!(
            EthernetFrame::parse(&raw),
            Err(FrameError::TooShort { layer: "vlan", .. })
        ));
    }

    #[test]
    fn broken_ip_header_fails_whole_frame() {
        let mut raw = eth_header(ETHERTYPE_IPV4);
        raw.extend_from_slice(&[0x45, 0, 0]);
        assert!(EthernetFrame::parse(&raw).is_err());
    }
}
