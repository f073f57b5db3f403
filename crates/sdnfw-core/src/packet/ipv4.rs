//! IPv4 header decoding.

use std::net::Ipv4Addr;

use crate::constants::IPV4_HEADER_MIN_SIZE;
use crate::error::FrameError;
use crate::packet::transport::Transport;

const IP_FRAGMENT_OFFSET_MASK: u16 = 0x1FFF;

/// A decoded IPv4 packet with its transport header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Packet {
    pub tos: u8,
    pub protocol: u8,
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    pub transport: Transport,
}

impl Ipv4Packet {
    /// Parse an IPv4 packet from the bytes following the Ethernet header.
    ///
    /// Errors are only returned for a broken IP header. Transport problems
    /// degrade to [`Transport::Other`].
    pub fn parse(raw: &[u8]) -> Result<Self, FrameError> {
        if raw.len() < IPV4_HEADER_MIN_SIZE {
            return Err(FrameError::TooShort {
                layer: "ipv4",
                min: IPV4_HEADER_MIN_SIZE,
                actual: raw.len(),
            });
        }

        let version = raw[0] >> 4;
        if version != 4 {
            return Err(FrameError::UnsupportedIpVersion(version));
        }

        let ihl = raw[0] & 0x0F;
        let header_len = usize::from(ihl) * 4;
        if header_len < IPV4_HEADER_MIN_SIZE {
            return Err(FrameError::InvalidIhl(ihl));
        }
        if raw.len() < header_len {
            return Err(FrameError::TooShort {
                layer: "ipv4",
                min: header_len,
                actual: raw.len(),
            });
        }

        let tos = raw[1];
        // Trailing Ethernet padding is not part of the payload
        let total_len = usize::from(u16::from_be_bytes([raw[2], raw[3]]));
        let end = total_len.clamp(header_len, raw.len());
        let fragment_offset = u16::from_be_bytes([raw[6], raw[7]]) & IP_FRAGMENT_OFFSET_MASK;
        let protocol = raw[9];
        let src = Ipv4Addr::new(raw[12], raw[13], raw[14], raw[15]);
        let dst = Ipv4Addr::new(raw[16], raw[17], raw[18], raw[19]);

        let transport = if fragment_offset == 0 {
            Transport::parse(protocol, &raw[header_len..end])
        } else {
            Transport::Other { protocol }
        };

        Ok(Self {
            tos,
            protocol,
            src,
            dst,
            transport,
        })
    }
}
