//! Decoding of raw Ethernet frames into the headers the firewall inspects.
//!
//! Only the fields needed for classification and flow matching are kept.
//! Anything beyond the transport header is ignored.

pub mod builder;
pub mod ethernet;
pub mod ipv4;
pub mod transport;

pub use builder::FrameBuilder;
pub use ethernet::{EtherPayload, EthernetFrame, VlanTag};
pub use ipv4::Ipv4Packet;
pub use transport::{IcmpHeader, TcpHeader, Transport, UdpHeader};
