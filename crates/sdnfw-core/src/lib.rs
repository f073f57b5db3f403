//! Decision core of an SDN firewall controller.
//!
//! Given a frame delivered by a switch and the port it arrived on, this crate
//! decides whether the packet is permitted by an ordered rule list and, for
//! permitted flows, which forward and return-path flow entries to install so
//! that the switch handles the rest of the flow without the controller.
//!
//! The core is synchronous and side-effect free apart from the collaborator
//! traits in [`dispatch`], through which the host controller receives flow
//! install commands and single-packet forwarding requests.

pub mod constants;
pub mod dispatch;
pub mod error;
pub mod flow;
pub mod matcher;
pub mod packet;
pub mod rule;
pub mod tuple;
pub mod types;

pub use dispatch::{
    AddressTracker, DefaultForwarder, DispatchOutcome, DispatchPolicy, FlowInstaller,
    IgnoreReason, OffloadSettings, PacketIn,
};
pub use error::{FrameError, RuleError};
pub use flow::{FlowAction, FlowInstallCommand, FlowMatch, OffloadProtocol, synthesize};
pub use matcher::{RuleMatch, decide, first_match};
pub use packet::{EtherPayload, EthernetFrame, Ipv4Packet, Transport};
pub use rule::{Field, Rule, RuleSet, SubnetMatch, Verdict};
pub use tuple::{IcmpKind, PacketTuple, Protocol, extract_tuple};
pub use types::{BufferedPacket, MacAddr, PortId, SwitchId, SwitchLocation};
