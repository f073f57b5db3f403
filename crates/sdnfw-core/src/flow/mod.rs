//! Flow-table entries and the symmetric offload synthesizer.

pub mod command;
pub mod matching;
pub mod synth;

pub use command::{FlowAction, FlowInstallCommand};
pub use matching::{FlowMatch, OFP_VLAN_NONE};
pub use synth::{OffloadPair, OffloadProtocol, peer_port, synthesize};
