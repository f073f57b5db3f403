//! Per-event orchestration: decode, classify, then drop, forward or offload.

pub mod host;
pub mod outcome;
pub mod policy;

pub use host::{AddressTracker, DefaultForwarder, FlowInstaller, PacketIn};
pub use outcome::{DispatchOutcome, IgnoreReason, OffloadSettings, offload_protocol};
pub use policy::DispatchPolicy;
