//! Per-switch packet-in handling.
//!
//! One [`DispatchPolicy`] exists per connected switch. Each event is decoded,
//! classified against the current rule snapshot and either dropped, handed to
//! the default forwarder, or offloaded as a forward/reverse flow-entry pair.

use tracing::{debug, trace};

use crate::dispatch::host::{AddressTracker, DefaultForwarder, FlowInstaller, PacketIn};
use crate::dispatch::outcome::{DispatchOutcome, IgnoreReason, OffloadSettings, offload_protocol};
use crate::flow::synth::synthesize;
use crate::matcher::first_match;
use crate::packet::ethernet::EthernetFrame;
use crate::rule::{RuleSet, Verdict};
use crate::tuple::extract_tuple;

pub struct DispatchPolicy<I, F, T> {
    name: String,
    rules: RuleSet,
    settings: OffloadSettings,
    installer: I,
    forwarder: F,
    tracker: T,
}

impl<I, F, T> DispatchPolicy<I, F, T>
where
    I: FlowInstaller,
    F: DefaultForwarder,
    T: AddressTracker,
{
    pub fn new(
        name: impl Into<String>,
        rules: RuleSet,
        settings: OffloadSettings,
        installer: I,
        forwarder: F,
        tracker: T,
    ) -> Self {
        Self {
            name: name.into(),
            rules,
            settings,
            installer,
            forwarder,
            tracker,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn settings(&self) -> &OffloadSettings {
        &self.settings
    }

    pub fn installer(&self) -> &I {
        &self.installer
    }

    pub fn forwarder(&self) -> &F {
        &self.forwarder
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// Swap in a new rule snapshot, returning the previous one.
    ///
    /// Events already being handled keep classifying against the old list.
    pub fn replace_rules(&mut self, rules: RuleSet) -> RuleSet {
        debug!(switch = %self.name, rules = rules.len(), "rule set replaced");
        std::mem::replace(&mut self.rules, rules)
    }

    /// Handle one packet-in event.
    pub fn handle_packet_in(&mut self, event: &PacketIn) -> DispatchOutcome {
        let frame = match EthernetFrame::parse(&event.data) {
            Ok(frame) => frame,
            Err(err) => {
                debug!(switch = %self.name, in_port = %event.in_port, %err, "incomplete packet received");
                return DispatchOutcome::Ignored {
                    reason: IgnoreReason::Unparsed,
                };
            }
        };

        self.tracker.record_first_seen(frame.src, &event.location());

        if frame.is_arp() {
            trace!(switch = %self.name, in_port = %event.in_port, "arp passed through");
            self.forwarder.forward(event);
            return DispatchOutcome::PassedThrough;
        }

        let Some(ip) = frame.ipv4() else {
            trace!(switch = %self.name, ethertype = frame.ethertype, "non-ipv4 frame ignored");
            return DispatchOutcome::Ignored {
                reason: IgnoreReason::NotIpv4,
            };
        };

        let tuple = extract_tuple(ip, event.in_port);
        let Some(hit) = first_match(&self.rules, &tuple, event.in_port) else {
            debug!(switch = %self.name, in_port = %event.in_port, src = %tuple.src_addr, dst = %tuple.dst_addr, "no rules match");
            return DispatchOutcome::Dropped { rule: None };
        };

        if hit.action == Verdict::Block {
            debug!(switch = %self.name, rule = hit.index, src = %tuple.src_addr, dst = %tuple.dst_addr, "packet blocked");
            return DispatchOutcome::Dropped {
                rule: Some(hit.index),
            };
        }

        if let Some(protocol) = offload_protocol(ip.protocol, event.in_port, &self.settings) {
            debug!(switch = %self.name, rule = hit.index, ?protocol, "reverse enabled");
            let pair = synthesize(protocol, event.in_port, event.buffered_packet(), &frame, ip);
            self.installer.install(pair.forward);
            self.installer.install(pair.reverse);
            return DispatchOutcome::Offloaded {
                rule: hit.index,
                protocol,
            };
        }

        debug!(switch = %self.name, rule = hit.index, in_port = %event.in_port, "packet allowed");
        self.forwarder.forward(event);
        DispatchOutcome::Forwarded { rule: hit.index }
    }
}
