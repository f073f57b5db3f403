//! First-match-wins rule evaluation.
//!
//! Evaluation is a pure function of the rule list, the packet tuple and the
//! ingress port. Rule order is the only precedence: the matcher never reorders
//! rules by specificity.

use crate::rule::{Rule, Verdict};
use crate::tuple::PacketTuple;
use crate::types::PortId;

/// The rule that decided a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch {
    /// Position of the rule in the list.
    pub index: usize,
    pub action: Verdict,
}

/// Whether a single rule accepts the tuple.
///
/// Checks run in a fixed order and stop at the first failure: ingress port,
/// protocol, source and destination subnet, source and destination port.
pub fn rule_matches(rule: &Rule, tuple: &PacketTuple, ingress_port: PortId) -> bool {
    if !rule.ingress_port.matches(&ingress_port) {
        return false;
    }
    if !rule.protocol.matches_opt(tuple.protocol.as_ref()) {
        return false;
    }
    if !(rule.src_subnet.contains(tuple.src_addr) && rule.dst_subnet.contains(tuple.dst_addr)) {
        return false;
    }
    rule.src_port.matches_opt(tuple.src_port.as_ref())
        && rule.dst_port.matches_opt(tuple.dst_port.as_ref())
}

/// Find the first rule accepting the tuple.
#[must_use]
pub fn first_match(rules: &[Rule], tuple: &PacketTuple, ingress_port: PortId) -> Option<RuleMatch> {
    rules.iter().enumerate().find_map(|(index, rule)| {
        let hit = rule_matches(rule, tuple, ingress_port);
        tracing::trace!(index, %rule, hit, "rule evaluated");
        hit.then_some(RuleMatch {
            index,
            action: rule.action,
        })
    })
}

/// Decide whether the packet is admitted. No match means [`Verdict::Block`].
#[must_use]
pub fn decide(rules: &[Rule], tuple: &PacketTuple, ingress_port: PortId) -> Verdict {
    first_match(rules, tuple, ingress_port).map_or(Verdict::Block, |m| m.action)
}
