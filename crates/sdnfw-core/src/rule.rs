//! Firewall rule types.
//!
//! Every matchable field is either a wildcard or an exact value, so wildcard
//! handling is checked by the compiler instead of by comparing against an
//! `"any"` string at match time.

use core::fmt;
use core::ops::Deref;
use core::str::FromStr;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use ipnet::{IpNet, Ipv4Net};

use crate::error::RuleError;
use crate::tuple::Protocol;
use crate::types::PortId;

/// The token that stands for "match anything" in the rule-set format.
pub const WILDCARD: &str = "any";

/// A rule field that either matches anything or one exact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field<T> {
    Any,
    Exact(T),
}

impl<T: PartialEq> Field<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Field::Any => true,
            Field::Exact(expected) => expected == value,
        }
    }

    /// An absent value only satisfies the wildcard.
    pub fn matches_opt(&self, value: Option<&T>) -> bool {
        match (self, value) {
            (Field::Any, _) => true,
            (Field::Exact(expected), Some(actual)) => expected == actual,
            (Field::Exact(_), None) => false,
        }
    }
}

impl<T> Field<T> {
    /// Parse a token, mapping [`WILDCARD`] to `Any` and anything else through `parse`.
    pub fn parse_with<E>(token: &str, parse: impl FnOnce(&str) -> Result<T, E>) -> Result<Self, E> {
        if token == WILDCARD {
            Ok(Field::Any)
        } else {
            parse(token).map(Field::Exact)
        }
    }
}

impl<T: fmt::Display> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Any => f.write_str(WILDCARD),
            Field::Exact(v) => v.fmt(f),
        }
    }
}

/// An address-range rule field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubnetMatch {
    Any,
    Cidr(IpNet),
    /// A token that is neither a network nor an address. Never matches.
    Malformed(String),
}

impl SubnetMatch {
    /// Interpret a subnet token. A bare address is a single-host network and
    /// host bits below the prefix are tolerated. An IPv4 prefix may also be
    /// written as a netmask (`/255.255.255.0`) or hostmask (`/0.0.0.255`).
    pub fn parse(token: &str) -> Self {
        if token == WILDCARD {
            return SubnetMatch::Any;
        }
        if let Some((addr, mask)) = token.split_once('/') {
            if let (Ok(addr), Ok(mask)) = (addr.parse::<Ipv4Addr>(), mask.parse::<Ipv4Addr>()) {
                return mask_prefix(mask)
                    .and_then(|prefix| Ipv4Net::new(addr, prefix).ok())
                    .map_or_else(
                        || SubnetMatch::Malformed(token.to_string()),
                        |net| SubnetMatch::Cidr(IpNet::V4(net)),
                    );
            }
            return match token.parse::<IpNet>() {
                Ok(net) => SubnetMatch::Cidr(net),
                Err(_) => SubnetMatch::Malformed(token.to_string()),
            };
        }
        let host = token.parse::<IpAddr>().ok().and_then(|addr| {
            let prefix = if addr.is_ipv4() { 32 } else { 128 };
            IpNet::new(addr, prefix).ok()
        });
        match host {
            Some(net) => SubnetMatch::Cidr(net),
            None => SubnetMatch::Malformed(token.to_string()),
        }
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        match self {
            SubnetMatch::Any => true,
            SubnetMatch::Cidr(net) => net.contains(&IpAddr::V4(addr)),
            SubnetMatch::Malformed(token) => {
                tracing::trace!(subnet = %token, %addr, "malformed subnet never matches");
                false
            }
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, SubnetMatch::Malformed(_))
    }
}

/// Prefix length of a contiguous netmask, or of the netmask a contiguous
/// hostmask complements. An all-zero mask reads as a netmask (`/0`).
fn mask_prefix(mask: Ipv4Addr) -> Option<u8> {
    let contiguous = |bits: u32| bits.leading_ones() + bits.trailing_zeros() == 32;
    let bits = u32::from(mask);
    let netmask = if contiguous(bits) { bits } else { !bits };
    if !contiguous(netmask) {
        return None;
    }
    u8::try_from(netmask.leading_ones()).ok()
}

impl fmt::Display for SubnetMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubnetMatch::Any => f.write_str(WILDCARD),
            SubnetMatch::Cidr(net) => write!(f, "{net}"),
            SubnetMatch::Malformed(token) => f.write_str(token),
        }
    }
}

/// The admission decision for a packet, and the action a rule carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Verdict {
    Allow,
    Block,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Allow => f.write_str("allow"),
            Verdict::Block => f.write_str("block"),
        }
    }
}

impl FromStr for Verdict {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow" => Ok(Verdict::Allow),
            "block" => Ok(Verdict::Block),
            other => Err(RuleError::UnknownAction(other.to_string())),
        }
    }
}

/// One firewall rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub ingress_port: Field<PortId>,
    pub protocol: Field<Protocol>,
    pub src_subnet: SubnetMatch,
    pub src_port: Field<u16>,
    pub dst_subnet: SubnetMatch,
    pub dst_port: Field<u16>,
    pub action: Verdict,
}

impl Rule {
    /// A rule that matches every packet.
    pub fn match_all(action: Verdict) -> Self {
        Self {
            ingress_port: Field::Any,
            protocol: Field::Any,
            src_subnet: SubnetMatch::Any,
            src_port: Field::Any,
            dst_subnet: SubnetMatch::Any,
            dst_port: Field::Any,
            action,
        }
    }

    /// Build a rule from the seven tokens
    /// `(ingress_port, protocol, src_subnet, src_port, dst_subnet, dst_port, action)`.
    ///
    /// Malformed subnets are kept as [`SubnetMatch::Malformed`] rather than
    /// rejected; every other malformed token is an error.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, RuleError> {
        let [ingress, protocol, src_subnet, src_port, dst_subnet, dst_port, action] = tokens
        else {
            return Err(RuleError::WrongFieldCount(tokens.len()));
        };

        Ok(Self {
            ingress_port: Field::parse_with(ingress.as_ref(), |s| {
                parse_decimal(s)
                    .map(PortId)
                    .ok_or_else(|| RuleError::InvalidIngressPort(s.to_string()))
            })?,
            protocol: Field::parse_with(protocol.as_ref(), |s| s.parse())?,
            src_subnet: SubnetMatch::parse(src_subnet.as_ref()),
            src_port: Field::parse_with(src_port.as_ref(), parse_port)?,
            dst_subnet: SubnetMatch::parse(dst_subnet.as_ref()),
            dst_port: Field::parse_with(dst_port.as_ref(), parse_port)?,
            action: action.as_ref().parse()?,
        })
    }
}

fn parse_port(s: &str) -> Result<u16, RuleError> {
    parse_decimal(s).ok_or_else(|| RuleError::InvalidPort(s.to_string()))
}

/// Ports are compared as written, so only the plain decimal spelling of a
/// number is accepted: `80`, never `080` or `+80`.
fn parse_decimal(s: &str) -> Option<u16> {
    s.parse::<u16>().ok().filter(|n| n.to_string() == s)
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {}, {}, {}, {})",
            self.ingress_port,
            self.protocol,
            self.src_subnet,
            self.src_port,
            self.dst_subnet,
            self.dst_port,
            self.action
        )
    }
}

/// An immutable, ordered rule list.
///
/// Cloning is cheap; reconfiguration replaces the whole set rather than
/// editing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet(Arc<[Rule]>);

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self(rules.into())
    }

    pub fn as_slice(&self) -> &[Rule] {
        &self.0
    }
}

impl Deref for RuleSet {
    type Target = [Rule];

    fn deref(&self) -> &[Rule] {
        &self.0
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self::new(rules)
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    #[test]
    fn field_any_matches_everything() {
        let f: Field<u16> = Field::Any;
        assert!(f.matches(&80));
        assert!(f.matches_opt(Some(&80)));
        assert!(f.matches_opt(None));
    }

    #[test]
    fn field_exact_requires_equal_value() {
        let f = Field::Exact(80u16);
        assert!(f.matches(&80));
        assert!(!f.matches(&81));
        assert!(f.matches_opt(Some(&80)));
        assert!(!f.matches_opt(None));
    }

    #[test]
    fn subnet_containment() {
        let net = SubnetMatch::parse("10.0.0.0/24");
        assert!(net.contains(ip("10.0.0.5")));
        assert!(net.contains(ip("10.0.0.0")));
        assert!(net.contains(ip("10.0.0.255")));
        assert!(!net.contains(ip("10.0.1.0")));
        assert!(!SubnetMatch::parse("10.0.1.0/24").contains(ip("10.0.0.5")));
    }

    #[test]
    fn bare_address_is_host_route() {
        let host = SubnetMatch::parse("10.0.0.5");
        assert!(host.contains(ip("10.0.0.5")));
        assert!(!host.contains(ip("10.0.0.6")));
    }

    #[test]
    fn host_bits_are_tolerated() {
        let net = SubnetMatch::parse("10.0.0.77/24");
        assert!(matches!(net, SubnetMatch::Cidr(_)));
        assert!(net.contains(ip("10.0.0.1")));
    }

    #[test]
    fn zero_prefix_matches_everything() {
        let net = SubnetMatch::parse("0.0.0.0/0");
        assert!(net.contains(ip("1.2.3.4")));
        assert!(net.contains(ip("255.255.255.255")));
    }

    #[test]
    fn netmask_and_hostmask_forms() {
        let cidr = SubnetMatch::parse("10.0.0.0/24");
        for token in ["10.0.0.0/255.255.255.0", "10.0.0.0/0.0.0.255", "10.0.0.9/255.255.255.0"] {
            let net = SubnetMatch::parse(token);
            assert!(matches!(net, SubnetMatch::Cidr(_)), "{token} should parse");
            assert!(net.contains(ip("10.0.0.5")));
            assert!(net.contains(ip("10.0.0.255")));
            assert!(!net.contains(ip("10.0.1.0")));
            assert_eq!(
                net.contains(ip("10.0.0.77")),
                cidr.contains(ip("10.0.0.77"))
            );
        }
        assert!(SubnetMatch::parse("10.0.0.5/255.255.255.255").contains(ip("10.0.0.5")));
        assert!(SubnetMatch::parse("0.0.0.0/0.0.0.0").contains(ip("8.8.8.8")));
    }

    #[test]
    fn mask_prefix_lengths() {
        assert_eq!(mask_prefix(ip("255.255.255.0")), Some(24));
        assert_eq!(mask_prefix(ip("0.0.0.255")), Some(24));
        assert_eq!(mask_prefix(ip("255.255.128.0")), Some(17));
        assert_eq!(mask_prefix(ip("0.0.127.255")), Some(17));
        assert_eq!(mask_prefix(ip("255.255.255.255")), Some(32));
        assert_eq!(mask_prefix(ip("0.0.0.0")), Some(0));
        assert_eq!(mask_prefix(ip("255.0.255.0")), None);
    }

    #[test]
    fn malformed_subnets_never_match() {
        for token in [
            "10.0.0.0/33",
            "10.0.0/24",
            "not-a-net",
            "10.0.0.300",
            "",
            "10.0.0.0/255.0.255.0",
            "10.0.0.0/255.255.255.256",
        ] {
            let net = SubnetMatch::parse(token);
            assert!(net.is_malformed(), "{token} should be malformed");
            assert!(!net.contains(ip("10.0.0.1")));
        }
    }

    #[test]
    fn ipv6_subnet_never_contains_ipv4() {
        let net = SubnetMatch::parse("::/0");
        assert!(matches!(net, SubnetMatch::Cidr(_)));
        assert!(!net.contains(ip("10.0.0.1")));
    }

    #[test]
    fn from_tokens_full_rule() {
        let rule =
            Rule::from_tokens(&["1", "TCP", "10.0.0.0/24", "any", "any", "80", "allow"]).unwrap();
        assert_eq!(rule.ingress_port, Field::Exact(PortId(1)));
        assert_eq!(rule.protocol, Field::Exact(Protocol::Tcp));
        assert_eq!(rule.src_subnet, SubnetMatch::parse("10.0.0.0/24"));
        assert_eq!(rule.src_port, Field::Any);
        assert_eq!(rule.dst_subnet, SubnetMatch::Any);
        assert_eq!(rule.dst_port, Field::Exact(80));
        assert_eq!(rule.action, Verdict::Allow);
    }

    #[test]
    fn from_tokens_all_wildcards() {
        let rule =
            Rule::from_tokens(&["any", "any", "any", "any", "any", "any", "block"]).unwrap();
        assert_eq!(rule, Rule::match_all(Verdict::Block));
    }

    #[test]
    fn from_tokens_keeps_malformed_subnet() {
        let rule =
            Rule::from_tokens(&["any", "any", "bogus", "any", "any", "any", "allow"]).unwrap();
        assert!(rule.src_subnet.is_malformed());
    }

    #[test]
    fn from_tokens_errors() {
        assert_eq!(
            Rule::from_tokens(&["any", "any"]).unwrap_err(),
            RuleError::WrongFieldCount(2)
        );
        assert_eq!(
            Rule::from_tokens(&["eth0", "any", "any", "any", "any", "any", "allow"]).unwrap_err(),
            RuleError::InvalidIngressPort("eth0".to_string())
        );
        assert_eq!(
            Rule::from_tokens(&["any", "tcp", "any", "any", "any", "any", "allow"]).unwrap_err(),
            RuleError::UnknownProtocol("tcp".to_string())
        );
        assert_eq!(
            Rule::from_tokens(&["any", "any", "any", "http", "any", "any", "allow"]).unwrap_err(),
            RuleError::InvalidPort("http".to_string())
        );
        assert_eq!(
            Rule::from_tokens(&["any", "any", "any", "any", "any", "70000", "allow"]).unwrap_err(),
            RuleError::InvalidPort("70000".to_string())
        );
        assert_eq!(
            Rule::from_tokens(&["any", "any", "any", "any", "any", "080", "allow"]).unwrap_err(),
            RuleError::InvalidPort("080".to_string())
        );
        assert_eq!(
            Rule::from_tokens(&["any", "any", "any", "+80", "any", "any", "allow"]).unwrap_err(),
            RuleError::InvalidPort("+80".to_string())
        );
        assert_eq!(
            Rule::from_tokens(&["01", "any", "any", "any", "any", "any", "allow"]).unwrap_err(),
            RuleError::InvalidIngressPort("01".to_string())
        );
        assert_eq!(
            Rule::from_tokens(&["any", "any", "any", "any", "any", "any", "deny"]).unwrap_err(),
            RuleError::UnknownAction("deny".to_string())
        );
    }

    #[test]
    fn rule_display_round_trips_tokens() {
        let rule =
            Rule::from_tokens(&["2", "ICMP", "10.0.0.0/8", "any", "any", "any", "block"]).unwrap();
        assert_eq!(rule.to_string(), "(2, ICMP, 10.0.0.0/8, any, any, any, block)");
    }

    #[test]
    fn rule_set_clone_shares_storage() {
        let set = RuleSet::new(vec![Rule::match_all(Verdict::Allow)]);
        let copy = set.clone();
        assert_eq!(copy.len(), 1);
        assert!(std::ptr::eq(set.as_slice(), copy.as_slice()));
    }
}
