//! Rule-set loading from configuration tokens.

use sdnfw_core::{Rule, RuleSet};
use tracing::{debug, warn};

use crate::config::RuleToken;
use crate::error::ControllerError;

/// Build a switch's rule snapshot from its configured tuples.
///
/// The first unparseable rule aborts the load. Rules with a malformed subnet
/// load but can never match; those are logged.
pub fn load_rules(switch: &str, rows: &[Vec<RuleToken>]) -> Result<RuleSet, ControllerError> {
    let mut rules = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let tokens: Vec<String> = row.iter().map(ToString::to_string).collect();
        let rule = Rule::from_tokens(&tokens).map_err(|source| ControllerError::Rule {
            switch: switch.to_string(),
            index,
            source,
        })?;
        if rule.src_subnet.is_malformed() || rule.dst_subnet.is_malformed() {
            warn!(switch, index, %rule, "rule has a malformed subnet and will never match");
        }
        rules.push(rule);
    }
    debug!(switch, rules = rules.len(), "rule set loaded");
    Ok(RuleSet::new(rules))
}
