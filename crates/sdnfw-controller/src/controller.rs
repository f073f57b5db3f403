//! One dispatch policy per configured switch.

use std::collections::HashMap;

use sdnfw_core::{DispatchOutcome, DispatchPolicy, PacketIn, PortId, SwitchId};
use tracing::info;

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::first_seen::SharedFirstSeen;
use crate::recording::{RecordingForwarder, RecordingInstaller};

pub type SwitchPolicy = DispatchPolicy<RecordingInstaller, RecordingForwarder, SharedFirstSeen>;

/// The set of firewall instances a controller hosts.
pub struct Controller {
    switches: HashMap<String, (SwitchId, SwitchPolicy)>,
    first_seen: SharedFirstSeen,
}

impl Controller {
    /// Build a policy for every configured switch.
    ///
    /// Fails on the first switch whose rules do not parse.
    pub fn from_config(config: &ControllerConfig) -> Result<Self, ControllerError> {
        let first_seen = SharedFirstSeen::new();
        let mut switches = HashMap::with_capacity(config.switches.len());
        for entry in &config.switches {
            let rules = entry.rule_set()?;
            info!(
                switch = %entry.name,
                dpid = entry.dpid,
                rules = rules.len(),
                reverse_offload = entry.reverse_offload,
                "switch configured"
            );
            let policy = DispatchPolicy::new(
                entry.name.clone(),
                rules,
                entry.offload_settings(),
                RecordingInstaller::default(),
                RecordingForwarder::default(),
                first_seen.clone(),
            );
            switches.insert(entry.name.clone(), (entry.switch_id(), policy));
        }
        Ok(Self {
            switches,
            first_seen,
        })
    }

    pub fn switch(&self, name: &str) -> Option<&SwitchPolicy> {
        self.switches.get(name).map(|(_, policy)| policy)
    }

    pub fn first_seen(&self) -> &SharedFirstSeen {
        &self.first_seen
    }

    /// Feed a raw frame to the named switch as if it arrived on `in_port`.
    pub fn packet_in(
        &mut self,
        name: &str,
        in_port: PortId,
        data: Vec<u8>,
        buffer_id: Option<u32>,
    ) -> Result<DispatchOutcome, ControllerError> {
        let (switch_id, policy) = self
            .switches
            .get_mut(name)
            .ok_or_else(|| ControllerError::UnknownSwitch(name.to_string()))?;
        let event = PacketIn {
            switch_id: *switch_id,
            in_port,
            data,
            buffer_id,
        };
        Ok(policy.handle_packet_in(&event))
    }

    /// Swap in the rule sets of `config` for switches that already exist.
    ///
    /// Every rule set is parsed before any is swapped, so a bad rule leaves
    /// all switches on their previous snapshot.
    pub fn reload_rules(&mut self, config: &ControllerConfig) -> Result<usize, ControllerError> {
        let mut pending = Vec::new();
        for entry in &config.switches {
            if self.switches.contains_key(&entry.name) {
                pending.push((entry.name.as_str(), entry.rule_set()?));
            }
        }
        let replaced = pending.len();
        for (name, rules) in pending {
            if let Some((_, policy)) = self.switches.get_mut(name) {
                policy.replace_rules(rules);
            }
        }
        info!(replaced, "rule sets reloaded");
        Ok(replaced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdnfw_core::packet::FrameBuilder;
    use sdnfw_core::{MacAddr, OffloadProtocol};
    use std::net::Ipv4Addr;

    const CONFIG: &str = r#"
[[switches]]
name = "fw1"
dpid = 1
reverse_offload = true
rules = [
  ["any", "TCP", "10.0.0.0/24", "any", "any", 80, "allow"],
]

[[switches]]
name = "fw2"
dpid = 2
rules = [["any", "any", "any", "any", "any", "any", "allow"]]
"#;

    const HOST: MacAddr = MacAddr::new([0x02, 0, 0, 0, 0, 0x01]);

    fn web_syn() -> Vec<u8> {
        FrameBuilder::new(HOST, MacAddr::new([0x02, 0, 0, 0, 0, 0x02]))
            .ips(Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(93, 0, 0, 1))
            .tcp(40000, 80, 0x02)
            .build()
    }

    fn controller() -> Controller {
        Controller::from_config(&ControllerConfig::parse(CONFIG).unwrap()).unwrap()
    }

    #[test]
    fn builds_one_policy_per_switch() {
        let c = controller();
        assert_eq!(c.switch("fw1").unwrap().rules().len(), 1);
        assert_eq!(c.switch("fw2").unwrap().rules()[0].action, sdnfw_core::Verdict::Allow);
        assert!(c.switch("fw3").is_none());
    }

    #[test]
    fn offload_records_two_commands() {
        let mut c = controller();
        let outcome = c.packet_in("fw1", PortId(2), web_syn(), Some(1)).unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome::Offloaded {
                rule: 0,
                protocol: OffloadProtocol::Tcp
            }
        );
        assert_eq!(c.switch("fw1").unwrap().installer().commands().len(), 2);
    }

    #[test]
    fn first_seen_shared_across_switches() {
        let mut c = controller();
        c.packet_in("fw2", PortId(1), web_syn(), None).unwrap();
        c.packet_in("fw1", PortId(2), web_syn(), None).unwrap();
        let location = c.first_seen().with(|r| r.get(&HOST).copied()).unwrap();
        assert_eq!(location.to_string(), "switch 2 - port 1");
    }

    #[test]
    fn unknown_switch_rejected() {
        let mut c = controller();
        let err = c.packet_in("edge", PortId(1), web_syn(), None).unwrap_err();
        assert!(matches!(err, ControllerError::UnknownSwitch(name) if name == "edge"));
    }

    #[test]
    fn reload_swaps_snapshot() {
        let mut c = controller();
        let blocked = ControllerConfig::parse(
            r#"
[[switches]]
name = "fw1"
dpid = 1
rules = [["any", "any", "any", "any", "any", "any", "block"]]
"#,
        )
        .unwrap();
        assert_eq!(c.reload_rules(&blocked).unwrap(), 1);
        let outcome = c.packet_in("fw1", PortId(2), web_syn(), None).unwrap();
        assert_eq!(outcome, DispatchOutcome::Dropped { rule: Some(0) });
        assert_eq!(c.switch("fw2").unwrap().rules().len(), 1);
    }

    #[test]
    fn failed_reload_keeps_previous_rules() {
        let mut c = controller();
        let broken = ControllerConfig::parse(
            r#"
[[switches]]
name = "fw1"
dpid = 1
rules = [["any", "any", "any", "any", "any", "any", "deny"]]
"#,
        )
        .unwrap();
        assert!(c.reload_rules(&broken).is_err());
        let outcome = c.packet_in("fw1", PortId(2), web_syn(), None).unwrap();
        assert!(outcome.is_admitted());
    }
}
