//! Smoke tests for the `sdnfw` binary.

use std::io::Write;
use std::process::Command;

const CONFIG: &[u8] = br#"
[logging]
level = "warn"

[[switches]]
name = "fw1"
dpid = 1
reverse_offload = true
rules = [
  ["any", "TCP", "10.0.0.0/24", "any", "any", 80, "allow"],
  ["any", "any", "any", "any", "any", "any", "block"],
]
"#;

/// TCP SYN 10.0.0.5:49152 -> 93.184.216.34:80.
const SYN: &str = concat!(
    "00:00:00:00:00:02 00:00:00:00:00:01 0800 ",
    "4500002c1c464000400600000a0000055db8d822",
    "c0000050000000000000000060020af000000000020405b4",
);

/// UDP 10.0.0.5:5353 -> 93.184.216.34:53.
const DNS: &str = concat!(
    "000000000002000000000001 0800",
    "4500001c00004000401100000a0000055db8d822",
    "14e90035000800000000",
);

fn config_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG).unwrap();
    file
}

fn sdnfw(config: &tempfile::NamedTempFile, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_sdnfw"))
        .args(["--config", config.path().to_str().unwrap()])
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run sdnfw")
}

#[test]
fn offloaded_flow_reported_as_json() {
    let config = config_file();
    let output = sdnfw(
        &config,
        &["--switch", "fw1", "--in-port", "2", "--frame", SYN, "--buffer-id", "9", "--json"],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["switch"], "fw1");
    assert_eq!(report["outcome"], "offloaded");
    assert_eq!(report["rule"], 0);
    assert_eq!(report["protocol"], "TCP");
    assert_eq!(report["forwarded"], false);

    let flows = report["flows"].as_array().unwrap();
    assert_eq!(flows.len(), 2);
    assert_eq!(flows[0]["flow_match"]["in_port"], 2);
    assert_eq!(flows[0]["buffered"]["buffer_id"], 9);
    assert_eq!(flows[1]["flow_match"]["in_port"], 1);
    assert_eq!(flows[1]["flow_match"]["tp_src"], 80);
    assert_eq!(flows[1]["actions"][0]["output"], 2);
}

#[test]
fn blocked_flow_reported_as_text() {
    let config = config_file();
    let output = sdnfw(&config, &["--switch", "fw1", "--in-port", "2", "--frame", DNS]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "fw1: dropped by rule 1");
}

#[test]
fn unknown_switch_fails() {
    let config = config_file();
    let output = sdnfw(&config, &["--switch", "edge", "--in-port", "1", "--frame", SYN]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown switch: edge"));
}

#[test]
fn missing_config_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_sdnfw"))
        .args(["--config", "/nonexistent/sdnfw.toml", "--switch", "fw1", "--in-port", "1"])
        .args(["--frame", SYN])
        .output()
        .expect("failed to run sdnfw");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load config"));
}
