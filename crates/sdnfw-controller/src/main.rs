use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use sdnfw_controller::{Controller, ControllerConfig, ControllerError};
use sdnfw_core::{DispatchOutcome, FlowInstallCommand, PortId};

#[derive(Parser)]
#[command(name = "sdnfw", about = "Classify one frame against a switch's firewall rules")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "/etc/sdnfw/config.toml")]
    config: PathBuf,

    /// Name of the configured switch the frame arrives at
    #[arg(short, long)]
    switch: String,

    /// Ingress port number
    #[arg(short = 'p', long)]
    in_port: u16,

    /// Frame bytes as hex; `:` and whitespace are ignored
    #[arg(short, long)]
    frame: String,

    /// Switch buffer id holding the packet
    #[arg(short, long)]
    buffer_id: Option<u32>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    switch: &'a str,
    in_port: PortId,
    #[serde(flatten)]
    outcome: DispatchOutcome,
    forwarded: bool,
    flows: &'a [FlowInstallCommand],
}

fn decode_frame(text: &str) -> Result<Vec<u8>, ControllerError> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != ':' && !c.is_whitespace())
        .collect();
    Ok(hex::decode(cleaned)?)
}

fn run(cli: &Cli, config: &ControllerConfig) -> Result<(), ControllerError> {
    let data = decode_frame(&cli.frame)?;
    let mut controller = Controller::from_config(config)?;
    let outcome = controller.packet_in(&cli.switch, PortId(cli.in_port), data, cli.buffer_id)?;

    let policy = controller
        .switch(&cli.switch)
        .ok_or_else(|| ControllerError::UnknownSwitch(cli.switch.clone()))?;
    let flows = policy.installer().commands();
    let forwarded = policy.forwarder().forwarded() > 0;

    if cli.json {
        let report = Report {
            switch: &cli.switch,
            in_port: PortId(cli.in_port),
            outcome,
            forwarded,
            flows,
        };
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| ControllerError::Config(format!("failed to encode report: {e}")))?;
        println!("{text}");
    } else {
        println!("{}: {outcome}", cli.switch);
        if forwarded {
            println!("  forwarded by the default forwarder");
        }
        for flow in flows {
            let ports: Vec<String> = flow.output_ports().map(|p| p.to_string()).collect();
            println!(
                "  flow {:?} -> output {} (idle {}s, hard {}s)",
                flow.flow_match,
                ports.join(","),
                flow.idle_timeout,
                flow.hard_timeout
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ControllerConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to load config from {}: {e}", cli.config.display());
            return ExitCode::FAILURE;
        }
    };

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        sdnfw_controller::logging::init_json(&config.logging.level);
    } else {
        sdnfw_controller::logging::init_with_level(&config.logging.level);
    }

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
