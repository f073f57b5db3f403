//! Collaborators that keep what a policy asked of the switch.
//!
//! Used by the CLI to report a single dispatch and by tests.

use sdnfw_core::{DefaultForwarder, FlowInstallCommand, FlowInstaller, PacketIn};

#[derive(Debug, Default)]
pub struct RecordingInstaller {
    commands: Vec<FlowInstallCommand>,
}

impl RecordingInstaller {
    pub fn commands(&self) -> &[FlowInstallCommand] {
        &self.commands
    }
}

impl FlowInstaller for RecordingInstaller {
    fn install(&mut self, command: FlowInstallCommand) {
        self.commands.push(command);
    }
}

/// Counts packets handed to ordinary forwarding.
#[derive(Debug, Default)]
pub struct RecordingForwarder {
    forwarded: usize,
}

impl RecordingForwarder {
    pub fn forwarded(&self) -> usize {
        self.forwarded
    }
}

impl DefaultForwarder for RecordingForwarder {
    fn forward(&mut self, _event: &PacketIn) {
        self.forwarded += 1;
    }
}
