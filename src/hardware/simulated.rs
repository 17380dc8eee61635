//! In-memory hardware with injectable inputs and a journal of every commit
//! and flush. Stands in for the PLC in tests.

use super::{
    ActuatorCommand, BusMessage, BusQueue, HardwareError, HardwareInterface, InputInjection,
    SensorSnapshot,
};

pub struct SimulatedHardware {
    inputs: SensorSnapshot,
    staged: ActuatorCommand,
    physical: ActuatorCommand,
    commits: Vec<ActuatorCommand>,
    flushes: Vec<ActuatorCommand>,
    rx_queue: BusQueue,
    self_test_failure: Option<&'static str>,
    reject_commits: bool,
    snapshot_reads: u32,
}

impl SimulatedHardware {
    pub fn new() -> Self {
        Self {
            inputs: SensorSnapshot::default(),
            staged: ActuatorCommand::default(),
            physical: ActuatorCommand::default(),
            commits: Vec::new(),
            flushes: Vec::new(),
            rx_queue: BusQueue::new(),
            self_test_failure: None,
            reject_commits: false,
            snapshot_reads: 0,
        }
    }

    /// Make the next self-test fail with `reason`.
    pub fn fail_self_test(&mut self, reason: &'static str) {
        self.self_test_failure = Some(reason);
    }

    /// Reject every commit until switched back.
    pub fn set_reject_commits(&mut self, reject: bool) {
        self.reject_commits = reject;
    }

    pub fn enqueue_bus_message(&mut self, message: BusMessage) -> Result<(), BusMessage> {
        self.rx_queue.enqueue(message)
    }

    pub fn pending_bus_messages(&self) -> usize {
        self.rx_queue.len()
    }

    /// Every command accepted by `commit_outputs`, oldest first.
    pub fn commits(&self) -> &[ActuatorCommand] {
        &self.commits
    }

    /// Every command made physically effective by `flush`, oldest first.
    pub fn flushes(&self) -> &[ActuatorCommand] {
        &self.flushes
    }

    /// Output image as last flushed to the "hardware".
    pub fn physical_outputs(&self) -> &ActuatorCommand {
        &self.physical
    }

    pub fn snapshot_reads(&self) -> u32 {
        self.snapshot_reads
    }

    pub fn clear_journal(&mut self) {
        self.commits.clear();
        self.flushes.clear();
    }
}

impl Default for SimulatedHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareInterface for SimulatedHardware {
    fn self_test(&mut self) -> Result<(), HardwareError> {
        match self.self_test_failure {
            Some(reason) => Err(HardwareError::SelfTest(reason)),
            None => Ok(()),
        }
    }

    fn snapshot_inputs(&mut self) -> SensorSnapshot {
        self.snapshot_reads = self.snapshot_reads.wrapping_add(1);
        self.inputs
    }

    fn current_outputs(&self) -> ActuatorCommand {
        self.staged.clone()
    }

    fn commit_outputs(&mut self, command: ActuatorCommand) -> Result<(), HardwareError> {
        if self.reject_commits {
            return Err(HardwareError::RegisterWrite(0));
        }
        let command = command.clamped();
        self.commits.push(command.clone());
        self.staged = command;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), HardwareError> {
        self.physical = self.staged.clone();
        self.flushes.push(self.physical.clone());
        Ok(())
    }

    fn next_bus_message(&mut self) -> Option<BusMessage> {
        self.rx_queue.dequeue()
    }
}

impl InputInjection for SimulatedHardware {
    fn inject_inputs(&mut self, snapshot: SensorSnapshot) {
        self.inputs = snapshot;
    }
}
