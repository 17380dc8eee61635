//! The supervisor state machine.
//!
//! ```text
//!   BOOT ──[self-test ok]──▶ IDLE ──[ignition closed]──▶ IGNITION
//!     │                       ▲  ▲                          │
//! [self-test failed]          │  └──[interlock trip]────────┤
//!     ▼                       │                     [interlocks ok,
//!  FATAL_ERROR                └──[interlock trip]──  pump then fan at 20%]
//!                                     ACTIVE ◀──────────────┘
//! ```
//!
//! Each call to [`Supervisor::step`] runs exactly one state handler to
//! completion. Handlers return the next state, so every path through a
//! handler ends in a defined state.

use crate::config::Parameters;
use crate::controller::FeedbackController;
use crate::fault::{FaultKind, FaultLog};
use crate::hardware::{
    formatted_message, ActuatorCommand, CoolantStatus, DisplayState, HardwareError,
    HardwareInterface, MAX_POWER_PERCENT,
};
use crate::interlock::{self, InterlockTrip};
use crate::state::SupervisorState;
use crate::status::StatusReport;
use static_assertions::const_assert;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Duty cycle for the pump and fan when they are first switched on.
pub const STAGED_POWER_PERCENT: u8 = 20;
const_assert!(STAGED_POWER_PERCENT <= MAX_POWER_PERCENT);

pub const READY_MESSAGE: &str = "Ready for ignition.";
pub const REFILL_MESSAGE: &str = "Coolant refill required.";

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("hardware initialisation failed: {0}")]
    Hardware(#[from] HardwareError),
}

pub struct Supervisor<H: HardwareInterface, C: FeedbackController> {
    params: Parameters,
    state: SupervisorState,
    hardware: H,
    controller: C,
    faults: FaultLog,
    cycle: u64,
    last_trip: Option<InterlockTrip>,
    drained_messages: u64,
}

impl<H: HardwareInterface, C: FeedbackController> Supervisor<H, C> {
    pub fn new(params: Parameters, hardware: H, controller: C) -> Self {
        Self {
            params,
            state: SupervisorState::Boot,
            hardware,
            controller,
            faults: FaultLog::new(),
            cycle: 0,
            last_trip: None,
            drained_messages: 0,
        }
    }

    /// Bring up the hardware and controller and (re)enter `Boot`.
    pub fn initialize(&mut self) -> Result<(), SupervisorError> {
        self.hardware.initialize()?;
        self.controller.initialize();
        self.state = SupervisorState::Boot;
        info!(
            min_voltage = self.params.min_voltage(),
            setpoint = self.params.temperature_setpoint(),
            "supervisor initialised"
        );
        Ok(())
    }

    /// Run the handler for the current state once.
    pub fn step(&mut self) -> SupervisorState {
        self.cycle = self.cycle.wrapping_add(1);
        let previous = self.state;

        let next = match previous {
            SupervisorState::Boot => self.boot(),
            SupervisorState::FatalError => self.fatal_error(),
            SupervisorState::Idle => self.idle(),
            SupervisorState::Ignition => self.ignition(),
            SupervisorState::Active => self.active(),
        };

        if next != previous {
            info!(cycle = self.cycle, from = %previous, to = %next, "entering {} state", next);
        }
        self.state = next;
        next
    }

    /// Force the state from a raw tag. Unknown tags latch `FatalError`.
    pub fn restore_state_tag(&mut self, tag: u8) -> SupervisorState {
        self.state = match SupervisorState::from_tag(tag) {
            Some(state) => state,
            None => {
                error!(tag, "state machine set to invalid state");
                self.faults.record(FaultKind::InvalidState(tag), self.state, self.cycle);
                SupervisorState::FatalError
            }
        };
        self.state
    }

    fn boot(&mut self) -> SupervisorState {
        match self.hardware.self_test() {
            Ok(()) => SupervisorState::Idle,
            Err(e) => {
                error!("self-tests failed: {}", e);
                self.faults.record(FaultKind::SelfTestFailed, SupervisorState::Boot, self.cycle);
                SupervisorState::FatalError
            }
        }
    }

    fn fatal_error(&mut self) -> SupervisorState {
        if let Some(fault) = self.faults.fatal_faults().last() {
            debug!(fault_id = fault.id, kind = ?fault.kind, "fatal error latched");
        }
        SupervisorState::FatalError
    }

    fn idle(&mut self) -> SupervisorState {
        let inputs = self.hardware.snapshot_inputs();
        self.drain_bus_messages();

        let display = if inputs.level_switch_closed {
            DisplayState::new(CoolantStatus::Sufficient, READY_MESSAGE)
        } else {
            DisplayState::new(CoolantStatus::Dry, REFILL_MESSAGE)
        };

        // Outputs stay written even when leaving for ignition.
        if let Err(e) = self.commit_and_flush(ActuatorCommand::de_energized(display)) {
            error!("failed to refresh idle outputs: {}", e);
            self.faults.record(FaultKind::OutputWriteFailed, SupervisorState::Idle, self.cycle);
        }

        if inputs.ignition_closed {
            SupervisorState::Ignition
        } else {
            SupervisorState::Idle
        }
    }

    fn ignition(&mut self) -> SupervisorState {
        let inputs = self.hardware.snapshot_inputs();

        if let Err(trip) = interlock::evaluate(&self.params, &inputs) {
            return self.trip(trip);
        }

        // Pump first, fan second: two commits so the inrush currents
        // never stack.
        let mut command = self.hardware.current_outputs();
        command.pump_enable = true;
        command.pump_ignition = true;
        command.pump_power_percent = STAGED_POWER_PERCENT;
        if let Err(e) = self.commit_and_flush(command.clone()) {
            return self.abort_on_write_failure(&e);
        }

        command.fan_enable = true;
        command.fan_power_percent = STAGED_POWER_PERCENT;
        if let Err(e) = self.commit_and_flush(command) {
            return self.abort_on_write_failure(&e);
        }

        self.last_trip = None;
        SupervisorState::Active
    }

    fn active(&mut self) -> SupervisorState {
        let inputs = self.hardware.snapshot_inputs();
        self.drain_bus_messages();

        if let Err(trip) = interlock::evaluate(&self.params, &inputs) {
            return self.trip(trip);
        }

        let output = self
            .controller
            .compute(inputs.temperature, self.params.temperature_setpoint());

        let mut command = self.hardware.current_outputs();
        command.fan_power_percent = output.fan_percent;
        command.pump_power_percent = output.pump_percent;
        if let Err(e) = self.commit_and_flush(command) {
            return self.abort_on_write_failure(&e);
        }

        SupervisorState::Active
    }

    /// De-energise after a failed guard and fall back to `Idle`.
    fn trip(&mut self, trip: InterlockTrip) -> SupervisorState {
        warn!(state = %self.state, interlock = ?trip.interlock(), "{}", trip);
        self.faults.record(FaultKind::Interlock(trip), self.state, self.cycle);
        self.last_trip = Some(trip);

        let mut display = self.hardware.current_outputs().display;
        if matches!(trip, InterlockTrip::DryCoolant) {
            display.coolant_status = CoolantStatus::Dry;
        }
        display.message = formatted_message(&trip);
        self.de_energize(display);

        SupervisorState::Idle
    }

    fn abort_on_write_failure(&mut self, e: &HardwareError) -> SupervisorState {
        error!(state = %self.state, "output write failed: {}", e);
        self.faults.record(FaultKind::OutputWriteFailed, self.state, self.cycle);
        let display = self.hardware.current_outputs().display;
        self.de_energize(display);
        SupervisorState::Idle
    }

    fn de_energize(&mut self, display: DisplayState) {
        if let Err(e) = self.commit_and_flush(ActuatorCommand::de_energized(display)) {
            error!("failed to de-energise outputs: {}", e);
        }
    }

    fn commit_and_flush(&mut self, command: ActuatorCommand) -> Result<(), HardwareError> {
        self.hardware.commit_outputs(command)?;
        self.hardware.flush()
    }

    /// Empty the reception queue. Payloads are not interpreted.
    fn drain_bus_messages(&mut self) {
        while let Some(message) = self.hardware.next_bus_message() {
            debug!(id = message.id, dlc = message.dlc, "discarding bus message");
            self.drained_messages = self.drained_messages.wrapping_add(1);
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn last_trip(&self) -> Option<&InterlockTrip> {
        self.last_trip.as_ref()
    }

    pub fn drained_messages(&self) -> u64 {
        self.drained_messages
    }

    pub fn faults(&self) -> &FaultLog {
        &self.faults
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            cycle: self.cycle,
            state: self.state,
            outputs: self.hardware.current_outputs(),
            last_trip: self.last_trip.map(|trip| trip.to_string()),
            drained_messages: self.drained_messages,
            faults_recorded: self.faults.total_recorded(),
        }
    }
}
