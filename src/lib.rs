//! # Coolant Supervisor
//!
//! Finite-state-machine supervisor for a liquid-cooling appliance (pump, fan
//! and display) driven from an ignition switch, a coolant level switch, the
//! supply voltage and a temperature sensor.
//!
//! ## Features
//!
//! - **Staged start-up**: pump and fan are switched on in two separate
//!   commits so their inrush currents never stack
//! - **Interlocks every cycle**: undervoltage, dry coolant and ignition-off,
//!   checked in that order, first failure wins
//! - **Safe degradation**: any failed guard de-energises the actuators and
//!   drops back to idle; self-test failure latches a fatal state
//! - **Pluggable collaborators**: hardware access and feedback control sit
//!   behind traits
//! - **Embedded-friendly**: bounded queues and fault history, no heap in the
//!   control path
//!
//! ## Quick Start
//!
//! ```rust
//! use coolant_supervisor::{
//!     FixedOutputController, InputInjection, Parameters, SensorSnapshot,
//!     SimulatedHardware, Supervisor, SupervisorState,
//! };
//!
//! let params = Parameters::new(20.0, 20.0).unwrap();
//! let mut supervisor = Supervisor::new(
//!     params,
//!     SimulatedHardware::new(),
//!     FixedOutputController::default(),
//! );
//! supervisor.initialize().unwrap();
//!
//! assert_eq!(supervisor.step(), SupervisorState::Idle);
//!
//! supervisor.hardware_mut().inject_inputs(SensorSnapshot {
//!     supply_voltage: 24.0,
//!     ignition_closed: true,
//!     level_switch_closed: true,
//!     temperature: 30.0,
//! });
//! assert_eq!(supervisor.step(), SupervisorState::Ignition);
//! assert_eq!(supervisor.step(), SupervisorState::Active);
//! ```
//!
//! ## Architecture
//!
//! - [`supervisor`] - The state machine and its step function
//! - [`interlock`] - Ordered safety guards
//! - [`hardware`] - Sensor/actuator data model and the hardware boundary
//! - [`controller`] - Feedback controller interface
//! - [`fault`] - Bounded fault history
//! - [`status`] - Operator status reports
//! - [`config`] - Start-up parameters

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod controller;
pub mod fault;
pub mod hardware;
pub mod interlock;
pub mod state;
pub mod status;
pub mod supervisor;

// Re-export main public types for convenience
pub use config::{ConfigError, Parameters};
pub use controller::{ControlOutput, FeedbackController, FixedOutputController};
pub use hardware::{
    ActuatorCommand, BusMessage, CoolantStatus, DisplayState, HardwareError, HardwareInterface,
    InputInjection, PlcHardware, SensorSnapshot, SimulatedHardware,
};
pub use interlock::{Interlock, InterlockTrip};
pub use state::SupervisorState;
pub use status::{StatusFormat, StatusReport};
pub use supervisor::{Supervisor, SupervisorError};
