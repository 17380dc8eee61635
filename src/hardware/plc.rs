//! Register-mapped PLC implementation of [`HardwareInterface`].
//!
//! Inputs are converted from raw registers into a [`SensorSnapshot`];
//! committed commands are staged as an output image and written to the
//! output registers on [`flush`](HardwareInterface::flush).

use super::{
    ActuatorCommand, BusMessage, BusQueue, CoolantStatus, HardwareError, HardwareInterface,
    SensorSnapshot,
};
use tracing::{debug, warn};

pub const INPUT_REGISTER_COUNT: u8 = 12;
pub const OUTPUT_REGISTER_COUNT: u8 = 12;

/// Input register address, `IN_0` .. `IN_11`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputRegister(u8);

/// Output register address, `OUT_0` .. `OUT_11`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputRegister(u8);

impl InputRegister {
    pub const fn new(index: u8) -> Option<Self> {
        if index < INPUT_REGISTER_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

impl OutputRegister {
    pub const fn new(index: u8) -> Option<Self> {
        if index < OUTPUT_REGISTER_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

// Pin map
pub const IGNITION_INPUT: InputRegister = InputRegister(0);
pub const LEVEL_INPUT: InputRegister = InputRegister(1);
pub const TEMPERATURE_INPUT: InputRegister = InputRegister(2);
pub const SUPPLY_VOLTAGE_INPUT: InputRegister = InputRegister(3);

pub const PUMP_ENABLE_OUTPUT: OutputRegister = OutputRegister(0);
pub const PUMP_IGNITION_OUTPUT: OutputRegister = OutputRegister(1);
pub const FAN_ENABLE_OUTPUT: OutputRegister = OutputRegister(2);
pub const FAN_PWM_OUTPUT: OutputRegister = OutputRegister(3);
pub const DISPLAY_OUTPUT: OutputRegister = OutputRegister(4);
pub const PUMP_PWM_OUTPUT: OutputRegister = OutputRegister(5);

/// Value written to a single output register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterValue {
    Switch(bool),
    Duty(u8),
    Coolant(CoolantStatus),
}

/// Underlying PLC driver.
pub trait RegisterBus {
    fn read_bool(&mut self, register: InputRegister) -> Result<bool, HardwareError>;
    fn read_float(&mut self, register: InputRegister) -> Result<f32, HardwareError>;
    fn write(&mut self, register: OutputRegister, value: RegisterValue) -> Result<(), HardwareError>;
}

/// Driver stand-in: every input reads as open/zero, writes are accepted
/// and discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRegisterBus;

impl RegisterBus for NullRegisterBus {
    fn read_bool(&mut self, _register: InputRegister) -> Result<bool, HardwareError> {
        Ok(false)
    }

    fn read_float(&mut self, _register: InputRegister) -> Result<f32, HardwareError> {
        Ok(0.0)
    }

    fn write(&mut self, _register: OutputRegister, _value: RegisterValue) -> Result<(), HardwareError> {
        Ok(())
    }
}

pub struct PlcHardware<B: RegisterBus> {
    bus: B,
    outputs: ActuatorCommand,
    rx_queue: BusQueue,
    flush_count: u32,
}

impl<B: RegisterBus> PlcHardware<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            outputs: ActuatorCommand::default(),
            rx_queue: BusQueue::new(),
            flush_count: 0,
        }
    }

    /// Push a received frame onto the reception queue. Hands the frame
    /// back when the queue is full.
    pub fn enqueue_bus_message(&mut self, message: BusMessage) -> Result<(), BusMessage> {
        self.rx_queue.enqueue(message)
    }

    pub fn flush_count(&self) -> u32 {
        self.flush_count
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    fn read_registers(&mut self) -> Result<SensorSnapshot, HardwareError> {
        Ok(SensorSnapshot {
            ignition_closed: self.bus.read_bool(IGNITION_INPUT)?,
            level_switch_closed: self.bus.read_bool(LEVEL_INPUT)?,
            temperature: self.bus.read_float(TEMPERATURE_INPUT)?,
            supply_voltage: self.bus.read_float(SUPPLY_VOLTAGE_INPUT)?,
        })
    }

    fn write_registers(&mut self) -> Result<(), HardwareError> {
        let image = [
            (PUMP_ENABLE_OUTPUT, RegisterValue::Switch(self.outputs.pump_enable)),
            (PUMP_IGNITION_OUTPUT, RegisterValue::Switch(self.outputs.pump_ignition)),
            (FAN_ENABLE_OUTPUT, RegisterValue::Switch(self.outputs.fan_enable)),
            (FAN_PWM_OUTPUT, RegisterValue::Duty(self.outputs.fan_power_percent)),
            (DISPLAY_OUTPUT, RegisterValue::Coolant(self.outputs.display.coolant_status)),
            (PUMP_PWM_OUTPUT, RegisterValue::Duty(self.outputs.pump_power_percent)),
        ];

        for (register, value) in image {
            self.bus.write(register, value)?;
        }
        Ok(())
    }
}

impl<B: RegisterBus> HardwareInterface for PlcHardware<B> {
    fn initialize(&mut self) -> Result<(), HardwareError> {
        self.read_registers().map(|_| ())
    }

    fn self_test(&mut self) -> Result<(), HardwareError> {
        self.read_registers()
            .map(|_| ())
            .map_err(|_| HardwareError::SelfTest("input register not responding"))
    }

    fn snapshot_inputs(&mut self) -> SensorSnapshot {
        match self.read_registers() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                // All-open snapshot trips every interlock.
                warn!("input read failed, reporting de-energised inputs: {}", e);
                SensorSnapshot::default()
            }
        }
    }

    fn current_outputs(&self) -> ActuatorCommand {
        self.outputs.clone()
    }

    fn commit_outputs(&mut self, command: ActuatorCommand) -> Result<(), HardwareError> {
        self.outputs = command.clamped();
        Ok(())
    }

    fn flush(&mut self) -> Result<(), HardwareError> {
        self.write_registers()?;
        self.flush_count = self.flush_count.wrapping_add(1);
        debug!("flushed output image #{}", self.flush_count);
        Ok(())
    }

    fn next_bus_message(&mut self) -> Option<BusMessage> {
        self.rx_queue.dequeue()
    }
}
