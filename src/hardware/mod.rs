//! Hardware access boundary.
//!
//! The supervisor never touches registers or bus frames directly. It reads a
//! [`SensorSnapshot`] once per cycle, writes complete [`ActuatorCommand`]s and
//! drains [`BusMessage`]s through the [`HardwareInterface`] trait.

pub mod plc;
pub mod simulated;

pub use plc::{NullRegisterBus, PlcHardware, RegisterBus};
pub use simulated::SimulatedHardware;

use arrayvec::ArrayString;
use core::fmt::{self, Write};
use serde::{Deserialize, Serialize};
use static_assertions::const_assert;
use thiserror::Error;

/// Maximum number of bytes in a display message.
pub const DISPLAY_MESSAGE_CAPACITY: usize = 255;
/// Data length of a single bus frame.
pub const BUS_MESSAGE_LEN: usize = 8;
/// Slots in the reception queue. One slot is kept free by the SPSC queue.
pub const BUS_QUEUE_CAPACITY: usize = 32;
pub const MAX_POWER_PERCENT: u8 = 100;

const_assert!(BUS_QUEUE_CAPACITY > 1);
const_assert!(DISPLAY_MESSAGE_CAPACITY <= u8::MAX as usize);

pub type DisplayMessage = ArrayString<DISPLAY_MESSAGE_CAPACITY>;
pub type BusQueue = heapless::spsc::Queue<BusMessage, BUS_QUEUE_CAPACITY>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HardwareError {
    #[error("self-test failed: {0}")]
    SelfTest(&'static str),
    #[error("input register {0} could not be read")]
    RegisterRead(u8),
    #[error("output register {0} could not be written")]
    RegisterWrite(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoolantStatus {
    /// Enough coolant in the loop to run.
    Sufficient,
    /// Level switch open, refill required.
    Dry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    pub coolant_status: CoolantStatus,
    pub message: DisplayMessage,
}

impl DisplayState {
    pub fn new(coolant_status: CoolantStatus, message: &str) -> Self {
        Self {
            coolant_status,
            message: bounded_message(message),
        }
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            coolant_status: CoolantStatus::Dry,
            message: DisplayMessage::new(),
        }
    }
}

/// Copy `text` into a display message, truncating at the last char
/// boundary that fits.
pub fn bounded_message(text: &str) -> DisplayMessage {
    let mut message = DisplayMessage::new();
    // Truncating writer never fails
    let _ = TruncatingWriter(&mut message).write_str(text);
    message
}

/// Format `value` straight into a display message, truncating like
/// [`bounded_message`].
pub fn formatted_message(value: &impl fmt::Display) -> DisplayMessage {
    let mut message = DisplayMessage::new();
    let _ = write!(TruncatingWriter(&mut message), "{}", value);
    message
}

struct TruncatingWriter<'a>(&'a mut DisplayMessage);

impl fmt::Write for TruncatingWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for ch in s.chars() {
            if self.0.try_push(ch).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Process values read from the input registers. Produced fresh every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub supply_voltage: f32,
    pub ignition_closed: bool,
    pub level_switch_closed: bool,
    pub temperature: f32,
}

/// Complete output image. Always committed as a whole.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActuatorCommand {
    pub fan_enable: bool,
    /// Fan duty cycle, 0-100.
    pub fan_power_percent: u8,
    pub pump_enable: bool,
    /// Pump ignition line pulled high.
    pub pump_ignition: bool,
    /// Pump duty cycle, 0-100.
    pub pump_power_percent: u8,
    pub display: DisplayState,
}

impl ActuatorCommand {
    /// Pump and fan switched off, display kept.
    pub fn de_energized(display: DisplayState) -> Self {
        Self {
            display,
            ..Self::default()
        }
    }

    pub fn is_de_energized(&self) -> bool {
        !self.fan_enable
            && !self.pump_enable
            && !self.pump_ignition
            && self.fan_power_percent == 0
            && self.pump_power_percent == 0
    }

    /// Clamp both duty cycles into 0-100.
    pub fn clamped(mut self) -> Self {
        self.fan_power_percent = self.fan_power_percent.min(MAX_POWER_PERCENT);
        self.pump_power_percent = self.pump_power_percent.min(MAX_POWER_PERCENT);
        self
    }
}

/// Raw frame pulled from the reception queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BusMessage {
    pub id: u16,
    pub dlc: u8,
    pub data: [u8; BUS_MESSAGE_LEN],
}

impl BusMessage {
    pub fn new(id: u16, payload: &[u8]) -> Self {
        let len = payload.len().min(BUS_MESSAGE_LEN);
        let mut data = [0u8; BUS_MESSAGE_LEN];
        data[..len].copy_from_slice(&payload[..len]);
        Self {
            id,
            dlc: len as u8,
            data,
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[..usize::from(self.dlc).min(BUS_MESSAGE_LEN)]
    }
}

/// Everything the supervisor needs from the hardware.
///
/// Implementations own the inputs, the output image and the reception queue
/// between cycles; the supervisor owns them for the duration of one step.
pub trait HardwareInterface {
    fn initialize(&mut self) -> Result<(), HardwareError> {
        Ok(())
    }

    /// Power-up checks run from the boot state.
    fn self_test(&mut self) -> Result<(), HardwareError> {
        Ok(())
    }

    /// Read every input once. Called once per cycle and trusted for the
    /// whole cycle.
    fn snapshot_inputs(&mut self) -> SensorSnapshot;

    /// Last committed output image.
    fn current_outputs(&self) -> ActuatorCommand;

    /// Replace the full output image. May only take physical effect on the
    /// following [`flush`](Self::flush).
    fn commit_outputs(&mut self, command: ActuatorCommand) -> Result<(), HardwareError>;

    fn flush(&mut self) -> Result<(), HardwareError>;

    /// Pop one pending frame, `None` once the queue is empty.
    fn next_bus_message(&mut self) -> Option<BusMessage>;
}

/// Test variant: replaces what the next `snapshot_inputs` returns.
pub trait InputInjection {
    fn inject_inputs(&mut self, snapshot: SensorSnapshot);
}
