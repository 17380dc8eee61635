//! Textual status sink.

use crate::hardware::ActuatorCommand;
use crate::state::SupervisorState;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFormat {
    Text,
    Json,
}

impl StatusFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(StatusFormat::Text),
            "json" => Some(StatusFormat::Json),
            _ => None,
        }
    }
}

/// Point-in-time view of the supervisor for operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub cycle: u64,
    pub state: SupervisorState,
    pub outputs: ActuatorCommand,
    pub last_trip: Option<String>,
    pub drained_messages: u64,
    pub faults_recorded: u32,
}

impl StatusReport {
    pub fn render(&self, format: StatusFormat) -> Result<String, serde_json::Error> {
        match format {
            StatusFormat::Text => Ok(self.to_string()),
            StatusFormat::Json => serde_json::to_string(self),
        }
    }
}

fn switch(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cycle={} state={} pump={}/{}% fan={}/{}% coolant={:?} display={:?}",
            self.cycle,
            self.state,
            switch(self.outputs.pump_enable),
            self.outputs.pump_power_percent,
            switch(self.outputs.fan_enable),
            self.outputs.fan_power_percent,
            self.outputs.display.coolant_status,
            self.outputs.display.message.as_str(),
        )?;
        if let Some(trip) = &self.last_trip {
            write!(f, " last_trip={:?}", trip)?;
        }
        write!(f, " faults={} drained={}", self.faults_recorded, self.drained_messages)
    }
}
