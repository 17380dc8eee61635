use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} is not a number: {value:?}")]
    Malformed { name: &'static str, value: String },
    #[error("{name} must be a finite value, got {value}")]
    NotFinite { name: &'static str, value: f32 },
    #[error("minimum supply voltage must not be negative, got {0}")]
    NegativeVoltage(f32),
}

/// Immutable configuration captured when the supervisor is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Lowest supply voltage tolerated while the pump and fan are running.
    min_voltage: f32,
    /// Target temperature handed to the feedback controller.
    temperature_setpoint: f32,
}

impl Parameters {
    pub fn new(min_voltage: f32, temperature_setpoint: f32) -> Result<Self, ConfigError> {
        if !min_voltage.is_finite() {
            return Err(ConfigError::NotFinite { name: "MIN_VOLTAGE", value: min_voltage });
        }
        if !temperature_setpoint.is_finite() {
            return Err(ConfigError::NotFinite {
                name: "TEMP_SETPOINT",
                value: temperature_setpoint,
            });
        }
        if min_voltage < 0.0 {
            return Err(ConfigError::NegativeVoltage(min_voltage));
        }

        Ok(Self { min_voltage, temperature_setpoint })
    }

    /// Parse the two positional command line values.
    pub fn parse(min_voltage: &str, temperature_setpoint: &str) -> Result<Self, ConfigError> {
        let min_voltage = parse_value("MIN_VOLTAGE", min_voltage)?;
        let temperature_setpoint = parse_value("TEMP_SETPOINT", temperature_setpoint)?;
        Self::new(min_voltage, temperature_setpoint)
    }

    pub fn min_voltage(&self) -> f32 {
        self.min_voltage
    }

    pub fn temperature_setpoint(&self) -> f32 {
        self.temperature_setpoint
    }
}

fn parse_value(name: &'static str, raw: &str) -> Result<f32, ConfigError> {
    raw.trim().parse::<f32>().map_err(|_| ConfigError::Malformed {
        name,
        value: raw.to_string(),
    })
}
