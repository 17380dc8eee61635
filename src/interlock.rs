//! Safety interlocks checked before and during cooling.
//!
//! Guards run in a fixed order (supply voltage, coolant level, ignition
//! switch) and stop at the first failure, which alone determines the
//! diagnostic for the cycle.

use crate::config::Parameters;
use crate::hardware::SensorSnapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interlock {
    SupplyVoltage,
    CoolantLevel,
    IgnitionSwitch,
}

/// Evaluation order. The first failing guard wins.
pub const INTERLOCK_ORDER: [Interlock; 3] = [
    Interlock::SupplyVoltage,
    Interlock::CoolantLevel,
    Interlock::IgnitionSwitch,
];

/// A failed guard. The `Display` text is the operator diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Error)]
pub enum InterlockTrip {
    #[error("Supply voltage {measured:.2} V is less than the minimum of {minimum:.2} V.")]
    Undervoltage { measured: f32, minimum: f32 },
    #[error("Coolant levels are not sufficient.")]
    DryCoolant,
    #[error("Ignition disabled.")]
    IgnitionOpen,
}

impl InterlockTrip {
    pub fn interlock(&self) -> Interlock {
        match self {
            InterlockTrip::Undervoltage { .. } => Interlock::SupplyVoltage,
            InterlockTrip::DryCoolant => Interlock::CoolantLevel,
            InterlockTrip::IgnitionOpen => Interlock::IgnitionSwitch,
        }
    }
}

impl Interlock {
    pub fn check(self, params: &Parameters, snapshot: &SensorSnapshot) -> Result<(), InterlockTrip> {
        match self {
            Interlock::SupplyVoltage => {
                let measured = snapshot.supply_voltage;
                // NaN compares false, so it has to fail explicitly.
                if measured.is_nan() || measured < params.min_voltage() {
                    return Err(InterlockTrip::Undervoltage {
                        measured,
                        minimum: params.min_voltage(),
                    });
                }
            }
            Interlock::CoolantLevel => {
                if !snapshot.level_switch_closed {
                    return Err(InterlockTrip::DryCoolant);
                }
            }
            Interlock::IgnitionSwitch => {
                if !snapshot.ignition_closed {
                    return Err(InterlockTrip::IgnitionOpen);
                }
            }
        }
        Ok(())
    }
}

/// Run every guard in [`INTERLOCK_ORDER`], returning the first trip.
pub fn evaluate(params: &Parameters, snapshot: &SensorSnapshot) -> Result<(), InterlockTrip> {
    for interlock in INTERLOCK_ORDER {
        interlock.check(params, snapshot)?;
    }
    Ok(())
}
