use serde::{Deserialize, Serialize};

/// Pump and fan duty cycles requested by a feedback controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlOutput {
    pub fan_percent: u8,
    pub pump_percent: u8,
}

/// Temperature feedback. Called once per active cycle; must return promptly.
pub trait FeedbackController {
    fn initialize(&mut self) {}

    /// Map the measured temperature and the target setpoint to fan and
    /// pump duty cycles, both 0-100.
    fn compute(&mut self, temperature: f32, setpoint: f32) -> ControlOutput;
}

pub const DEFAULT_FIXED_PERCENT: u8 = 80;

/// Placeholder until a closed-loop algorithm is wired in: always requests
/// the same duty cycles.
#[derive(Debug, Clone, Copy)]
pub struct FixedOutputController {
    output: ControlOutput,
}

impl FixedOutputController {
    pub fn new(fan_percent: u8, pump_percent: u8) -> Self {
        Self {
            output: ControlOutput {
                fan_percent: fan_percent.min(100),
                pump_percent: pump_percent.min(100),
            },
        }
    }
}

impl Default for FixedOutputController {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_PERCENT, DEFAULT_FIXED_PERCENT)
    }
}

impl FeedbackController for FixedOutputController {
    fn compute(&mut self, _temperature: f32, _setpoint: f32) -> ControlOutput {
        self.output
    }
}
