use core::fmt;
use serde::{Deserialize, Serialize};

/// Supervisor states. The set is closed; every handler leaves the
/// supervisor in exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SupervisorState {
    /// Power-up self-test.
    Boot = 1,
    /// Unrecoverable error. No actuation, no way out.
    FatalError = 2,
    /// Waiting for ignition with actuators de-energised.
    Idle = 3,
    /// Pre-ignition interlock check and staged actuator start.
    Ignition = 4,
    /// Closed-loop cooling.
    Active = 5,
}

impl SupervisorState {
    pub const ALL: [SupervisorState; 5] = [
        SupervisorState::Boot,
        SupervisorState::FatalError,
        SupervisorState::Idle,
        SupervisorState::Ignition,
        SupervisorState::Active,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Decode a raw state tag. Returns `None` for anything outside the
    /// five defined values.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|state| state.tag() == tag)
    }

    pub fn name(self) -> &'static str {
        match self {
            SupervisorState::Boot => "BOOT",
            SupervisorState::FatalError => "FATAL_ERROR",
            SupervisorState::Idle => "IDLE",
            SupervisorState::Ignition => "IGNITION",
            SupervisorState::Active => "ACTIVE",
        }
    }

    /// Whether the handler for this state commits outputs.
    pub fn actuates(self) -> bool {
        matches!(
            self,
            SupervisorState::Idle | SupervisorState::Ignition | SupervisorState::Active
        )
    }
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
