use crate::interlock::InterlockTrip;
use crate::state::SupervisorState;
use heapless::Vec;
use serde::{Deserialize, Serialize};

const MAX_FAULT_HISTORY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FaultKind {
    Interlock(InterlockTrip),
    SelfTestFailed,
    /// Raw state tag outside the defined set.
    InvalidState(u8),
    OutputWriteFailed,
}

impl FaultKind {
    /// Faults that leave the supervisor in `FatalError`.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FaultKind::SelfTestFailed | FaultKind::InvalidState(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultRecord {
    pub id: u32,
    pub kind: FaultKind,
    /// State the supervisor was in when the fault was detected.
    pub state: SupervisorState,
    pub cycle: u64,
}

#[derive(Debug)]
pub struct FaultLog {
    history: Vec<FaultRecord, MAX_FAULT_HISTORY>,
    next_fault_id: u32,
}

impl FaultLog {
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            next_fault_id: 1,
        }
    }

    pub fn record(&mut self, kind: FaultKind, state: SupervisorState, cycle: u64) -> u32 {
        let fault_id = self.next_fault_id;
        self.next_fault_id = self.next_fault_id.wrapping_add(1);

        if self.history.is_full() {
            self.history.remove(0);
        }

        let _ = self.history.push(FaultRecord {
            id: fault_id,
            kind,
            state,
            cycle,
        });
        fault_id
    }

    pub fn history(&self) -> &[FaultRecord] {
        &self.history
    }

    pub fn latest(&self) -> Option<&FaultRecord> {
        self.history.last()
    }

    /// Total faults recorded, including evicted ones.
    pub fn total_recorded(&self) -> u32 {
        self.next_fault_id.wrapping_sub(1)
    }

    pub fn fatal_faults(&self) -> impl Iterator<Item = &FaultRecord> {
        self.history.iter().filter(|f| f.kind.is_fatal())
    }
}

impl Default for FaultLog {
    fn default() -> Self {
        Self::new()
    }
}
