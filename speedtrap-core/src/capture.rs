//! Two-strip capture state machine.
//!
//! An entry edge arms the machine and stamps the start time; the next exit
//! edge closes the capture and reports the elapsed milliseconds. Entry edges
//! seen while armed are ignored, so the measurement always runs from the
//! first entry edge. Exit edges seen while idle have no session to close.

use crate::clock::Millis;
use crate::trigger::TriggerEdges;

/// Capture lifecycle.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureState {
    /// Waiting for an entry edge.
    #[default]
    Idle,
    /// Entry edge seen, waiting for the exit edge.
    Armed { started_at: Millis },
}

impl CaptureState {
    #[must_use]
    pub const fn is_armed(self) -> bool {
        matches!(self, CaptureState::Armed { .. })
    }
}

/// Completed capture emitted when the exit edge closes an armed session.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureCompleted {
    pub started_at: Millis,
    pub finished_at: Millis,
    pub elapsed_ms: u32,
}

/// Tracks the pending capture session, if any.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureMachine {
    state: CaptureState,
}

impl CaptureMachine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: CaptureState::Idle,
        }
    }

    #[must_use]
    pub const fn state(&self) -> CaptureState {
        self.state
    }

    /// Applies one iteration's edges observed at `now`.
    ///
    /// The entry edge is evaluated before the exit edge, so both edges in the
    /// same iteration complete a capture with zero elapsed time.
    pub fn step(&mut self, edges: TriggerEdges, now: Millis) -> Option<CaptureCompleted> {
        if edges.first_fell && self.state == CaptureState::Idle {
            self.state = CaptureState::Armed { started_at: now };
        }

        match self.state {
            CaptureState::Armed { started_at } if edges.second_fell => {
                self.state = CaptureState::Idle;
                Some(CaptureCompleted {
                    started_at,
                    finished_at: now,
                    elapsed_ms: now.elapsed_since(started_at),
                })
            }
            _ => None,
        }
    }
}
