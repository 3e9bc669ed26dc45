//! Measurement engine owning all control-loop state.
//!
//! [`MeasurementEngine::tick`] turns one trigger sample into edges, advances
//! the capture machine and, when a capture completes, updates the event
//! counter, validity flag and display buffer in a single step.

use heapless::HistoryBuf as HistoryBuffer;

use crate::capture::{CaptureMachine, CaptureState};
use crate::clock::Millis;
use crate::config::TrapConfig;
use crate::display::{DisplayBuffer, DisplayFrame};
use crate::indicator::EventCounter;
use crate::speed::{SpeedError, display_value, speed_kmh};
use crate::trigger::{TriggerEdges, TriggerSample, TriggerSampler};

/// Number of recent captures retained for inspection.
pub const CAPTURE_HISTORY_CAPACITY: usize = 16;

/// Speed currently shown (or suppressed) on the display.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeasurementResult {
    pub speed_kmh: f32,
    pub display_value: u16,
    pub valid: bool,
}

impl MeasurementResult {
    /// No measurement to show.
    pub const INVALID: Self = Self {
        speed_kmh: 0.0,
        display_value: 0,
        valid: false,
    };
}

/// What a completed capture did to the display.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeasurementOutcome {
    /// Speed computed and shown.
    Valid { speed_kmh: f32, display_value: u16 },
    /// Both strips fired in the same millisecond; display blanked.
    ZeroElapsed,
    /// Counter rolled over to zero; display blanked.
    CounterWrapped,
}

impl MeasurementOutcome {
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, MeasurementOutcome::Valid { .. })
    }
}

/// Summary of one completed capture.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureReport {
    pub finished_at: Millis,
    pub elapsed_ms: u32,
    pub counter: EventCounter,
    pub outcome: MeasurementOutcome,
}

/// All state the control loop carries between iterations.
pub struct MeasurementEngine {
    distance_m: f32,
    sampler: TriggerSampler,
    capture: CaptureMachine,
    counter: EventCounter,
    result: MeasurementResult,
    buffer: DisplayBuffer,
    history: HistoryBuffer<CaptureReport, CAPTURE_HISTORY_CAPACITY>,
}

impl MeasurementEngine {
    #[must_use]
    pub const fn new(config: &TrapConfig) -> Self {
        Self {
            distance_m: config.distance_m,
            sampler: TriggerSampler::new(),
            capture: CaptureMachine::new(),
            counter: EventCounter::new(),
            result: MeasurementResult::INVALID,
            buffer: DisplayBuffer::cleared(),
            history: HistoryBuffer::new(),
        }
    }

    /// Processes one loop iteration's trigger sample taken at `now`.
    pub fn tick(&mut self, sample: TriggerSample, now: Millis) -> Option<CaptureReport> {
        let edges = self.sampler.update(sample);
        self.apply_edges(edges, now)
    }

    /// Advances the capture machine with already-detected edges.
    pub fn apply_edges(&mut self, edges: TriggerEdges, now: Millis) -> Option<CaptureReport> {
        let completed = self.capture.step(edges, now)?;
        let report = self.complete_capture(completed.elapsed_ms, completed.finished_at);
        self.history.write(report);
        Some(report)
    }

    fn complete_capture(&mut self, elapsed_ms: u32, finished_at: Millis) -> CaptureReport {
        self.counter.advance();

        let outcome = if self.counter.is_zero() {
            MeasurementOutcome::CounterWrapped
        } else {
            match speed_kmh(elapsed_ms, self.distance_m) {
                Ok(speed) => MeasurementOutcome::Valid {
                    speed_kmh: speed,
                    display_value: display_value(speed),
                },
                Err(SpeedError::ZeroElapsed) => MeasurementOutcome::ZeroElapsed,
            }
        };

        match outcome {
            MeasurementOutcome::Valid {
                speed_kmh,
                display_value,
            } => {
                self.result = MeasurementResult {
                    speed_kmh,
                    display_value,
                    valid: true,
                };
                self.buffer = DisplayBuffer::from_value(display_value);
            }
            MeasurementOutcome::ZeroElapsed | MeasurementOutcome::CounterWrapped => {
                self.result = MeasurementResult::INVALID;
                self.buffer = DisplayBuffer::cleared();
            }
        }

        CaptureReport {
            finished_at,
            elapsed_ms,
            counter: self.counter,
            outcome,
        }
    }

    #[must_use]
    pub const fn counter(&self) -> EventCounter {
        self.counter
    }

    #[must_use]
    pub const fn result(&self) -> MeasurementResult {
        self.result
    }

    #[must_use]
    pub const fn buffer(&self) -> &DisplayBuffer {
        &self.buffer
    }

    #[must_use]
    pub const fn capture_state(&self) -> CaptureState {
        self.capture.state()
    }

    /// Frame to strobe for the current measurement.
    #[must_use]
    pub fn frame(&self) -> DisplayFrame {
        DisplayFrame::compose(&self.buffer, self.result.valid)
    }

    /// Recent captures, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &CaptureReport> + '_ {
        self.history.oldest_ordered()
    }

    /// Most recent capture, if any.
    #[must_use]
    pub fn last_capture(&self) -> Option<&CaptureReport> {
        self.history.recent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TRAP_CONFIG;
    use crate::display::Digit;

    const ENTRY: TriggerSample = TriggerSample::new(true, false);
    const EXIT: TriggerSample = TriggerSample::new(false, true);

    fn pass(
        engine: &mut MeasurementEngine,
        start_ms: u32,
        elapsed_ms: u32,
    ) -> Option<CaptureReport> {
        engine.tick(ENTRY, Millis::new(start_ms));
        engine.tick(TriggerSample::RELEASED, Millis::new(start_ms + 1));
        let report = engine.tick(EXIT, Millis::new(start_ms + elapsed_ms));
        engine.tick(TriggerSample::RELEASED, Millis::new(start_ms + elapsed_ms + 1));
        report
    }

    #[test]
    fn starts_without_a_measurement() {
        let engine = MeasurementEngine::new(&DEFAULT_TRAP_CONFIG);
        assert_eq!(engine.counter().value(), 0);
        assert!(!engine.result().valid);
        assert_eq!(engine.frame(), DisplayFrame::BLANK);
        assert_eq!(engine.capture_state(), CaptureState::Idle);
        assert!(engine.last_capture().is_none());
    }

    #[test]
    fn reference_pass_shows_four() {
        let mut engine = MeasurementEngine::new(&DEFAULT_TRAP_CONFIG);
        let report = pass(&mut engine, 0, 600).expect("capture completes");

        assert_eq!(report.elapsed_ms, 600);
        assert_eq!(report.counter.value(), 1);
        assert!(report.outcome.is_valid());
        assert_eq!(engine.result().display_value, 4);
        assert!(engine.result().valid);
        assert_eq!(engine.buffer().digits().map(Digit::value), [4, 0, 0, 0]);
    }

    #[test]
    fn held_entry_strip_does_not_rearm() {
        let mut engine = MeasurementEngine::new(&DEFAULT_TRAP_CONFIG);
        engine.tick(ENTRY, Millis::new(0));
        engine.tick(TriggerSample::RELEASED, Millis::new(50));
        engine.tick(ENTRY, Millis::new(100));
        let report = engine
            .tick(EXIT, Millis::new(600))
            .expect("capture completes");
        assert_eq!(report.elapsed_ms, 600);
    }

    #[test]
    fn zero_elapsed_blanks_display_but_counts() {
        let mut engine = MeasurementEngine::new(&DEFAULT_TRAP_CONFIG);
        pass(&mut engine, 0, 300);
        assert!(engine.result().valid);

        let report = engine
            .tick(TriggerSample::new(true, true), Millis::new(2_000))
            .expect("capture completes");
        assert_eq!(report.outcome, MeasurementOutcome::ZeroElapsed);
        assert_eq!(report.counter.value(), 2);
        assert!(!engine.result().valid);
        assert_eq!(*engine.buffer(), DisplayBuffer::cleared());
    }

    #[test]
    fn sixteenth_capture_wraps_and_invalidates() {
        let mut engine = MeasurementEngine::new(&DEFAULT_TRAP_CONFIG);
        for cycle in 1..=15_u8 {
            let report = pass(&mut engine, u32::from(cycle) * 10_000, 600).expect("completes");
            assert_eq!(report.counter.value(), cycle);
            assert!(engine.result().valid);
        }

        let report = pass(&mut engine, 200_000, 600).expect("completes");
        assert_eq!(report.counter.value(), 0);
        assert_eq!(report.outcome, MeasurementOutcome::CounterWrapped);
        assert!(!engine.result().valid);
        assert_eq!(engine.buffer().value(), 0);
        assert_eq!(engine.history().count(), CAPTURE_HISTORY_CAPACITY);
    }
}
