//! Offline replay of recorded strip timestamps.
//!
//! Each `(entry, exit)` pair becomes a press and release of the entry strip at
//! `entry` followed by the same on the exit strip at `exit`, fed straight into
//! the measurement engine with a simulated clock.

use speedtrap_core::clock::MonotonicClock;
use speedtrap_core::config::TrapConfig;
use speedtrap_core::engine::{CaptureReport, MeasurementEngine, MeasurementOutcome};
use speedtrap_core::sim::ManualClock;
use speedtrap_core::trigger::TriggerSample;

/// One recorded pass over both strips, in milliseconds.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Pass {
    pub entry_ms: u32,
    pub exit_ms: u32,
}

/// Groups a flat timestamp list into passes.
///
/// # Errors
///
/// Rejects values that are not `u32` milliseconds, lists of odd length, and
/// timestamps that go backwards: an exit before its entry, or an entry before
/// the previous pass's exit.
pub fn parse_passes<S: AsRef<str>>(values: &[S]) -> Result<Vec<Pass>, String> {
    if values.is_empty() {
        return Err("Expected at least one <entry> <exit> pair after --replay".to_string());
    }
    if values.len() % 2 != 0 {
        return Err(format!(
            "Timestamps come in <entry> <exit> pairs, got {} values",
            values.len()
        ));
    }

    let timestamps = values
        .iter()
        .map(|value| {
            let value = value.as_ref();
            value
                .parse::<u32>()
                .map_err(|_| format!("Invalid timestamp `{value}`, expected milliseconds"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let passes: Vec<Pass> = timestamps
        .chunks_exact(2)
        .map(|pair| Pass {
            entry_ms: pair[0],
            exit_ms: pair[1],
        })
        .collect();

    let mut previous_exit = 0;
    for (index, pass) in passes.iter().enumerate() {
        if pass.exit_ms < pass.entry_ms {
            return Err(format!(
                "Pass {}: exit {} ms is before entry {} ms",
                index + 1,
                pass.exit_ms,
                pass.entry_ms
            ));
        }
        if pass.entry_ms < previous_exit {
            return Err(format!(
                "Pass {}: entry {} ms is before the previous exit {} ms",
                index + 1,
                pass.entry_ms,
                previous_exit
            ));
        }
        previous_exit = pass.exit_ms;
    }

    Ok(passes)
}

/// Runs every pass through a fresh engine and returns the completed captures.
#[must_use]
pub fn replay(config: &TrapConfig, passes: &[Pass]) -> Vec<CaptureReport> {
    let clock = ManualClock::new();
    let mut engine = MeasurementEngine::new(config);
    let mut reports = Vec::new();

    for pass in passes {
        for (at, sample) in [
            (pass.entry_ms, TriggerSample::new(true, false)),
            (pass.exit_ms, TriggerSample::new(false, true)),
        ] {
            clock.set_ms(at);
            reports.extend(engine.tick(sample, clock.now()));
            reports.extend(engine.tick(TriggerSample::RELEASED, clock.now()));
        }
    }

    reports
}

/// Single-line summary of a capture.
#[must_use]
pub fn describe(report: &CaptureReport) -> String {
    let head = format!(
        "capture #{} at {}: {} ms",
        report.counter, report.finished_at, report.elapsed_ms
    );
    match report.outcome {
        MeasurementOutcome::Valid {
            speed_kmh,
            display_value,
        } => format!("{head} -> {speed_kmh:.2} km/h, display {display_value:04}"),
        MeasurementOutcome::ZeroElapsed => format!("{head} -> no interval, display blank"),
        MeasurementOutcome::CounterWrapped => format!("{head} -> counter wrapped, display blank"),
    }
}
