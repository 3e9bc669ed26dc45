//! Control-loop task driving the board from the SysTick clock.

use embassy_time::Delay;
use speedtrap_core::capture::CaptureState;
use speedtrap_core::engine::{CaptureReport, MeasurementOutcome};

use super::BoardTrap;
use crate::tick::MILLIS;

/// Runs the blocking control loop forever.
///
/// Display dwell and loop pacing busy-wait on [`Delay`], so this task never
/// yields; it is the only task the executor hosts.
#[embassy_executor::task]
#[allow(clippy::unused_async)]
pub async fn run(mut trap: BoardTrap) {
    let mut delay = Delay;
    let mut was_armed = false;

    loop {
        let report = trap.run_iteration(&MILLIS, &mut delay);

        let state = trap.engine().capture_state();
        if let CaptureState::Armed { started_at } = state
            && !was_armed
        {
            defmt::debug!("capture: armed at {}", started_at);
        }
        was_armed = state.is_armed();

        if let Some(report) = report {
            log_capture(&report);
        }
    }
}

fn log_capture(report: &CaptureReport) {
    match report.outcome {
        MeasurementOutcome::Valid {
            speed_kmh,
            display_value,
        } => defmt::info!(
            "capture: #{} {} ms -> {} km/h (shows {})",
            report.counter.value(),
            report.elapsed_ms,
            speed_kmh,
            display_value
        ),
        MeasurementOutcome::ZeroElapsed => defmt::warn!(
            "capture: #{} both strips in the same millisecond, display blanked",
            report.counter.value()
        ),
        MeasurementOutcome::CounterWrapped => defmt::info!(
            "capture: counter wrapped after {} ms, display blanked",
            report.elapsed_ms
        ),
    }
}
