//! Cooperative control loop binding the engine to hardware drivers.
//!
//! One iteration refreshes the display, samples both trigger lines, advances
//! the [`MeasurementEngine`], refreshes the indicator LEDs after a completed
//! capture and finally sleeps the pacing delay. Both the refresh dwell and the
//! pacing delay are busy-waits on the injected [`DelayNs`].

use embedded_hal::delay::DelayNs;

use crate::clock::MonotonicClock;
use crate::config::TrapConfig;
use crate::display::{DisplayDriver, render_frame};
use crate::engine::{CaptureReport, MeasurementEngine};
use crate::indicator::{IndicatorDriver, show_counter};
use crate::trigger::TriggerInputs;

/// Speed trap control loop over trigger inputs `I`, display `D` and LEDs `L`.
pub struct SpeedTrap<I, D, L> {
    config: TrapConfig,
    engine: MeasurementEngine,
    inputs: I,
    display: D,
    leds: L,
}

impl<I, D, L> SpeedTrap<I, D, L>
where
    I: TriggerInputs,
    D: DisplayDriver,
    L: IndicatorDriver,
{
    /// Builds the loop and puts every output into its idle state.
    pub fn new(config: TrapConfig, inputs: I, mut display: D, mut leds: L) -> Self {
        let engine = MeasurementEngine::new(&config);
        display.deselect_all();
        show_counter(engine.counter(), &mut leds);
        Self {
            config,
            engine,
            inputs,
            display,
            leds,
        }
    }

    /// Runs one full loop iteration.
    pub fn run_iteration<C, W>(&mut self, clock: &C, delay: &mut W) -> Option<CaptureReport>
    where
        C: MonotonicClock + ?Sized,
        W: DelayNs + ?Sized,
    {
        let frame = self.engine.frame();
        render_frame(&frame, &mut self.display, delay, self.config.digit_dwell);

        let sample = self.inputs.sample();
        let report = self.engine.tick(sample, clock.now());
        if let Some(report) = &report {
            show_counter(report.counter, &mut self.leds);
        }

        delay.delay_ms(self.config.loop_pacing_ms);
        report
    }

    #[must_use]
    pub const fn engine(&self) -> &MeasurementEngine {
        &self.engine
    }

    pub fn inputs_mut(&mut self) -> &mut I {
        &mut self.inputs
    }

    #[must_use]
    pub const fn display(&self) -> &D {
        &self.display
    }

    #[must_use]
    pub const fn leds(&self) -> &L {
        &self.leds
    }
}
