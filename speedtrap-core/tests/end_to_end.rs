use speedtrap_core::clock::Millis;
use speedtrap_core::config::{DEFAULT_TRAP_CONFIG, TrapConfig};
use speedtrap_core::control::SpeedTrap;
use speedtrap_core::display::{Digit, DigitPosition, Glyph, Segments};
use speedtrap_core::engine::{MeasurementEngine, MeasurementOutcome};
use speedtrap_core::sim::{CapturedDisplay, CapturedLeds, ManualClock, ScriptedTriggers, SimDelay};
use speedtrap_core::trigger::{TriggerId, TriggerSample};

type SimTrap = SpeedTrap<ScriptedTriggers, CapturedDisplay, CapturedLeds>;

fn sim_trap(config: TrapConfig) -> SimTrap {
    SpeedTrap::new(
        config,
        ScriptedTriggers::new(),
        CapturedDisplay::new(),
        CapturedLeds::new(),
    )
}

/// Runs iterations until `clock` reaches `until_ms`.
fn run_until(trap: &mut SimTrap, clock: &ManualClock, until_ms: u32) {
    let mut delay = SimDelay::new(clock);
    while clock.now_ms() < until_ms {
        trap.run_iteration(clock, &mut delay);
    }
}

fn digit(value: u8) -> Segments {
    Glyph::Digit(Digit::new(value).expect("decimal digit")).segments()
}

#[test]
fn reference_pass_through_the_control_loop() {
    let clock = ManualClock::new();
    let mut trap = sim_trap(DEFAULT_TRAP_CONFIG);

    // Vehicle hits the entry strip and stays on it for a while.
    trap.inputs_mut().set(TriggerId::First, true);
    run_until(&mut trap, &clock, 40);
    trap.inputs_mut().release_all();
    assert!(trap.engine().capture_state().is_armed());

    run_until(&mut trap, &clock, 600);
    trap.inputs_mut().set(TriggerId::Second, true);
    run_until(&mut trap, &clock, 650);
    trap.inputs_mut().release_all();
    run_until(&mut trap, &clock, 700);

    let report = *trap.engine().last_capture().expect("capture completed");
    // Samples are quantised to the 13 ms iteration, both offset by the same refresh.
    assert_eq!(report.elapsed_ms, 611);
    assert_eq!(report.counter.value(), 1);
    assert!(report.outcome.is_valid());
    assert_eq!(trap.engine().result().display_value, 4);
    assert_eq!(trap.leds().states(), [true, false, false, false]);

    assert_eq!(trap.display().shown(DigitPosition::Ones), digit(4));
    assert_eq!(trap.display().shown(DigitPosition::Tens), digit(0));
    assert_eq!(trap.display().shown(DigitPosition::Hundreds), digit(0));
    assert_eq!(trap.display().shown(DigitPosition::Thousands), digit(0));
}

#[test]
fn exact_timestamps_through_the_engine() {
    let mut engine = MeasurementEngine::new(&DEFAULT_TRAP_CONFIG);
    assert!(engine.tick(TriggerSample::new(true, false), Millis::new(0)).is_none());
    let report = engine
        .tick(TriggerSample::new(false, true), Millis::new(600))
        .expect("capture completes");

    assert_eq!(report.elapsed_ms, 600);
    match report.outcome {
        MeasurementOutcome::Valid {
            speed_kmh,
            display_value,
        } => {
            assert!(speed_kmh > 3.599 && speed_kmh < 3.601, "speed {speed_kmh}");
            assert_eq!(display_value, 4);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(engine.buffer().digits().map(Digit::value), [4, 0, 0, 0]);
    assert_eq!(engine.counter().value(), 1);
    assert!(engine.result().valid);
}

#[test]
fn second_entry_edge_while_armed_keeps_first_timestamp() {
    let mut engine = MeasurementEngine::new(&DEFAULT_TRAP_CONFIG);
    engine.tick(TriggerSample::new(true, false), Millis::new(1_000));
    engine.tick(TriggerSample::RELEASED, Millis::new(1_005));
    engine.tick(TriggerSample::new(true, false), Millis::new(1_100));
    engine.tick(TriggerSample::RELEASED, Millis::new(1_105));
    let report = engine
        .tick(TriggerSample::new(false, true), Millis::new(1_400))
        .expect("capture completes");
    assert_eq!(report.elapsed_ms, 400);
}

#[test]
fn sixteen_cycles_wrap_the_counter_and_blank_the_display() {
    let clock = ManualClock::new();
    let mut trap = sim_trap(DEFAULT_TRAP_CONFIG);
    let mut seen = Vec::new();

    for cycle in 0..16_u32 {
        let base = cycle * 1_000;
        trap.inputs_mut().set(TriggerId::First, true);
        run_until(&mut trap, &clock, base + 20);
        trap.inputs_mut().release_all();
        run_until(&mut trap, &clock, base + 300);
        trap.inputs_mut().set(TriggerId::Second, true);
        run_until(&mut trap, &clock, base + 320);
        trap.inputs_mut().release_all();
        run_until(&mut trap, &clock, base + 1_000);

        let report = trap.engine().last_capture().expect("capture completed");
        seen.push(report.counter.value());
        assert_eq!(trap.leds().value(), report.counter.value());
    }

    let expected: Vec<u8> = (1..=15).chain(core::iter::once(0)).collect();
    assert_eq!(seen, expected);

    let last = trap.engine().last_capture().expect("capture completed");
    assert_eq!(last.outcome, MeasurementOutcome::CounterWrapped);
    assert!(!trap.engine().result().valid);
    assert_eq!(trap.engine().buffer().value(), 0);
    assert_eq!(trap.display().shown_all(), [Segments::BLANK; 4]);
    assert_eq!(trap.leds().states(), [false; 4]);
}

#[test]
fn fast_pass_clamps_to_display_range() {
    // 50 m spacing over a single millisecond is 180 000 km/h.
    let config = TrapConfig {
        distance_m: 50.0,
        ..DEFAULT_TRAP_CONFIG
    };
    let mut engine = MeasurementEngine::new(&config);
    engine.tick(TriggerSample::new(true, false), Millis::new(10));
    let report = engine
        .tick(TriggerSample::new(false, true), Millis::new(11))
        .expect("capture completes");
    assert_eq!(report.elapsed_ms, 1);
    assert_eq!(engine.result().display_value, 9_999);
    assert_eq!(engine.buffer().digits().map(Digit::value), [9, 9, 9, 9]);
}

#[test]
fn capture_across_clock_wrap() {
    let clock = ManualClock::starting_at(u32::MAX - 100);
    let mut trap = sim_trap(DEFAULT_TRAP_CONFIG);
    let mut delay = SimDelay::new(&clock);

    trap.inputs_mut().set(TriggerId::First, true);
    trap.run_iteration(&clock, &mut delay);
    trap.inputs_mut().release_all();
    for _ in 0..20 {
        trap.run_iteration(&clock, &mut delay);
    }
    trap.inputs_mut().set(TriggerId::Second, true);
    let report = trap
        .run_iteration(&clock, &mut delay)
        .expect("capture completes");
    assert_eq!(report.elapsed_ms, 21 * 13);
}
