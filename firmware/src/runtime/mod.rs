use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use speedtrap_core::config::DEFAULT_TRAP_CONFIG;
use speedtrap_core::control::SpeedTrap;

use crate::hw::{HardwareDisplay, HardwareLeds, HardwareTriggers};
use crate::tick;

mod measure_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

/// Control loop bound to the board's GPIO.
pub type BoardTrap =
    SpeedTrap<HardwareTriggers<'static>, HardwareDisplay<'static>, HardwareLeds<'static>>;

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = DEFAULT_TRAP_CONFIG;
    if let Err(err) = config.validate() {
        defmt::panic!("config: {}", err);
    }

    let hal::Peripherals {
        PA0,
        PA1,
        PA4,
        PA5,
        PA6,
        PA7,
        PA8,
        PA9,
        PA10,
        PA15,
        PB0,
        PB1,
        PB2,
        PB3,
        PB4,
        PB5,
        PB6,
        ..
    } = hal::init(hal::Config::default());

    let triggers = HardwareTriggers::new(
        Input::new(PA0, Pull::Up),
        Input::new(PA1, Pull::Up),
        config.polarity,
    );
    let display = HardwareDisplay::new(
        [
            Output::new(PB0, Level::Low, Speed::Low),
            Output::new(PB1, Level::Low, Speed::Low),
            Output::new(PB2, Level::Low, Speed::Low),
            Output::new(PB3, Level::Low, Speed::Low),
            Output::new(PB4, Level::Low, Speed::Low),
            Output::new(PB5, Level::Low, Speed::Low),
            Output::new(PB6, Level::Low, Speed::Low),
        ],
        [
            Output::new(PA8, Level::High, Speed::Low),
            Output::new(PA9, Level::High, Speed::Low),
            Output::new(PA10, Level::High, Speed::Low),
            Output::new(PA15, Level::High, Speed::Low),
        ],
    );
    let leds = HardwareLeds::new([
        Output::new(PA4, Level::Low, Speed::Low),
        Output::new(PA5, Level::Low, Speed::Low),
        Output::new(PA6, Level::Low, Speed::Low),
        Output::new(PA7, Level::Low, Speed::Low),
    ]);

    let trap: BoardTrap = SpeedTrap::new(config, triggers, display, leds);

    let core_peripherals =
        cortex_m::Peripherals::take().expect("core peripherals taken more than once");
    tick::start(core_peripherals.SYST);

    defmt::info!(
        "speedtrap: ready, strips {} m apart, pacing {} ms, dwell {} ms",
        config.distance_m,
        config.loop_pacing_ms,
        config.digit_dwell.as_millis()
    );

    spawner
        .spawn(measure_task::run(trap))
        .expect("failed to spawn measurement task");

    core::future::pending::<()>().await;
}
