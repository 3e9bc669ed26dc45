//! Panic reporting for the MCU target.

use core::panic::PanicInfo;

#[panic_handler]
fn on_panic(info: &PanicInfo) -> ! {
    defmt::error!("speedtrap: panic: {}", defmt::Display2Format(info));
    cortex_m::asm::udf();
}
