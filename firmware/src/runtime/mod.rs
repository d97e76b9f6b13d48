use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::gpio::Flex;

use blinker_core::demo::DEMO_BOOT_PATTERN;
use blinker_core::line::ActivePolarity;
use blinker_core::player::PatternPlayer;

use crate::hw::{self, GpioLine};
use crate::led::{self, CommandQueue, LedController};

mod blink_task;
mod demo_task;
mod status_task;

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

pub(super) static COMMAND_QUEUE: CommandQueue = CommandQueue::new();

/// Controller type owned by the blink task.
pub(super) type FirmwareController = LedController<GpioLine<'static>, fn() -> u32>;

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals { PA5, .. } = hal::init(config);

    let line = GpioLine::new(Flex::new(PA5));
    let clock: fn() -> u32 = hw::now_ms;
    let player = PatternPlayer::new(line, ActivePolarity::ActiveHigh, clock);
    let mut controller: FirmwareController = LedController::new(player);
    controller.handle(led::pattern_command(DEMO_BOOT_PATTERN));

    spawner
        .spawn(blink_task::run(controller, COMMAND_QUEUE.receiver()))
        .expect("failed to spawn blink task");
    spawner
        .spawn(demo_task::run(COMMAND_QUEUE.sender()))
        .expect("failed to spawn demo task");
    spawner
        .spawn(status_task::run())
        .expect("failed to spawn status task");

    core::future::pending::<()>().await;
}
