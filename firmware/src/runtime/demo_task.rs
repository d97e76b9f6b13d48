use blinker_core::demo::{DEMO_STEPS, DemoSchedule};
use embassy_time::Timer;

use crate::hw;
use crate::led::{self, CommandSender, DEMO_POLL_INTERVAL};

#[embassy_executor::task]
pub async fn run(sender: CommandSender<'static>) -> ! {
    let mut schedule = DemoSchedule::new(hw::now_ms());
    loop {
        if let Some(pattern) = schedule.poll(hw::now_ms()) {
            defmt::info!(
                "demo: step {=usize}/{=usize}",
                schedule.step() + 1,
                DEMO_STEPS.len()
            );
            sender.send(led::pattern_command(pattern)).await;
        }
        Timer::after(DEMO_POLL_INTERVAL).await;
    }
}
