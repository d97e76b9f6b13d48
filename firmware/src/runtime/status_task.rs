use embassy_time::Timer;

use crate::led::STATUS_REPORT_INTERVAL;
use crate::status;

#[embassy_executor::task]
pub async fn run() -> ! {
    loop {
        Timer::after(STATUS_REPORT_INTERVAL).await;
        let mirror = status::load();
        defmt::info!(
            "status: {=str} lit={=bool} locked={=bool} bits={=u32:#x}",
            mirror.phase.label(),
            mirror.lit,
            mirror.locked,
            mirror.pattern_bits
        );
        if let Some(bit) = mirror.bit {
            defmt::debug!("status: bit {=u8}", bit);
        }
    }
}
