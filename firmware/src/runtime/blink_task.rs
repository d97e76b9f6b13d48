use embassy_futures::select::{Either, select};
use embassy_time::Timer;

use crate::led::{CommandReceiver, STEP_TICK};

use super::FirmwareController;

#[embassy_executor::task]
pub async fn run(mut controller: FirmwareController, receiver: CommandReceiver<'static>) -> ! {
    loop {
        // Wake early for commands so they land before the next step.
        if let Either::Second(command) = select(Timer::after(STEP_TICK), receiver.receive()).await
        {
            controller.handle(command);
            controller.drain(&receiver);
        }
        controller.tick();
    }
}
