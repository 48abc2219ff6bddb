//! Battery tester firmware for the STM32F103 tester board

#![allow(clippy::empty_loop)]
#![no_std]
#![no_main]

mod prelude;

use battery_tester::DefaultBatteryTester;
use cortex_m_rt::entry;
use panic_halt as _;
use rtt_target::{rprintln, rtt_init_print};

#[entry]
fn main() -> ! {
    rtt_init_print!();
    prelude::init();

    let mut board = tester_board_f103::build();
    let mut tester = DefaultBatteryTester::with_defaults();
    if let Err(error) = tester.load_settings(include_str!("../settings.json")) {
        rprintln!("keeping default settings: {}", error);
    }

    rprintln!("starting battery tester");
    tester.setup(&mut board);

    loop {
        tester.run_loop_iteration(&mut board);
    }
}
