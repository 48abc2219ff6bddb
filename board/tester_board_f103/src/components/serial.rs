use core::cell::RefCell;
use core::ops::DerefMut;

use cortex_m::interrupt::Mutex;
use rtt_target::rprintln;
use stm32f1xx_hal::afio::MAPR;
use stm32f1xx_hal::pac::{self, USART2};
use stm32f1xx_hal::prelude::*;
use stm32f1xx_hal::rcc::Clocks;
use stm32f1xx_hal::serial::{Config, Serial, Tx};

use crate::pins::SerialPins;

pub static TX: Mutex<RefCell<Option<Tx<pac::USART2>>>> = Mutex::new(RefCell::new(None));

pub fn setup_serial(pins: SerialPins, mapr: &mut MAPR, usart: USART2, clocks: &Clocks) {
    rprintln!("initializing serial");
    let serial = Serial::new(
        usart,
        (pins.tx, pins.rx),
        mapr,
        Config::default().baudrate(115200.bps()),
        clocks,
    );
    let (tx, _rx) = serial.split();

    cortex_m::interrupt::free(|cs| {
        TX.borrow(cs).replace(Some(tx));
    });
}

pub fn send(string: &str) {
    cortex_m::interrupt::free(|cs| {
        let t = TX.borrow(cs);
        if let Some(tx) = t.borrow_mut().deref_mut() {
            for byte in string.as_bytes().iter() {
                _ = nb::block!(tx.write(*byte));
            }
        }
    });
}
