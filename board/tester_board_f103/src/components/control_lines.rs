use rtt_target::rprintln;

use crate::pins::{ControlLinePins, MultiplexerPins};

pub struct ControlLines {
    pins: ControlLinePins,
}

impl ControlLines {
    pub fn new(pins: ControlLinePins) -> Self {
        let mut lines = ControlLines { pins };
        lines.release_all();
        lines
    }

    pub fn release_all(&mut self) {
        for pin in self.pins.charge.iter_mut() {
            pin.set_low();
        }
        for pin in self.pins.discharge.iter_mut() {
            pin.set_low();
        }
    }

    pub fn write_charge(&mut self, channel: u8, high: bool) {
        match self.pins.charge.get_mut(channel as usize) {
            Some(pin) => write(pin, high),
            None => rprintln!("no charge line for channel {}", channel),
        }
    }

    pub fn write_discharge(&mut self, channel: u8, high: bool) {
        match self.pins.discharge.get_mut(channel as usize) {
            Some(pin) => write(pin, high),
            None => rprintln!("no discharge line for channel {}", channel),
        }
    }
}

pub struct MultiplexerLines {
    pins: MultiplexerPins,
}

impl MultiplexerLines {
    pub fn new(pins: MultiplexerPins) -> Self {
        let mut lines = MultiplexerLines { pins };
        for pin in lines.pins.lines.iter_mut() {
            pin.set_low();
        }
        lines
    }

    pub fn write(&mut self, line: u8, high: bool) {
        match self.pins.lines.get_mut(line as usize) {
            Some(pin) => write(pin, high),
            None => rprintln!("no multiplexer line {}", line),
        }
    }
}

fn write(
    pin: &mut stm32f1xx_hal::gpio::ErasedPin<stm32f1xx_hal::gpio::Output>,
    high: bool,
) {
    if high {
        pin.set_high();
    } else {
        pin.set_low();
    }
}
