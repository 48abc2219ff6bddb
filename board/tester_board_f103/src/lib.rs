#![cfg_attr(not(test), no_std)]

use stm32f1xx_hal::i2c::BlockingI2c;
use stm32f1xx_hal::pac::I2C1;
use stm32f1xx_hal::timer::SysDelay;

use tester_board::{AdcError, TesterBoard, TesterBoardBuilder, ThermometerError};

mod builder;
pub use builder::BoardBuilder;
mod components;
use components::*;
mod pins;

type BoardI2c1 = BlockingI2c<I2C1, (pins::I2c1Scl, pins::I2c1Sda)>;

pub struct Board {
    pub delay: SysDelay,
    pub internal_adc: InternalAdc,
    pub thermometers: Thermometers,
    pub real_time_clock: RealTimeClock,
    pub control_lines: ControlLines,
    pub multiplexer_lines: MultiplexerLines,
}

impl TesterBoard for Board {
    fn serial_send(&mut self, string: &str) {
        serial::send(string);
    }

    fn timestamp(&mut self) -> i64 {
        self.real_time_clock.timestamp()
    }

    fn query_voltage_adc(&mut self, channel: u8) -> Result<u16, AdcError> {
        self.internal_adc.read(channel)
    }

    fn query_thermometer(&mut self, channel: u8) -> Result<f32, ThermometerError> {
        self.thermometers.read(channel, &mut self.delay)
    }

    fn write_charge_line(&mut self, channel: u8, high: bool) {
        self.control_lines.write_charge(channel, high);
    }

    fn write_discharge_line(&mut self, channel: u8, high: bool) {
        self.control_lines.write_discharge(channel, high);
    }

    fn write_multiplexer_line(&mut self, line: u8, high: bool) {
        self.multiplexer_lines.write(line, high);
    }
}

pub fn build() -> Board {
    let mut board_builder = BoardBuilder::new();
    board_builder.setup();
    board_builder.build()
}
