use stm32f1xx_hal::gpio::*;

use tester_board::MAX_CHANNELS;

// bays populated on this board revision
pub const BOARD_CHANNELS: usize = 4;
pub const BOARD_MULTIPLEXER_LINES: usize = 2;

pub type OneWirePin = Pin<'B', 5, Output<OpenDrain>>;
pub type I2c1Scl = Pin<'B', 6, Alternate<OpenDrain>>;
pub type I2c1Sda = Pin<'B', 7, Alternate<OpenDrain>>;
pub type SerialTx = Pin<'A', 2, Alternate<PushPull>>;
pub type SerialRx = Pin<'A', 3, Input<Floating>>;

pub struct VoltageSensePins {
    pub channel0: Pin<'C', 0, Analog>,
    pub channel1: Pin<'C', 1, Analog>,
    pub channel2: Pin<'C', 2, Analog>,
    pub channel3: Pin<'C', 3, Analog>,
}

pub struct ControlLinePins {
    pub charge: [ErasedPin<Output<PushPull>>; BOARD_CHANNELS],
    pub discharge: [ErasedPin<Output<PushPull>>; BOARD_CHANNELS],
}

pub struct MultiplexerPins {
    pub lines: [ErasedPin<Output<PushPull>>; BOARD_MULTIPLEXER_LINES],
}

pub struct I2c1Pins {
    pub scl: I2c1Scl,
    pub sda: I2c1Sda,
}

pub struct SerialPins {
    pub tx: SerialTx,
    pub rx: SerialRx,
}

pub struct Pins {
    pub voltage_sense: VoltageSensePins,
    pub control_lines: ControlLinePins,
    pub multiplexer: MultiplexerPins,
    pub one_wire: OneWirePin,
    pub i2c1: I2c1Pins,
    pub serial: SerialPins,
}

impl Pins {
    pub fn build(
        mut gpioa: gpioa::Parts,
        mut gpiob: gpiob::Parts,
        mut gpioc: gpioc::Parts,
    ) -> Self {
        // every control line comes up low
        let charge = [
            gpiob.pb12.into_push_pull_output(&mut gpiob.crh).erase(),
            gpiob.pb13.into_push_pull_output(&mut gpiob.crh).erase(),
            gpiob.pb14.into_push_pull_output(&mut gpiob.crh).erase(),
            gpiob.pb15.into_push_pull_output(&mut gpiob.crh).erase(),
        ];
        let discharge = [
            gpioc.pc6.into_push_pull_output(&mut gpioc.crl).erase(),
            gpioc.pc7.into_push_pull_output(&mut gpioc.crl).erase(),
            gpioc.pc8.into_push_pull_output(&mut gpioc.crh).erase(),
            gpioc.pc9.into_push_pull_output(&mut gpioc.crh).erase(),
        ];
        let lines = [
            gpiob.pb0.into_push_pull_output(&mut gpiob.crl).erase(),
            gpiob.pb1.into_push_pull_output(&mut gpiob.crl).erase(),
        ];

        Pins {
            voltage_sense: VoltageSensePins {
                channel0: gpioc.pc0.into_analog(&mut gpioc.crl),
                channel1: gpioc.pc1.into_analog(&mut gpioc.crl),
                channel2: gpioc.pc2.into_analog(&mut gpioc.crl),
                channel3: gpioc.pc3.into_analog(&mut gpioc.crl),
            },
            control_lines: ControlLinePins { charge, discharge },
            multiplexer: MultiplexerPins { lines },
            one_wire: gpiob.pb5.into_open_drain_output(&mut gpiob.crl),
            i2c1: I2c1Pins {
                scl: gpiob.pb6.into_alternate_open_drain(&mut gpiob.crl),
                sda: gpiob.pb7.into_alternate_open_drain(&mut gpiob.crl),
            },
            serial: SerialPins {
                tx: gpioa.pa2.into_alternate_push_pull(&mut gpioa.crl),
                rx: gpioa.pa3,
            },
        }
    }
}

const _: () = assert!(BOARD_CHANNELS <= MAX_CHANNELS);
