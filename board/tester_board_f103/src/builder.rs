use rtt_target::rprintln;
use stm32f1xx_hal::afio::MAPR;
use stm32f1xx_hal::flash::ACR;
use stm32f1xx_hal::i2c::{BlockingI2c, Mode};
use stm32f1xx_hal::pac::{self, I2C1};
use stm32f1xx_hal::prelude::*;
use stm32f1xx_hal::rcc::{Clocks, CFGR};
use stm32f1xx_hal::timer::SysDelay;
use tester_board::TesterBoardBuilder;

use crate::components::*;
use crate::pins::{I2c1Pins, Pins};
use crate::{Board, BoardI2c1};

pub struct BoardBuilder {
    // chip features
    pub delay: Option<SysDelay>,

    // board features
    pub internal_adc: Option<InternalAdc>,
    pub thermometers: Option<Thermometers>,
    pub real_time_clock: Option<RealTimeClock>,
    pub control_lines: Option<ControlLines>,
    pub multiplexer_lines: Option<MultiplexerLines>,
}

impl BoardBuilder {
    pub fn new() -> Self {
        BoardBuilder {
            delay: None,
            internal_adc: None,
            thermometers: None,
            real_time_clock: None,
            control_lines: None,
            multiplexer_lines: None,
        }
    }

    /// Assembles the board. Must be called after `setup`.
    pub fn build(self) -> Board {
        Board {
            delay: self.delay.unwrap(),
            internal_adc: self.internal_adc.unwrap(),
            thermometers: self.thermometers.unwrap(),
            real_time_clock: self.real_time_clock.unwrap(),
            control_lines: self.control_lines.unwrap(),
            multiplexer_lines: self.multiplexer_lines.unwrap(),
        }
    }

    fn setup_clocks(cfgr: CFGR, flash_acr: &mut ACR) -> Clocks {
        cfgr.use_hse(8.MHz())
            .sysclk(48.MHz())
            .pclk1(24.MHz())
            .adcclk(12.MHz())
            .freeze(flash_acr)
    }

    fn setup_i2c1(pins: I2c1Pins, i2c1: I2C1, mapr: &mut MAPR, clocks: &Clocks) -> BoardI2c1 {
        BlockingI2c::i2c1(
            i2c1,
            (pins.scl, pins.sda),
            mapr,
            Mode::Standard {
                frequency: 100.kHz(),
            },
            *clocks,
            1000,
            10,
            1000,
            1000,
        )
    }
}

impl TesterBoardBuilder for BoardBuilder {
    fn setup(&mut self) {
        rprintln!("board new");

        let mut core_peripherals = cortex_m::Peripherals::take().unwrap();
        let device_peripherals = pac::Peripherals::take().unwrap();

        // mcu device registers
        let rcc = device_peripherals.RCC.constrain();
        let mut flash = device_peripherals.FLASH.constrain();
        let mut afio = device_peripherals.AFIO.constrain();

        let gpioa = device_peripherals.GPIOA.split();
        let gpiob = device_peripherals.GPIOB.split();
        let gpioc = device_peripherals.GPIOC.split();

        // control lines are driven low before anything else is brought up
        let pins = Pins::build(gpioa, gpiob, gpioc);
        self.control_lines = Some(ControlLines::new(pins.control_lines));
        self.multiplexer_lines = Some(MultiplexerLines::new(pins.multiplexer));

        let clocks = BoardBuilder::setup_clocks(rcc.cfgr, &mut flash.acr);
        let mut delay = core_peripherals.SYST.delay(&clocks);

        serial::setup_serial(
            pins.serial,
            &mut afio.mapr,
            device_peripherals.USART2,
            &clocks,
        );

        let internal_adc_configuration =
            InternalAdcConfiguration::new(pins.voltage_sense, device_peripherals.ADC1);
        self.internal_adc = Some(internal_adc_configuration.build(&clocks));

        self.thermometers = Some(Thermometers::setup(pins.one_wire, &mut delay));

        rprintln!("starting i2c");
        core_peripherals.DWT.enable_cycle_counter(); // BlockingI2c says this is required
        let i2c1 = BoardBuilder::setup_i2c1(
            pins.i2c1,
            device_peripherals.I2C1,
            &mut afio.mapr,
            &clocks,
        );
        self.real_time_clock = Some(RealTimeClock::setup(i2c1));

        self.delay = Some(delay);

        rprintln!("done with setup");
    }
}
