use stm32f1xx_hal::adc;
use stm32f1xx_hal::pac::ADC1;
use stm32f1xx_hal::prelude::*;
use stm32f1xx_hal::rcc::Clocks;
use tester_board::AdcError;

use crate::pins::VoltageSensePins;

pub struct InternalAdcConfiguration {
    pins: VoltageSensePins,
    adc_device: ADC1,
}

pub struct InternalAdc {
    pins: VoltageSensePins,
    adc: adc::Adc<ADC1>,
}

impl InternalAdcConfiguration {
    pub fn new(pins: VoltageSensePins, adc1: ADC1) -> Self {
        InternalAdcConfiguration {
            pins,
            adc_device: adc1,
        }
    }

    pub fn build(self, clocks: &Clocks) -> InternalAdc {
        let adc = adc::Adc::adc1(self.adc_device, *clocks);
        InternalAdc {
            pins: self.pins,
            adc,
        }
    }
}

impl InternalAdc {
    /// Raw reading scaled down to 10 bits, the resolution the tester thresholds
    /// are calibrated for.
    pub fn read(&mut self, channel: u8) -> Result<u16, AdcError> {
        let res: nb::Result<u16, ()> = match channel {
            0 => self.adc.read(&mut self.pins.channel0),
            1 => self.adc.read(&mut self.pins.channel1),
            2 => self.adc.read(&mut self.pins.channel2),
            3 => self.adc.read(&mut self.pins.channel3),
            _ => return Err(AdcError::NotConfigured),
        };

        match res {
            Ok(value) => Ok(value >> 2),
            Err(nb::Error::WouldBlock) => Err(AdcError::Timeout),
            Err(nb::Error::Other(_)) => Err(AdcError::ReadError),
        }
    }
}
