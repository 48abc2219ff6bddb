use embedded_hal::blocking::delay::DelayUs;
use one_wire_bus::{Address, OneWire, OneWireError};
use rtt_target::rprintln;
use tester_board::ThermometerError;

use crate::pins::{OneWirePin, BOARD_CHANNELS};

const DS18B20_FAMILY_CODE: u8 = 0x28;

const CONVERT_TEMPERATURE: u8 = 0x44;
const READ_SCRATCHPAD: u8 = 0xBE;
const WRITE_SCRATCHPAD: u8 = 0x4E;

// alarm registers keep their power on values
const ALARM_HIGH: u8 = 0x4B;
const ALARM_LOW: u8 = 0x46;
const RESOLUTION_10_BIT: u8 = 0x3F;

// a 12 bit conversion takes at most 750 ms, 10 bit finishes well inside that
const CONVERSION_TIMEOUT_MS: u16 = 750;

type BusError = OneWireError<core::convert::Infallible>;

/// DS18B20 thermometers on a shared one-wire bus, assigned to channels in
/// search order.
pub struct Thermometers {
    bus: Option<OneWire<OneWirePin>>,
    addresses: [Option<Address>; BOARD_CHANNELS],
}

impl Thermometers {
    pub fn setup(pin: OneWirePin, delay: &mut impl DelayUs<u16>) -> Self {
        let mut thermometers = Thermometers {
            bus: None,
            addresses: [None; BOARD_CHANNELS],
        };

        let mut bus = match OneWire::new(pin) {
            Ok(bus) => bus,
            Err(error) => {
                rprintln!("one-wire bus unavailable {:?}", error);
                return thermometers;
            }
        };

        let mut found: usize = 0;
        for device in bus.devices(false, delay) {
            match device {
                Ok(address) if address.family_code() == DS18B20_FAMILY_CODE => {
                    if found < BOARD_CHANNELS {
                        thermometers.addresses[found] = Some(address);
                    }
                    found += 1;
                }
                Ok(address) => rprintln!("ignoring one-wire device {:?}", address),
                Err(error) => {
                    rprintln!("thermometer search failed {:?}", error);
                    break;
                }
            }
        }
        rprintln!("Found {} thermometers", found);

        for (index, address) in thermometers.addresses.iter().enumerate() {
            match address {
                Some(address) => {
                    if let Err(error) = set_resolution(&mut bus, address, delay) {
                        rprintln!("thermometer {} resolution not set {:?}", index, error);
                    }
                }
                None => rprintln!("Unable to find address for thermometer {}", index),
            }
        }

        thermometers.bus = Some(bus);
        thermometers
    }

    /// Starts a conversion on the channel's thermometer and reads it back.
    pub fn read(
        &mut self,
        channel: u8,
        delay: &mut impl DelayUs<u16>,
    ) -> Result<f32, ThermometerError> {
        let address = match self.addresses.get(channel as usize) {
            Some(Some(address)) => *address,
            _ => return Err(ThermometerError::DeviceNotFound),
        };
        let bus = match self.bus.as_mut() {
            Some(bus) => bus,
            None => return Err(ThermometerError::BusError),
        };

        bus.send_command(CONVERT_TEMPERATURE, Some(&address), delay)
            .map_err(bus_error)?;
        wait_for_conversion(bus, delay)?;

        let mut scratchpad = [0u8; 9];
        bus.send_command(READ_SCRATCHPAD, Some(&address), delay)
            .map_err(bus_error)?;
        bus.read_bytes(&mut scratchpad, delay).map_err(bus_error)?;
        if one_wire_bus::crc::check_crc8::<core::convert::Infallible>(&scratchpad).is_err() {
            return Err(ThermometerError::CrcMismatch);
        }

        let raw = i16::from_le_bytes([scratchpad[0], scratchpad[1]]);
        Ok(raw as f32 / 16.0)
    }
}

fn set_resolution(
    bus: &mut OneWire<OneWirePin>,
    address: &Address,
    delay: &mut impl DelayUs<u16>,
) -> Result<(), BusError> {
    bus.send_command(WRITE_SCRATCHPAD, Some(address), delay)?;
    bus.write_bytes(&[ALARM_HIGH, ALARM_LOW, RESOLUTION_10_BIT], delay)
}

fn wait_for_conversion(
    bus: &mut OneWire<OneWirePin>,
    delay: &mut impl DelayUs<u16>,
) -> Result<(), ThermometerError> {
    for _ in 0..CONVERSION_TIMEOUT_MS {
        if bus.read_bit(delay).map_err(bus_error)? {
            return Ok(());
        }
        delay.delay_us(1000);
    }
    Err(ThermometerError::Timeout)
}

fn bus_error(error: BusError) -> ThermometerError {
    rprintln!("one-wire error {:?}", error);
    ThermometerError::BusError
}
