use alloc::string::String;
use alloc::vec::Vec;
use tester_board::{AdcError, TesterBoard, ThermometerError, MAX_CHANNELS};

/// Board double that records every line write and serves scripted readings.
pub struct MockBoard {
    pub now: i64,
    pub adc: [u16; MAX_CHANNELS],
    pub adc_script: Vec<u16>,
    pub adc_failure: Option<AdcError>,
    pub thermometers: [Result<f32, ThermometerError>; MAX_CHANNELS],
    pub thermometer_script: Vec<f32>,
    pub charge_lines: [bool; MAX_CHANNELS],
    pub discharge_lines: [bool; MAX_CHANNELS],
    pub multiplexer_lines: [bool; 8],
    pub multiplexer_writes: Vec<(u8, bool)>,
    pub adc_queries: usize,
    pub thermometer_queries: usize,
    pub serial: String,
}

impl MockBoard {
    pub fn new() -> Self {
        MockBoard {
            now: 1_000,
            adc: [0; MAX_CHANNELS],
            adc_script: Vec::new(),
            adc_failure: None,
            thermometers: [Ok(25.0); MAX_CHANNELS],
            thermometer_script: Vec::new(),
            charge_lines: [false; MAX_CHANNELS],
            discharge_lines: [false; MAX_CHANNELS],
            multiplexer_lines: [false; 8],
            multiplexer_writes: Vec::new(),
            adc_queries: 0,
            thermometer_queries: 0,
            serial: String::new(),
        }
    }

    pub fn set_adc(&mut self, channel: usize, raw: u16) {
        self.adc[channel] = raw;
    }

    pub fn set_temperature(&mut self, channel: usize, temperature: f32) {
        self.thermometers[channel] = Ok(temperature);
    }

    pub fn lines(&self) -> Vec<String> {
        self.serial.lines().map(String::from).collect()
    }

    pub fn clear_serial(&mut self) {
        self.serial.clear();
    }

    fn check_exclusive(&self, channel: u8) {
        let channel = channel as usize;
        if self.charge_lines[channel] && self.discharge_lines[channel] {
            panic!("charge and discharge asserted together on channel {}", channel);
        }
    }
}

impl TesterBoard for MockBoard {
    fn serial_send(&mut self, string: &str) {
        self.serial.push_str(string);
    }

    fn timestamp(&mut self) -> i64 {
        self.now
    }

    fn query_voltage_adc(&mut self, channel: u8) -> Result<u16, AdcError> {
        self.adc_queries += 1;
        if let Some(error) = self.adc_failure {
            return Err(error);
        }
        if !self.adc_script.is_empty() {
            return Ok(self.adc_script.remove(0));
        }
        Ok(self.adc[channel as usize])
    }

    fn query_thermometer(&mut self, channel: u8) -> Result<f32, ThermometerError> {
        self.thermometer_queries += 1;
        if !self.thermometer_script.is_empty() {
            return Ok(self.thermometer_script.remove(0));
        }
        self.thermometers[channel as usize]
    }

    fn write_charge_line(&mut self, channel: u8, high: bool) {
        self.charge_lines[channel as usize] = high;
        self.check_exclusive(channel);
    }

    fn write_discharge_line(&mut self, channel: u8, high: bool) {
        self.discharge_lines[channel as usize] = high;
        self.check_exclusive(channel);
    }

    fn write_multiplexer_line(&mut self, line: u8, high: bool) {
        self.multiplexer_lines[line as usize] = high;
        self.multiplexer_writes.push((line, high));
    }
}
