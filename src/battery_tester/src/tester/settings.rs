use bitfield_struct::bitfield;
use serde::Deserialize;
use serde_json::Value;

use crate::services::clock_service::AlarmOffset;

pub const CHARGED_VOLTAGE: f32 = 95.0;
pub const DISCHARGED_VOLTAGE: f32 = 15.0;
pub const SETTLE_VOLTAGE: f32 = 70.0;
pub const OVERHEAT_TEMPERATURE: f32 = 70.0;
pub const MAX_OVERHEATED: u8 = 5;
pub const RESUME_VOLTAGE_RATIO: f32 = 0.9;
pub const IDLE_DELAY: AlarmOffset = AlarmOffset::new(0, 5, 0);
pub const SAMPLES_PER_MEASUREMENT: u8 = 5;
pub const ADC_RESOLUTION: u16 = 1024;
pub const VOLTAGE_FULL_SCALE: f32 = 100.0;

const MAX_SAMPLES_PER_MEASUREMENT: u8 = 20;

#[bitfield(u8)]
pub struct TesterSettingsBitField {
    #[bits(1)]
    pub log_measurements: bool,

    #[bits(1)]
    pub discharge_after_rest: bool,

    #[bits(6)]
    unused: usize,
}

#[derive(Clone, Copy, Debug)]
pub struct TesterSettings {
    pub charged_voltage: f32,
    pub discharged_voltage: f32,
    pub settle_voltage: f32,
    pub overheat_temperature: f32,
    pub max_overheated: u8,
    pub resume_voltage_ratio: f32,
    pub idle_delay_s: u32,
    pub samples_per_measurement: u8,
    pub adc_resolution: u16,
    pub voltage_full_scale: f32, // voltage reported for a full scale adc reading
    pub toggles: TesterSettingsBitField,
}

impl TesterSettings {
    pub fn new() -> Self {
        TesterSettings {
            charged_voltage: CHARGED_VOLTAGE,
            discharged_voltage: DISCHARGED_VOLTAGE,
            settle_voltage: SETTLE_VOLTAGE,
            overheat_temperature: OVERHEAT_TEMPERATURE,
            max_overheated: MAX_OVERHEATED,
            resume_voltage_ratio: RESUME_VOLTAGE_RATIO,
            idle_delay_s: IDLE_DELAY.as_seconds(),
            samples_per_measurement: SAMPLES_PER_MEASUREMENT,
            adc_resolution: ADC_RESOLUTION,
            voltage_full_scale: VOLTAGE_FULL_SCALE,
            toggles: TesterSettingsBitField::new().with_log_measurements(true),
        }
    }

    /// Lowest voltage at which a rested slot is charged again.
    pub fn resume_voltage(&self) -> f32 {
        self.charged_voltage * self.resume_voltage_ratio
    }

    pub fn configure_defaults(self) -> TesterSettings {
        let mut settings = self.clone();

        if self.samples_per_measurement == 0
            || self.samples_per_measurement > MAX_SAMPLES_PER_MEASUREMENT
        {
            settings.samples_per_measurement = SAMPLES_PER_MEASUREMENT;
        }

        if self.adc_resolution == 0 {
            settings.adc_resolution = ADC_RESOLUTION;
        }

        if !(self.voltage_full_scale > 0.0 && self.voltage_full_scale.is_finite()) {
            settings.voltage_full_scale = VOLTAGE_FULL_SCALE;
        }

        if !(self.resume_voltage_ratio > 0.0 && self.resume_voltage_ratio <= 1.0) {
            settings.resume_voltage_ratio = RESUME_VOLTAGE_RATIO;
        }

        // thresholds only make sense as a set
        if !(self.discharged_voltage < self.settle_voltage
            && self.settle_voltage <= self.charged_voltage
            && self.charged_voltage.is_finite()
            && self.discharged_voltage.is_finite())
        {
            settings.charged_voltage = CHARGED_VOLTAGE;
            settings.discharged_voltage = DISCHARGED_VOLTAGE;
            settings.settle_voltage = SETTLE_VOLTAGE;
        }

        if !self.overheat_temperature.is_finite() {
            settings.overheat_temperature = OVERHEAT_TEMPERATURE;
        }

        settings
    }

    pub fn with_values(self, values: TesterSettingsValues) -> TesterSettings {
        let mut settings = self.clone();
        settings.charged_voltage = values.charged_voltage.unwrap_or(self.charged_voltage);
        settings.discharged_voltage = values.discharged_voltage.unwrap_or(self.discharged_voltage);
        settings.settle_voltage = values.settle_voltage.unwrap_or(self.settle_voltage);
        settings.overheat_temperature = values
            .overheat_temperature
            .unwrap_or(self.overheat_temperature);
        settings.max_overheated = values.max_overheated.unwrap_or(self.max_overheated);
        settings.resume_voltage_ratio = values
            .resume_voltage_ratio
            .unwrap_or(self.resume_voltage_ratio);
        settings.idle_delay_s = values.idle_delay_s.unwrap_or(self.idle_delay_s);
        settings.samples_per_measurement = values
            .samples_per_measurement
            .unwrap_or(self.samples_per_measurement);
        settings.adc_resolution = values.adc_resolution.unwrap_or(self.adc_resolution);
        settings.voltage_full_scale = values.voltage_full_scale.unwrap_or(self.voltage_full_scale);
        settings.toggles.set_log_measurements(
            values
                .log_measurements
                .unwrap_or(self.toggles.log_measurements()),
        );
        settings.toggles.set_discharge_after_rest(
            values
                .discharge_after_rest
                .unwrap_or(self.toggles.discharge_after_rest()),
        );
        settings
    }
}

impl Default for TesterSettings {
    fn default() -> Self {
        TesterSettings::new()
    }
}

#[derive(Default, Deserialize)]
pub struct TesterSettingsValues {
    pub charged_voltage: Option<f32>,
    pub discharged_voltage: Option<f32>,
    pub settle_voltage: Option<f32>,
    pub overheat_temperature: Option<f32>,
    pub max_overheated: Option<u8>,
    pub resume_voltage_ratio: Option<f32>,
    pub idle_delay_s: Option<u32>,
    pub samples_per_measurement: Option<u8>,
    pub adc_resolution: Option<u16>,
    pub voltage_full_scale: Option<f32>,
    pub log_measurements: Option<bool>,
    pub discharge_after_rest: Option<bool>,
}

impl TesterSettingsValues {
    pub fn parse_from_values(value: Value) -> Result<TesterSettingsValues, &'static str> {
        match value {
            Value::Object(_) => {}
            _ => return Err("settings must be an object"),
        }

        match serde_json::from_value::<TesterSettingsValues>(value) {
            Ok(values) => Ok(values),
            Err(_) => Err("invalid settings value"),
        }
    }
}
