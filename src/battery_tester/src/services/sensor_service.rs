use tester_board::{AdcError, TesterBoard, ThermometerError};

use crate::tester::layout::SlotId;
use crate::tester::settings::TesterSettings;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SensorError {
    Voltage(AdcError),
    Temperature(ThermometerError),
}

impl From<AdcError> for SensorError {
    fn from(error: AdcError) -> Self {
        SensorError::Voltage(error)
    }
}

impl From<ThermometerError> for SensorError {
    fn from(error: ThermometerError) -> Self {
        SensorError::Temperature(error)
    }
}

/// What a handler needs measured before it can decide.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sampling {
    Full,
    TemperatureOnly,
    Skip,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Measurement {
    pub voltage: Option<f32>,
    pub temperature: Option<f32>,
}

impl Measurement {
    pub fn full(voltage: f32, temperature: f32) -> Self {
        Measurement {
            voltage: Some(voltage),
            temperature: Some(temperature),
        }
    }

    pub fn temperature_only(temperature: f32) -> Self {
        Measurement {
            voltage: None,
            temperature: Some(temperature),
        }
    }

    pub fn none() -> Self {
        Measurement::default()
    }
}

/// Converts an averaged adc reading to the 0 to full scale voltage range.
pub fn scale_voltage(average: f32, settings: &TesterSettings) -> f32 {
    average / settings.adc_resolution as f32 * settings.voltage_full_scale
}

pub fn sample_voltage(
    board: &mut impl TesterBoard,
    slot: &SlotId,
    settings: &TesterSettings,
) -> Result<f32, SensorError> {
    let samples = settings.samples_per_measurement.max(1);
    let mut sum: u32 = 0;
    for _ in 0..samples {
        sum += board.query_voltage_adc(slot.channel)? as u32;
    }
    Ok(scale_voltage(sum as f32 / samples as f32, settings))
}

pub fn sample_temperature(
    board: &mut impl TesterBoard,
    slot: &SlotId,
    settings: &TesterSettings,
) -> Result<f32, SensorError> {
    let samples = settings.samples_per_measurement.max(1);
    let mut sum: f32 = 0.0;
    for _ in 0..samples {
        sum += board.query_thermometer(slot.channel)?;
    }
    Ok(sum / samples as f32)
}

/// A measurement together with the first read failure behind it, if any.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Reading {
    pub measurement: Measurement,
    pub fault: Option<SensorError>,
}

/// Takes the readings `sampling` asks for. A quantity whose read fails keeps
/// its value from `stale`, or zero when `stale` has none, and the failure is
/// reported in `fault`. Reads are not retried.
pub fn measure(
    board: &mut impl TesterBoard,
    slot: &SlotId,
    sampling: Sampling,
    stale: Measurement,
    settings: &TesterSettings,
) -> Reading {
    let mut fault = None;
    let measurement = match sampling {
        Sampling::Full => {
            let voltage = or_stale(
                sample_voltage(board, slot, settings),
                stale.voltage,
                &mut fault,
            );
            let temperature = or_stale(
                sample_temperature(board, slot, settings),
                stale.temperature,
                &mut fault,
            );
            Measurement::full(voltage, temperature)
        }
        Sampling::TemperatureOnly => Measurement::temperature_only(or_stale(
            sample_temperature(board, slot, settings),
            stale.temperature,
            &mut fault,
        )),
        Sampling::Skip => Measurement::none(),
    };
    Reading { measurement, fault }
}

fn or_stale(
    result: Result<f32, SensorError>,
    stale: Option<f32>,
    fault: &mut Option<SensorError>,
) -> f32 {
    match result {
        Ok(value) => value,
        Err(error) => {
            fault.get_or_insert(error);
            stale.unwrap_or(0.0)
        }
    }
}
