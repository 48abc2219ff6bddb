use crate::services::clock_service::Timestamp;
use crate::services::sensor_service::{Measurement, Sampling};

use super::state::State;

/// Test progress of one battery slot.
///
/// `state` is the state the scanner dispatches on the next pass and
/// `previous_state` the one it dispatched on the last pass, so a handler
/// sees its first tick in a state as `state != previous_state`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BatteryRecord {
    pub state: State,
    pub previous_state: State,
    pub voltage: f32,
    pub temperature: f32,
    pub cycle_finished: bool,
    pub overheat_count: u8,
    pub broken: bool,
    pub alarm_time: Timestamp,
}

impl BatteryRecord {
    pub const fn new() -> Self {
        BatteryRecord {
            state: State::Default,
            previous_state: State::Default,
            voltage: 0.0,
            temperature: 0.0,
            cycle_finished: false,
            overheat_count: 0,
            broken: false,
            alarm_time: Timestamp::ZERO,
        }
    }

    pub fn entered(&self) -> bool {
        self.state != self.previous_state
    }

    /// TESTED only measures when it is reached through the charging path.
    pub fn arrived_tested(&self) -> bool {
        self.previous_state != State::Tested && self.previous_state != State::Idle
    }

    pub fn sampling(&self) -> Sampling {
        match self.state {
            State::Default | State::Idle | State::Charging | State::Discharging => Sampling::Full,
            State::Overheated => Sampling::TemperatureOnly,
            State::Tested => {
                if self.arrived_tested() && !self.broken {
                    Sampling::Full
                } else {
                    Sampling::Skip
                }
            }
        }
    }

    pub(crate) fn apply(&mut self, measurement: Measurement) {
        if let Some(voltage) = measurement.voltage {
            self.voltage = voltage;
        }
        if let Some(temperature) = measurement.temperature {
            self.temperature = temperature;
        }
    }
}

impl Default for BatteryRecord {
    fn default() -> Self {
        BatteryRecord::new()
    }
}
