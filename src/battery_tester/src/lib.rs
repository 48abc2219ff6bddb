#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod protocol;
pub mod services;
pub mod tester;

#[cfg(test)]
mod mock;

use rtt_target::rprintln;
use serde_json::Value;
use tester_board::TesterBoard;

use crate::protocol::status;
use crate::services::{clock_service, line_service, sensor_service};

pub use crate::services::clock_service::{AlarmOffset, Timestamp};
pub use crate::services::sensor_service::{Measurement, Reading, SensorError};
pub use crate::tester::layout::{SlotId, SlotLayout};
pub use crate::tester::machine::{transition, LineCommand, Outcome};
pub use crate::tester::record::BatteryRecord;
pub use crate::tester::settings::{TesterSettings, TesterSettingsValues};
pub use crate::tester::state::{Annotation, State};
pub use crate::tester::TesterError;

pub const CHANNELS_AMOUNT: u8 = 4;
pub const MULTIPLEXER_VARIANTS: u8 = 1;
pub const SLOTS_AMOUNT: usize = CHANNELS_AMOUNT as usize * MULTIPLEXER_VARIANTS as usize;

pub type DefaultBatteryTester = BatteryTester<SLOTS_AMOUNT>;

pub struct BatteryTester<const SLOTS: usize> {
    settings: TesterSettings,
    layout: SlotLayout,
    batteries: [BatteryRecord; SLOTS],
}

impl BatteryTester<SLOTS_AMOUNT> {
    pub fn with_defaults() -> Self {
        BatteryTester {
            settings: TesterSettings::new(),
            layout: SlotLayout::new(CHANNELS_AMOUNT, MULTIPLEXER_VARIANTS),
            batteries: [BatteryRecord::new(); SLOTS_AMOUNT],
        }
    }
}

impl<const SLOTS: usize> BatteryTester<SLOTS> {
    pub fn new(layout: SlotLayout, settings: TesterSettings) -> Result<Self, TesterError> {
        layout.validate(SLOTS)?;
        Ok(BatteryTester {
            settings: settings.configure_defaults(),
            layout,
            batteries: [BatteryRecord::new(); SLOTS],
        })
    }

    pub fn settings(&self) -> &TesterSettings {
        &self.settings
    }

    pub fn update_settings(&mut self, values: TesterSettingsValues) {
        self.settings = self.settings.with_values(values).configure_defaults();
        rprintln!("updated settings {:?}", self.settings);
    }

    /// Overlays settings given as a JSON object on the current ones.
    pub fn load_settings(&mut self, json: &str) -> Result<(), &'static str> {
        let value = match serde_json::from_str::<Value>(json) {
            Ok(value) => value,
            Err(_) => return Err("settings are not valid json"),
        };
        let values = TesterSettingsValues::parse_from_values(value)?;
        self.update_settings(values);
        Ok(())
    }

    pub fn layout(&self) -> &SlotLayout {
        &self.layout
    }

    pub fn battery(&self, index: usize) -> Option<&BatteryRecord> {
        self.batteries.get(index)
    }

    pub fn batteries(&self) -> &[BatteryRecord; SLOTS] {
        &self.batteries
    }

    pub fn setup(&mut self, board: &mut impl TesterBoard) {
        status::send_setup_message(board, "Setting up pins");
        line_service::release_all(board, self.layout.channels);
        for line in 0..self.layout.multiplexer_bits() {
            board.write_multiplexer_line(line, false);
        }

        status::send_setup_message(board, "Setting up sensors");
        for channel in 0..self.layout.channels {
            if let Err(error) = board.query_thermometer(channel) {
                rprintln!("thermometer on channel {} not responding {:?}", channel, error);
            }
        }

        status::send_setup_message(board, "Setting up RTC");
        rprintln!("clock reads {}", clock_service::now(board).seconds());

        self.batteries = [BatteryRecord::new(); SLOTS];
        status::send_ready_status(board, SLOTS);
    }

    /// Runs one scan pass: every analog channel, and for each channel every
    /// multiplexer variant, gets exactly one tick.
    pub fn run_loop_iteration(&mut self, board: &mut impl TesterBoard) {
        let bits = self.layout.multiplexer_bits();
        for channel in 0..self.layout.channels {
            for variant in 0..self.layout.variants {
                let slot = self.layout.slot(channel, variant);
                if let Err(error) = tester::multiplexer::select(board, variant, bits) {
                    rprintln!("skipping battery {} {:?}", slot.index, error);
                    continue;
                }
                self.run_slot(board, &slot);
            }
        }
    }

    fn run_slot(&mut self, board: &mut impl TesterBoard, slot: &SlotId) {
        let record = self.batteries[slot.index];

        let stale = Measurement::full(record.voltage, record.temperature);
        let reading =
            sensor_service::measure(board, slot, record.sampling(), stale, &self.settings);
        if let Some(error) = reading.fault {
            status::send_sensor_fault(board, slot.index, &error);
        }
        let measurement = reading.measurement;

        let now = clock_service::now(board);
        let outcome = tester::machine::transition(&record, measurement, now, &self.settings);

        // lines stay released while the slot's readings are stale
        let command = match (reading.fault, outcome.command) {
            (Some(_), Some(LineCommand::StartCharging)) => Some(LineCommand::StopCharging),
            (Some(_), Some(LineCommand::StartDischarging)) => Some(LineCommand::StopDischarging),
            (_, command) => command,
        };
        if let Some(command) = command {
            line_service::apply(board, slot, command);
        }

        if let Some(annotation) = outcome.annotation {
            status::send_status(board, slot.index, &annotation);
        }

        if self.settings.toggles.log_measurements() {
            if let Some(voltage) = measurement.voltage {
                status::send_voltage(board, slot.index, voltage);
            }
            if let Some(temperature) = measurement.temperature {
                status::send_temperature(board, slot.index, temperature);
            }
        }

        if outcome.record.state != record.state {
            rprintln!(
                "battery {} {:?} -> {:?}",
                slot.index,
                record.state,
                outcome.record.state
            );
        }

        self.batteries[slot.index] = outcome.record;
    }

    /// Forces a slot back to DEFAULT, as when a battery is swapped.
    pub fn reset_slot(
        &mut self,
        board: &mut impl TesterBoard,
        index: usize,
    ) -> Result<(), TesterError> {
        let slot = self.layout.slot_by_index(index)?;
        line_service::release(board, slot.channel);
        self.batteries[slot.index] = BatteryRecord::new();
        Ok(())
    }

    /// Puts a slot into the state encoded by `raw`. Unknown values reset the
    /// slot to DEFAULT. The restored state is treated as freshly entered.
    pub fn restore_slot_state(
        &mut self,
        board: &mut impl TesterBoard,
        index: usize,
        raw: u8,
    ) -> Result<State, TesterError> {
        let slot = self.layout.slot_by_index(index)?;
        let state = match State::from_u8(raw) {
            Some(state) => state,
            None => {
                status::send_protocol_fault(board, slot.index, raw);
                State::Default
            }
        };

        line_service::release(board, slot.channel);
        let record = &mut self.batteries[slot.index];
        if state == State::Default {
            *record = BatteryRecord::new();
        } else {
            record.state = state;
            record.previous_state = State::Default;
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBoard;
    use alloc::string::String;
    use alloc::vec::Vec;
    use tester_board::{AdcError, ThermometerError};

    fn battery_lines(board: &MockBoard, index: usize) -> Vec<String> {
        let prefix = format!("Battery #{} ", index);
        board
            .lines()
            .into_iter()
            .filter(|line| line.starts_with(prefix.as_str()))
            .collect()
    }

    #[test]
    fn test_setup() {
        let mut board = MockBoard::new();
        board.charge_lines[1] = true;
        board.discharge_lines[3] = true;
        let mut tester = BatteryTester::with_defaults();
        tester.setup(&mut board);

        assert!(board.charge_lines.iter().all(|line| !line));
        assert!(board.discharge_lines.iter().all(|line| !line));
        assert_eq!(
            vec![
                "Setting up pins",
                "Setting up sensors",
                "Setting up RTC",
                r#"{"slots":4,"status":"battery-tester-ready"}"#,
            ],
            board.lines()
        );
        assert!(tester
            .batteries()
            .iter()
            .all(|record| *record == BatteryRecord::new()));
    }

    #[test]
    fn test_full_capacity_cycle() {
        let mut board = MockBoard::new();
        let mut settings = TesterSettings::new();
        settings.toggles.set_discharge_after_rest(true);
        let mut tester =
            BatteryTester::<SLOTS_AMOUNT>::new(SlotLayout::new(4, 1), settings).unwrap();
        tester.setup(&mut board);
        board.clear_serial();

        board.set_adc(0, 512);
        tester.run_loop_iteration(&mut board);
        assert_eq!(State::Charging, tester.battery(0).unwrap().state);
        assert_eq!(
            vec![
                "Battery #0 Default",
                "Battery #0 voltage 50",
                "Battery #0 temperature 25",
            ],
            battery_lines(&board, 0)
        );

        board.clear_serial();
        tester.run_loop_iteration(&mut board);
        assert_eq!(true, board.charge_lines[0]);
        assert_eq!(
            Some(&String::from("Battery #0 Charging")),
            battery_lines(&board, 0).first()
        );

        board.set_adc(0, 983);
        tester.run_loop_iteration(&mut board);
        assert_eq!(State::Idle, tester.battery(0).unwrap().state);
        assert_eq!(false, board.charge_lines[0]);

        tester.run_loop_iteration(&mut board);
        assert_eq!(State::Idle, tester.battery(0).unwrap().state);
        assert_eq!(Timestamp(1_300), tester.battery(0).unwrap().alarm_time);

        board.now = 1_300;
        tester.run_loop_iteration(&mut board);
        assert_eq!(State::Discharging, tester.battery(0).unwrap().state);

        tester.run_loop_iteration(&mut board);
        assert_eq!(true, board.discharge_lines[0]);
        assert_eq!(false, board.charge_lines[0]);

        board.set_adc(0, 153);
        tester.run_loop_iteration(&mut board);
        let record = tester.battery(0).unwrap();
        assert_eq!(State::Charging, record.state);
        assert_eq!(true, record.cycle_finished);
        assert_eq!(false, board.discharge_lines[0]);

        tester.run_loop_iteration(&mut board);
        assert_eq!(true, board.charge_lines[0]);

        board.set_adc(0, 737);
        tester.run_loop_iteration(&mut board);
        assert_eq!(State::Tested, tester.battery(0).unwrap().state);
        assert_eq!(false, board.charge_lines[0]);

        board.clear_serial();
        tester.run_loop_iteration(&mut board);
        assert_eq!(
            Some(&String::from("Battery #0 Tested")),
            battery_lines(&board, 0).first()
        );

        board.clear_serial();
        tester.run_loop_iteration(&mut board);
        assert_eq!(0, battery_lines(&board, 0).len());
        assert_eq!(State::Tested, tester.battery(0).unwrap().state);
    }

    #[test]
    fn test_overheat_stops_charging() {
        let mut board = MockBoard::new();
        let mut tester = BatteryTester::with_defaults();
        tester.setup(&mut board);

        board.set_adc(1, 512);
        board.set_temperature(1, 40.0);
        tester.run_loop_iteration(&mut board);
        tester.run_loop_iteration(&mut board);
        assert_eq!(true, board.charge_lines[1]);

        board.set_temperature(1, 75.0);
        tester.run_loop_iteration(&mut board);
        assert_eq!(State::Overheated, tester.battery(1).unwrap().state);
        assert_eq!(false, board.charge_lines[1]);

        board.clear_serial();
        tester.run_loop_iteration(&mut board);
        let record = tester.battery(1).unwrap();
        assert_eq!(State::Idle, record.state);
        assert_eq!(1, record.overheat_count);
        assert_eq!(
            vec!["Battery #1 temperature 75"],
            battery_lines(&board, 1)
        );
    }

    #[test]
    fn test_sensor_fault_while_charging_releases_line() {
        let mut board = MockBoard::new();
        let mut tester = BatteryTester::with_defaults();
        tester.setup(&mut board);

        board.set_adc(0, 512);
        tester.run_loop_iteration(&mut board);
        tester.run_loop_iteration(&mut board);
        assert_eq!(true, board.charge_lines[0]);

        board.clear_serial();
        board.thermometers[0] = Err(ThermometerError::BusError);
        tester.run_loop_iteration(&mut board);
        let record = tester.battery(0).unwrap();
        assert_eq!(State::Charging, record.state);
        assert_eq!(25.0, record.temperature);
        assert_eq!(false, board.charge_lines[0]);
        assert_eq!(
            vec![
                "Battery #0 sensor fault",
                "Battery #0 voltage 50",
                "Battery #0 temperature 25",
            ],
            battery_lines(&board, 0)
        );

        board.set_temperature(0, 30.0);
        tester.run_loop_iteration(&mut board);
        assert_eq!(true, board.charge_lines[0]);

        // voltage cutoff still applies on a stale temperature
        board.thermometers[0] = Err(ThermometerError::BusError);
        board.set_adc(0, 1023);
        tester.run_loop_iteration(&mut board);
        assert_eq!(State::Idle, tester.battery(0).unwrap().state);
        assert_eq!(false, board.charge_lines[0]);
    }

    #[test]
    fn test_sensor_fault_while_discharging_releases_line() {
        let mut board = MockBoard::new();
        let mut tester = BatteryTester::with_defaults();
        tester.setup(&mut board);

        assert_eq!(Ok(State::Discharging), tester.restore_slot_state(&mut board, 2, 4));
        board.set_adc(2, 512);
        tester.run_loop_iteration(&mut board);
        assert_eq!(true, board.discharge_lines[2]);

        board.adc_failure = Some(AdcError::Timeout);
        tester.run_loop_iteration(&mut board);
        let record = tester.battery(2).unwrap();
        assert_eq!(State::Discharging, record.state);
        assert_eq!(50.0, record.voltage);
        assert_eq!(false, board.discharge_lines[2]);
        assert_eq!(false, board.charge_lines[2]);

        board.adc_failure = None;
        tester.run_loop_iteration(&mut board);
        assert_eq!(true, board.discharge_lines[2]);

        board.set_adc(2, 153);
        tester.run_loop_iteration(&mut board);
        let record = tester.battery(2).unwrap();
        assert_eq!(State::Charging, record.state);
        assert_eq!(true, record.cycle_finished);
        assert_eq!(false, board.discharge_lines[2]);
    }

    #[test]
    fn test_missing_thermometer_does_not_pin_slot() {
        let mut board = MockBoard::new();
        board.thermometers[1] = Err(ThermometerError::DeviceNotFound);
        board.set_adc(1, 1000);
        let mut tester = BatteryTester::with_defaults();
        tester.setup(&mut board);
        board.clear_serial();

        tester.run_loop_iteration(&mut board);
        let record = tester.battery(1).unwrap();
        assert_eq!(State::Idle, record.state);
        assert_eq!(0.0, record.temperature);
        assert_eq!(
            Some(&String::from("Battery #1 sensor fault")),
            battery_lines(&board, 1).first()
        );

        tester.run_loop_iteration(&mut board);
        board.now += 300;
        tester.run_loop_iteration(&mut board);
        assert_eq!(State::Charging, tester.battery(1).unwrap().state);

        board.set_adc(1, 900);
        tester.run_loop_iteration(&mut board);
        assert_eq!(State::Charging, tester.battery(1).unwrap().state);
        assert_eq!(false, board.charge_lines[1]);
    }

    #[test]
    fn test_shared_line_is_reasserted() {
        let mut board = MockBoard::new();
        let mut tester =
            BatteryTester::<4>::new(SlotLayout::new(2, 2), TesterSettings::new()).unwrap();
        tester.setup(&mut board);

        board.set_adc(0, 512);
        tester.run_loop_iteration(&mut board);
        tester.run_loop_iteration(&mut board);
        assert_eq!(true, board.charge_lines[0]);

        // slot 0 stops, slot 1 on the same channel keeps charging
        tester.reset_slot(&mut board, 0).unwrap();
        assert_eq!(false, board.charge_lines[0]);
        tester.restore_slot_state(&mut board, 0, 1).unwrap();
        tester.run_loop_iteration(&mut board);
        assert_eq!(State::Idle, tester.battery(0).unwrap().state);
        assert_eq!(State::Charging, tester.battery(1).unwrap().state);
        assert_eq!(true, board.charge_lines[0]);
    }

    #[test]
    fn test_measurement_logging_toggle() {
        let mut board = MockBoard::new();
        let mut tester = BatteryTester::with_defaults();
        tester.update_settings(TesterSettingsValues {
            log_measurements: Some(false),
            ..Default::default()
        });
        tester.run_loop_iteration(&mut board);
        assert_eq!(vec!["Battery #0 Default"], battery_lines(&board, 0));
    }

    #[test]
    fn test_load_settings() {
        let mut tester = BatteryTester::with_defaults();
        assert_eq!(
            Ok(()),
            tester.load_settings(r#"{"charged_voltage": 90, "discharge_after_rest": true}"#)
        );
        assert_eq!(90.0, tester.settings().charged_voltage);
        assert_eq!(true, tester.settings().toggles.discharge_after_rest());
        assert_eq!(true, tester.settings().toggles.log_measurements());

        assert_eq!(
            Err("settings are not valid json"),
            tester.load_settings("{charged_voltage")
        );
        assert_eq!(Err("settings must be an object"), tester.load_settings("[1, 2]"));
        assert_eq!(90.0, tester.settings().charged_voltage);
    }

    #[test]
    fn test_multiplexed_layout() {
        let mut board = MockBoard::new();
        let mut tester =
            BatteryTester::<8>::new(SlotLayout::new(2, 4), TesterSettings::new()).unwrap();
        tester.setup(&mut board);
        board.multiplexer_writes.clear();

        tester.run_loop_iteration(&mut board);
        assert_eq!(16, board.multiplexer_writes.len());
        assert_eq!(
            vec![
                (0, false),
                (1, false),
                (0, false),
                (1, true),
                (0, true),
                (1, false),
                (0, true),
                (1, true),
            ],
            board.multiplexer_writes[..8].to_vec()
        );
        assert!(tester
            .batteries()
            .iter()
            .all(|record| record.state == State::Charging));
        assert_eq!(
            vec!["Battery #7 Default"],
            battery_lines(&board, 7)[..1].to_vec()
        );
    }

    #[test]
    fn test_layout_must_match_slots() {
        assert_eq!(
            Some(TesterError::LayoutMismatch),
            BatteryTester::<4>::new(SlotLayout::new(2, 4), TesterSettings::new()).err()
        );
        assert_eq!(
            Some(TesterError::LayoutMismatch),
            BatteryTester::<0>::new(SlotLayout::new(0, 1), TesterSettings::new()).err()
        );
        assert_eq!(
            Some(TesterError::TooManyChannels),
            BatteryTester::<9>::new(SlotLayout::new(9, 1), TesterSettings::new()).err()
        );
    }

    #[test]
    fn test_restore_slot_state() {
        let mut board = MockBoard::new();
        let mut tester = BatteryTester::with_defaults();

        assert_eq!(Ok(State::Default), tester.restore_slot_state(&mut board, 0, 42));
        assert_eq!(
            vec!["Battery #0 unknown state 42, resetting"],
            battery_lines(&board, 0)
        );
        assert_eq!(&BatteryRecord::new(), tester.battery(0).unwrap());

        assert_eq!(Ok(State::Charging), tester.restore_slot_state(&mut board, 1, 3));
        board.set_adc(1, 512);
        tester.run_loop_iteration(&mut board);
        assert_eq!(true, board.charge_lines[1]);

        assert_eq!(
            Err(TesterError::InvalidSlot),
            tester.restore_slot_state(&mut board, 4, 1)
        );
    }

    #[test]
    fn test_reset_slot_releases_lines() {
        let mut board = MockBoard::new();
        let mut tester = BatteryTester::with_defaults();
        board.set_adc(0, 512);
        tester.run_loop_iteration(&mut board);
        tester.run_loop_iteration(&mut board);
        assert_eq!(true, board.charge_lines[0]);

        tester.reset_slot(&mut board, 0).unwrap();
        assert_eq!(false, board.charge_lines[0]);
        assert_eq!(&BatteryRecord::new(), tester.battery(0).unwrap());
        assert_eq!(Err(TesterError::InvalidSlot), tester.reset_slot(&mut board, 9));
    }
}
