use crate::services::clock_service::{compare, Timestamp};
use crate::services::sensor_service::Measurement;

use super::record::BatteryRecord;
use super::settings::TesterSettings;
use super::state::{Annotation, State};

/// Line change requested by a handler for the slot it just processed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LineCommand {
    StartCharging,
    StopCharging,
    StartDischarging,
    StopDischarging,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Outcome {
    pub record: BatteryRecord,
    pub command: Option<LineCommand>,
    pub annotation: Option<Annotation>,
}

impl Outcome {
    fn hold(record: BatteryRecord) -> Self {
        Outcome {
            record,
            command: None,
            annotation: None,
        }
    }

    fn goto(mut self, state: State) -> Self {
        self.record.state = state;
        self
    }

    fn command(mut self, command: LineCommand) -> Self {
        self.command = Some(command);
        self
    }

    fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotation = Some(annotation);
        self
    }
}

/// Advances one slot by a single tick.
///
/// The measurement must have been taken with `record.sampling()`. The returned
/// record has `previous_state` set to the state that was dispatched on.
pub fn transition(
    record: &BatteryRecord,
    measurement: Measurement,
    now: Timestamp,
    settings: &TesterSettings,
) -> Outcome {
    let mut next = *record;
    if record.state == State::Default {
        next = BatteryRecord::new();
    }
    next.apply(measurement);

    let mut outcome = match record.state {
        State::Default => default_tick(next, settings),
        State::Idle => idle_tick(next, now, settings),
        State::Tested => tested_tick(next),
        State::Charging => charging_tick(next, settings),
        State::Discharging => discharging_tick(next, settings),
        State::Overheated => overheated_tick(next, settings),
    };
    outcome.record.previous_state = record.state;
    outcome
}

fn default_tick(record: BatteryRecord, settings: &TesterSettings) -> Outcome {
    let outcome = Outcome::hold(record).annotate(Annotation::Default);
    if record.voltage > settings.charged_voltage {
        outcome.goto(State::Idle)
    } else {
        outcome.goto(State::Charging)
    }
}

fn idle_tick(mut record: BatteryRecord, now: Timestamp, settings: &TesterSettings) -> Outcome {
    let entered = record.entered();
    if entered {
        record.alarm_time = now + settings.idle_delay_s;
    }

    let mut outcome = Outcome::hold(record);
    if entered {
        outcome = outcome.annotate(Annotation::Idle);
    }

    let alarm_due = compare(now, record.alarm_time) >= 0;
    if alarm_due && record.voltage >= settings.resume_voltage() {
        if settings.toggles.discharge_after_rest() && !record.cycle_finished {
            return outcome.goto(State::Discharging);
        }
        return outcome.goto(State::Charging);
    }
    outcome
}

fn tested_tick(record: BatteryRecord) -> Outcome {
    if record.arrived_tested() && !record.broken {
        return Outcome::hold(record).annotate(Annotation::Tested);
    }
    Outcome::hold(record)
}

fn charging_tick(record: BatteryRecord, settings: &TesterSettings) -> Outcome {
    let outcome = Outcome::hold(record);
    if record.temperature >= settings.overheat_temperature {
        return outcome
            .command(LineCommand::StopCharging)
            .goto(State::Overheated);
    }

    // asserted every tick: a sibling slot on the same channel may have released it
    let outcome = outcome.command(LineCommand::StartCharging);
    let outcome = if record.entered() {
        outcome.annotate(Annotation::Charging)
    } else {
        outcome
    };

    if record.cycle_finished && record.voltage >= settings.settle_voltage {
        return outcome
            .command(LineCommand::StopCharging)
            .goto(State::Tested);
    }
    if !record.cycle_finished && record.voltage >= settings.charged_voltage {
        return outcome.command(LineCommand::StopCharging).goto(State::Idle);
    }
    outcome
}

fn discharging_tick(mut record: BatteryRecord, settings: &TesterSettings) -> Outcome {
    let entered = record.entered();
    let discharged = record.voltage <= settings.discharged_voltage;
    if discharged {
        record.cycle_finished = true;
    }

    let mut outcome = Outcome::hold(record).command(LineCommand::StartDischarging);
    if entered {
        outcome = outcome.annotate(Annotation::Discharging);
    }
    if discharged {
        return outcome
            .command(LineCommand::StopDischarging)
            .goto(State::Charging);
    }
    outcome
}

fn overheated_tick(mut record: BatteryRecord, settings: &TesterSettings) -> Outcome {
    record.overheat_count = record.overheat_count.saturating_add(1);
    if record.overheat_count > settings.max_overheated {
        record.broken = true;
        return Outcome::hold(record)
            .annotate(Annotation::Broken)
            .goto(State::Tested);
    }
    Outcome::hold(record).goto(State::Idle)
}
