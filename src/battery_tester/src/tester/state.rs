#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    Default = 0, // after inserting a new battery or resetting the device
    Idle = 1,
    Tested = 2,
    Charging = 3,
    Discharging = 4,
    Overheated = 5,
}

impl State {
    pub fn to_u8(&self) -> u8 {
        *self as u8
    }

    pub fn from_u8(value: u8) -> Option<State> {
        match value {
            0 => Some(State::Default),
            1 => Some(State::Idle),
            2 => Some(State::Tested),
            3 => Some(State::Charging),
            4 => Some(State::Discharging),
            5 => Some(State::Overheated),
            _ => None,
        }
    }
}

/// Status annotations written to the log sink.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Annotation {
    Default,
    Idle,
    Tested,
    Charging,
    Discharging,
    Broken,
}

pub fn annotation_text(annotation: &Annotation) -> &'static str {
    match annotation {
        Annotation::Default => "Default",
        Annotation::Idle => "Idle",
        Annotation::Tested => "Tested",
        Annotation::Charging => "Charging",
        Annotation::Discharging => "Discharging",
        Annotation::Broken => "Broken",
    }
}
