use core::cmp::Ordering;
use core::ops::Add;

use tester_board::TesterBoard;

/// Wall clock reading in unix seconds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub fn seconds(&self) -> i64 {
        self.0
    }
}

impl Add<u32> for Timestamp {
    type Output = Timestamp;

    fn add(self, seconds: u32) -> Timestamp {
        Timestamp(self.0.saturating_add(seconds as i64))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AlarmOffset {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl AlarmOffset {
    pub const fn new(hours: u8, minutes: u8, seconds: u8) -> Self {
        AlarmOffset {
            hours,
            minutes,
            seconds,
        }
    }

    pub const fn as_seconds(&self) -> u32 {
        ((self.hours as u32 * 60) + self.minutes as u32) * 60 + self.seconds as u32
    }
}

pub fn now(board: &mut impl TesterBoard) -> Timestamp {
    Timestamp(board.timestamp())
}

/// -1 if a is earlier than b, 1 if later, 0 if equal
pub fn compare(a: Timestamp, b: Timestamp) -> i8 {
    match a.cmp(&b) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}
