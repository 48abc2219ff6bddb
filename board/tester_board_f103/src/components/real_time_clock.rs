use ds323x::{ic, interface::I2cInterface, DateTimeAccess, Ds323x, NaiveDate, NaiveDateTime};
use rtt_target::rprintln;

use crate::BoardI2c1;

type Ds3231 = Ds323x<I2cInterface<BoardI2c1>, ic::DS3231>;

// time the clock is started from after its oscillator has stopped
const DEFAULT_YEAR: i32 = 2024;

pub struct RealTimeClock {
    rtc: Ds3231,
    last_timestamp: i64,
}

impl RealTimeClock {
    pub fn setup(i2c: BoardI2c1) -> Self {
        let mut clock = RealTimeClock {
            rtc: Ds323x::new_ds3231(i2c),
            last_timestamp: 0,
        };

        match clock.rtc.has_been_stopped() {
            Ok(false) => {}
            Ok(true) => clock.reset_to_default(),
            Err(_) => rprintln!("real time clock not responding"),
        }

        clock.last_timestamp = clock.timestamp();
        clock
    }

    fn reset_to_default(&mut self) {
        rprintln!("real time clock was stopped, resetting");
        let Some(default_time) = default_datetime() else {
            return;
        };
        if self.rtc.set_datetime(&default_time).is_err() {
            rprintln!("unable to set real time clock");
            return;
        }
        if self.rtc.clear_has_been_stopped_flag().is_err() {
            rprintln!("unable to clear real time clock stop flag");
        }
    }

    /// Unix seconds. A failed read returns the last good reading.
    pub fn timestamp(&mut self) -> i64 {
        match self.rtc.datetime() {
            Ok(datetime) => {
                self.last_timestamp = datetime.timestamp();
            }
            Err(_) => rprintln!("real time clock read failed"),
        }
        self.last_timestamp
    }
}

fn default_datetime() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(DEFAULT_YEAR, 1, 1)?.and_hms_opt(0, 0, 0)
}
