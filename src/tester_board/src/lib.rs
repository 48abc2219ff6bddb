#![cfg_attr(not(test), no_std)]

// analog channels wired to battery bays, each with its own charge/discharge pair
pub const MAX_CHANNELS: usize = 8;
// control lines available to address the analog multiplexer
pub const MAX_MULTIPLEXER_LINES: u8 = 8;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AdcError {
    NotConfigured,
    ReadError,
    Timeout,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ThermometerError {
    DeviceNotFound,
    BusError,
    CrcMismatch,
    Timeout,
}

/// Services the battery tester needs from the hardware.
///
/// Channel numbers are analog channels (bays), not slot indexes: on boards
/// with a multiplexer several slots share one channel and its lines.
pub trait TesterBoard {
    fn serial_send(&mut self, string: &str);

    /// Wall clock in unix seconds.
    fn timestamp(&mut self) -> i64;

    /// One raw conversion of the voltage sense input for `channel`.
    /// Implementations must return within a bounded time.
    fn query_voltage_adc(&mut self, channel: u8) -> Result<u16, AdcError>;

    /// One temperature reading in degrees Celsius from the thermometer
    /// assigned to `channel`. Implementations must return within a bounded time.
    fn query_thermometer(&mut self, channel: u8) -> Result<f32, ThermometerError>;

    fn write_charge_line(&mut self, channel: u8, high: bool);
    fn write_discharge_line(&mut self, channel: u8, high: bool);

    /// Drive multiplexer control line `line`, counted from the base control pin.
    fn write_multiplexer_line(&mut self, line: u8, high: bool);
}

pub trait TesterBoardBuilder {
    fn setup(&mut self);
}
