pub mod control_lines;
pub use control_lines::*;

pub mod internal_adc;
pub use internal_adc::*;

pub mod real_time_clock;
pub use real_time_clock::*;

pub mod serial;

pub mod thermometers;
pub use thermometers::*;
