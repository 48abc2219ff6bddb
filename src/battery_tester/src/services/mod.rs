pub mod clock_service;
pub mod line_service;
pub mod sensor_service;
