// src/sensor/mod.rs

// HC-SR04 style trigger/echo ranging. The only busy-waits in the crate live
// here and are each bounded by the sonar timeout.
mod range_sensor;

pub use range_sensor::{pulse_width_to_cm, RangeSensor};
