//! Periodic producers
//!
//! Sensor sampling loops reduced to one step each; the firmware owns the
//! timers.

pub mod battery;
pub mod primary;

pub use battery::BatteryProducer;
pub use primary::{PrimarySample, PrimarySampler};
