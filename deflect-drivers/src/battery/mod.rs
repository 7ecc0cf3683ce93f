//! Battery voltage measurement

pub mod divider;

pub use divider::{AdcReader, DividerVoltageSensor};
