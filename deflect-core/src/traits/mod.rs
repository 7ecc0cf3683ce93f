//! Hardware abstraction traits
//!
//! These traits define the interface between the telemetry core and the
//! board-specific drivers.

pub mod indicator;
pub mod sensor;

pub use indicator::{IndicatorError, IndicatorOutput};
pub use sensor::{AngleSensor, SensorError, VoltageSensor};
