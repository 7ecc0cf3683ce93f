//! Angle and voltage sensor traits

/// Errors that can occur while sampling a sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Bus transfer failed (I2C NACK, ADC conversion error)
    Bus,
    /// Device did not identify itself
    NotResponding,
    /// Reading outside the physically possible range
    OutOfRange,
}

/// Trait for the local tilt sensor
///
/// Implementations return the deflection angle in degrees; sign follows the
/// mounting orientation.
#[allow(async_fn_in_trait)]
pub trait AngleSensor {
    /// Read the current angle in degrees
    async fn read_angle(&mut self) -> Result<f32, SensorError>;
}

/// Trait for battery voltage measurement
#[allow(async_fn_in_trait)]
pub trait VoltageSensor {
    /// Read the battery voltage in millivolts
    ///
    /// Scaling (divider ratio, reference voltage) is applied by the
    /// implementation.
    async fn read_millivolts(&mut self) -> Result<f32, SensorError>;
}
