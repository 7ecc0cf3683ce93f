//! RGB target indicator
//!
//! Maps each proximity class to a fixed colour on a single RGB light.
//! No channel exceeds a quarter of full scale.

use deflect_core::feedback::ProximityClass;
use deflect_core::traits::{IndicatorError, IndicatorOutput};

/// An RGB colour, 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// PWM compare values (red, green, blue) for a counter wrapping at `top`
    pub fn compare_values(self, top: u16) -> [u16; 3] {
        let scale = |level: u8| (u32::from(level) * u32::from(top) / 255) as u16;
        [scale(self.r), scale(self.g), scale(self.b)]
    }
}

/// Colour shown for a proximity class
pub fn class_color(class: ProximityClass) -> Rgb {
    match class {
        ProximityClass::Off => Rgb::new(0, 0, 0),
        ProximityClass::Green => Rgb::new(0, 64, 0),
        ProximityClass::Blue => Rgb::new(0, 0, 64),
        ProximityClass::Cyan => Rgb::new(0, 32, 64),
        ProximityClass::Yellow => Rgb::new(64, 48, 0),
        ProximityClass::Orange => Rgb::new(64, 16, 0),
        ProximityClass::Red => Rgb::new(64, 0, 0),
    }
}

/// Trait for the physical light
pub trait PixelWriter {
    /// Show a colour
    #[allow(clippy::result_unit_err)]
    fn write(&mut self, color: Rgb) -> Result<(), ()>;
}

/// Proximity indicator on one RGB light
pub struct RgbIndicator<P> {
    pixel: P,
}

impl<P: PixelWriter> RgbIndicator<P> {
    pub fn new(pixel: P) -> Self {
        Self { pixel }
    }
}

impl<P: PixelWriter> IndicatorOutput for RgbIndicator<P> {
    async fn show(&mut self, class: ProximityClass) -> Result<(), IndicatorError> {
        self.pixel
            .write(class_color(class))
            .map_err(|_| IndicatorError::WriteFailed)
    }
}
