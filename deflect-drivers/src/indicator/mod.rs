//! Target indicator drivers

pub mod rgb;

pub use rgb::{class_color, PixelWriter, Rgb, RgbIndicator};
