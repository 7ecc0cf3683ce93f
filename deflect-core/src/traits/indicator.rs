//! Target proximity indicator trait

use crate::feedback::ProximityClass;

/// Errors that can occur while driving the indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IndicatorError {
    /// The light could not be updated
    WriteFailed,
}

/// Trait for the visual proximity indicator
///
/// Writes are assumed expensive; callers only invoke `show` when the class
/// changes.
#[allow(async_fn_in_trait)]
pub trait IndicatorOutput {
    /// Display a proximity class
    async fn show(&mut self, class: ProximityClass) -> Result<(), IndicatorError>;
}
