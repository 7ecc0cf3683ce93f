//! Target proximity classes

/// Deviation from the target angle, ordered by severity
///
/// `Off` means tracking is disabled and sits outside the severity ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProximityClass {
    Off,
    Green,
    Blue,
    Cyan,
    Yellow,
    Orange,
    Red,
}

/// Upper bound (inclusive, degrees) of each band, tightest first
const BANDS: [(f32, ProximityClass); 5] = [
    (0.1, ProximityClass::Green),
    (0.5, ProximityClass::Blue),
    (1.0, ProximityClass::Cyan),
    (2.0, ProximityClass::Yellow),
    (5.0, ProximityClass::Orange),
];

impl ProximityClass {
    /// Classify an absolute deviation in degrees
    ///
    /// A value exactly on a boundary belongs to the tighter band.
    pub fn from_diff(diff_deg: f32) -> Self {
        BANDS
            .iter()
            .find(|(limit, _)| diff_deg <= *limit)
            .map(|&(_, class)| class)
            .unwrap_or(ProximityClass::Red)
    }

    /// Whether a target is being tracked
    pub fn is_tracking(self) -> bool {
        self != ProximityClass::Off
    }
}
