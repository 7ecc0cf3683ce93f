//! Angle to linear travel conversion
//!
//! The trailing edge of a surface with chord `c` rotated by `a` degrees
//! moves along a chord of the circle it sweeps:
//!
//! ```text
//! travel = c * sin(a / 2) * 2
//! ```
//!
//! The remote sensor node applies the same conversion, so the constant and
//! evaluation order below must not change or the two channels drift apart.

/// Chord length used until an operator sets one (mm)
pub const DEFAULT_CHORD_MM: u16 = 50;

/// Value of pi shared with the remote node
#[allow(clippy::approx_constant)]
const PI: f64 = 3.14159265359;

/// Linear travel (mm) of the trailing edge for a deflection angle in degrees
///
/// Evaluated in double precision. A chord length of 0 yields 0.
pub fn travel(angle_deg: f32, chord_mm: u16) -> f32 {
    let half_angle_rad = angle_deg as f64 * (2.0 * PI) / 360.0 / 2.0;
    (chord_mm as f64 * libm::sin(half_angle_rad) * 2.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reference(angle_deg: f32, chord_mm: u16) -> f64 {
        let radians = angle_deg as f64 * core::f64::consts::PI / 180.0;
        chord_mm as f64 * libm::sin(radians / 2.0) * 2.0
    }

    #[test]
    fn test_zero_angle_is_zero_travel() {
        assert_eq!(travel(0.0, 50), 0.0);
        assert_eq!(travel(0.0, 0), 0.0);
    }

    #[test]
    fn test_zero_chord_is_zero_travel() {
        assert_eq!(travel(37.5, 0), 0.0);
    }

    #[test]
    fn test_ten_degrees_on_default_chord() {
        let mm = travel(10.0, DEFAULT_CHORD_MM);
        assert!(libm::fabsf(mm - 8.7156) < 1e-3, "travel = {}", mm);
    }

    #[test]
    fn test_negative_angle_moves_the_other_way() {
        assert_eq!(travel(-12.0, 80), -travel(12.0, 80));
    }

    proptest! {
        #[test]
        fn test_matches_chord_formula(angle in -180.0f32..180.0, chord in 0u16..1000) {
            let expected = reference(angle, chord);
            let actual = travel(angle, chord) as f64;
            prop_assert!(libm::fabs(actual - expected) <= 1e-4 * (1.0 + libm::fabs(expected)));
        }

        #[test]
        fn test_travel_never_exceeds_twice_chord(angle in -720.0f32..720.0, chord in 0u16..1000) {
            prop_assert!(libm::fabsf(travel(angle, chord)) <= 2.0 * chord as f32 + 1e-3);
        }
    }
}
