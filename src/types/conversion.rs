use nalgebra as na;
use uom::si::{
    f64::Length,
    length::{meter, millimeter},
};

/// Raw values above this are taken to be millimeters by [`legacy_length`].
pub const LEGACY_MILLIMETER_THRESHOLD: f64 = 100.0;

/// Convert UOM Length to internal coordinate (meters)
#[inline]
pub fn to_coord(length: Length) -> f64 {
    length.get::<meter>()
}

/// Convert internal coordinate (meters) to UOM Length
#[inline]
pub fn from_coord(value: f64) -> Length {
    Length::new::<meter>(value)
}

/// Euclidean length of the diagonal spanned by two perpendicular edges.
pub fn hypotenuse(a: Length, b: Length) -> Length {
    from_coord(na::Vector2::new(to_coord(a), to_coord(b)).norm())
}

/// Round a rope length up to the next half meter: `ceil(m * 2) / 2`.
pub fn round_up_half_meter(length: Length) -> Length {
    from_coord((to_coord(length) * 2.0).ceil() / 2.0)
}

/// Interpret a unit-less rig measurement from a legacy record.
///
/// Values above [`LEGACY_MILLIMETER_THRESHOLD`] are millimeters, everything
/// else is meters. Only record ingest uses this; geometry never guesses.
pub fn legacy_length(raw: f64) -> Length {
    if raw > LEGACY_MILLIMETER_THRESHOLD {
        Length::new::<millimeter>(raw)
    } else {
        Length::new::<meter>(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hypotenuse() {
        let h = hypotenuse(from_coord(3.0), from_coord(4.0));
        assert_relative_eq!(to_coord(h), 5.0);

        let h = hypotenuse(from_coord(10.0), from_coord(4.0));
        assert_relative_eq!(to_coord(h), 10.770329614269007, epsilon = 1e-12);
    }

    #[test]
    fn test_round_up_half_meter() {
        assert_relative_eq!(to_coord(round_up_half_meter(from_coord(36.54))), 37.0);
        assert_relative_eq!(to_coord(round_up_half_meter(from_coord(36.4))), 36.5);
        assert_relative_eq!(to_coord(round_up_half_meter(from_coord(12.0))), 12.0);
        assert_relative_eq!(to_coord(round_up_half_meter(from_coord(0.01))), 0.5);
    }

    #[test]
    fn test_rounding_bounds_hold_across_range() {
        let mut raw = 0.0;
        while raw < 80.0 {
            let rounded = to_coord(round_up_half_meter(from_coord(raw)));
            assert!(rounded >= raw);
            assert!(rounded - raw < 0.5);
            assert_relative_eq!((rounded * 2.0).fract(), 0.0);
            raw += 0.137;
        }
    }

    #[test]
    fn test_legacy_length_threshold() {
        assert_relative_eq!(to_coord(legacy_length(11.0)), 11.0);
        assert_relative_eq!(to_coord(legacy_length(100.0)), 100.0);
        assert_relative_eq!(to_coord(legacy_length(11_000.0)), 11.0);
    }
}
