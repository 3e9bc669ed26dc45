//! Elapsed time to km/h conversion.

use core::fmt;

/// Metres per second to kilometres per hour.
pub const MS_TO_KMH: f32 = 3.6;

/// Largest value the four-digit display can show.
pub const MAX_DISPLAY_VALUE: u16 = 9_999;

/// Reasons a capture cannot be turned into a speed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedError {
    /// Both strips fired within the same millisecond.
    ZeroElapsed,
}

impl fmt::Display for SpeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeedError::ZeroElapsed => f.write_str("zero elapsed time between triggers"),
        }
    }
}

/// Speed in km/h for an object covering `distance_m` in `elapsed_ms`.
///
/// # Errors
///
/// Returns [`SpeedError::ZeroElapsed`] when `elapsed_ms` is zero.
#[allow(clippy::cast_precision_loss)]
pub fn speed_kmh(elapsed_ms: u32, distance_m: f32) -> Result<f32, SpeedError> {
    if elapsed_ms == 0 {
        return Err(SpeedError::ZeroElapsed);
    }
    // f32 keeps millisecond resolution up to ~4.6 hours, far beyond any transit.
    let time_s = elapsed_ms as f32 / 1_000.0;
    Ok(distance_m / time_s * MS_TO_KMH)
}

/// Rounds half up and clamps to what the display can show.
///
/// NaN maps to zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn display_value(speed_kmh: f32) -> u16 {
    // Float-to-int `as` saturates, so infinities land on the clamp bounds.
    let rounded = (speed_kmh + 0.5) as i32;
    rounded.clamp(0, i32::from(MAX_DISPLAY_VALUE)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        let diff = if a > b { a - b } else { b - a };
        let scale = if b > 1.0 { b } else { 1.0 };
        diff <= 1e-4 * scale
    }

    #[test]
    fn converts_reference_capture() {
        let speed = speed_kmh(600, 0.6).expect("non-zero elapsed");
        assert!(close(speed, 3.6), "speed was {speed}");
        assert_eq!(display_value(speed), 4);
    }

    #[test]
    fn matches_formula_over_range() {
        for elapsed in [1_u32, 7, 50, 333, 1_000, 12_345, 600_000] {
            let expected = (0.6 / (elapsed as f32 / 1_000.0)) * 3.6;
            let speed = speed_kmh(elapsed, 0.6).expect("non-zero elapsed");
            assert!(close(speed, expected), "{elapsed}ms -> {speed}");
        }
    }

    #[test]
    fn speed_decreases_as_elapsed_grows() {
        let mut previous = f32::INFINITY;
        for elapsed in 1..2_000_u32 {
            let speed = speed_kmh(elapsed, 2.5).expect("non-zero elapsed");
            assert!(speed < previous);
            previous = speed;
        }
    }

    #[test]
    fn zero_elapsed_is_rejected() {
        assert_eq!(speed_kmh(0, 0.6), Err(SpeedError::ZeroElapsed));
    }

    #[test]
    fn display_value_rounds_half_up() {
        assert_eq!(display_value(3.49), 3);
        assert_eq!(display_value(3.5), 4);
        assert_eq!(display_value(0.0), 0);
    }

    #[test]
    fn display_value_clamps() {
        assert_eq!(display_value(9_999.4), 9_999);
        assert_eq!(display_value(9_999.5), 9_999);
        assert_eq!(display_value(21_600.0), 9_999);
        assert_eq!(display_value(f32::INFINITY), 9_999);
        assert_eq!(display_value(-0.4), 0);
        assert_eq!(display_value(-25.0), 0);
        assert_eq!(display_value(f32::NEG_INFINITY), 0);
        assert_eq!(display_value(f32::NAN), 0);
    }
}
