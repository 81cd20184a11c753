use geovision_core::{CompassLabel, Direction};

/// Convert a heading in degrees to an 8-point compass label.
///
/// The heading is normalized into `[0, 360)` before rounding half away from
/// zero, so `compass(d + 360.0) == compass(d)` and negative headings never
/// produce negative degrees. Non-finite input maps to North (0°).
pub fn compass(degrees: f64) -> CompassLabel {
    if !degrees.is_finite() {
        return CompassLabel {
            direction: Direction::North,
            degrees: 0,
        };
    }

    let rounded = (degrees.rem_euclid(360.0).round() as i64).rem_euclid(360);
    let index = ((rounded as f64 / 45.0).round() as usize) % Direction::ALL.len();

    CompassLabel {
        direction: Direction::ALL[index],
        degrees: rounded as u16,
    }
}
