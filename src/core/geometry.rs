// Angle and vector math over 2D points in pixel space

use serde::{Deserialize, Serialize};

/// Floor for norm products so coincident points never divide by zero
pub const EPSILON: f64 = 1e-8;

/// A point in pixel space (x grows right, y grows down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn sub(self, other: Point2) -> (f64, f64) {
        (self.x - other.x, self.y - other.y)
    }
}

/// Angle at vertex `b` between rays `b→a` and `b→c`, in degrees within [0, 180].
///
/// Coincident points do not fault: the denominator is floored at [`EPSILON`],
/// so the result is defined but meaningless. Use
/// [`is_degenerate`] to detect that case.
pub fn angle(a: Point2, b: Point2, c: Point2) -> f64 {
    let (bax, bay) = a.sub(b);
    let (bcx, bcy) = c.sub(b);

    let dot = bax * bcx + bay * bcy;
    let norms = bax.hypot(bay) * bcx.hypot(bcy);
    let cosine = (dot / norms.max(EPSILON)).clamp(-1.0, 1.0);

    cosine.acos().to_degrees()
}

/// True when either limb vector of the angle at `b` has (near) zero length
pub fn is_degenerate(a: Point2, b: Point2, c: Point2) -> bool {
    let (bax, bay) = a.sub(b);
    let (bcx, bcy) = c.sub(b);
    bax.hypot(bay) < EPSILON || bcx.hypot(bcy) < EPSILON
}

/// Signed angle of the vector `p1→p2` against the horizontal axis, in degrees (−180, 180]
pub fn signed_tilt(p1: Point2, p2: Point2) -> f64 {
    let (dx, dy) = p2.sub(p1);
    dy.atan2(dx).to_degrees()
}

/// Tilt of `p1→p2` against the horizontal regardless of which way the body
/// faces, in degrees [−90, 90]. Negative means `p2` sits higher in the image.
pub fn horizontal_tilt(p1: Point2, p2: Point2) -> f64 {
    let facing_right = Point2::new(p1.x + (p2.x - p1.x).abs(), p2.y);
    signed_tilt(p1, facing_right)
}

/// Canonical external representation of a metric value
pub fn format_two_decimals(value: f64) -> String {
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_right_angle() {
        assert!(approx(angle(p(1.0, 0.0), p(0.0, 0.0), p(0.0, 1.0)), 90.0));
        assert!(approx(angle(p(10.0, 10.0), p(0.0, 10.0), p(0.0, 0.0)), 90.0));
    }

    #[test]
    fn test_collinear_between_is_straight() {
        assert!(approx(angle(p(0.0, 0.0), p(5.0, 5.0), p(10.0, 10.0)), 180.0));
        assert!(approx(angle(p(-3.0, 2.0), p(0.0, 2.0), p(7.0, 2.0)), 180.0));
    }

    #[test]
    fn test_same_direction_is_zero() {
        assert!(approx(angle(p(2.0, 0.0), p(0.0, 0.0), p(5.0, 0.0)), 0.0));
        assert!(approx(angle(p(1.0, 1.0), p(0.0, 0.0), p(3.0, 3.0)), 0.0));
    }

    #[test]
    fn test_angle_range_and_symmetry() {
        let points = [
            p(0.0, 0.0),
            p(12.5, -3.0),
            p(-7.0, 4.25),
            p(100.0, 100.0),
            p(3.0, 3.0001),
            p(-50.0, -0.5),
        ];
        for a in points {
            for b in points {
                for c in points {
                    if is_degenerate(a, b, c) {
                        continue;
                    }
                    let forward = angle(a, b, c);
                    let backward = angle(c, b, a);
                    assert!((0.0..=180.0).contains(&forward));
                    assert!(approx(forward, backward));
                }
            }
        }
    }

    #[test]
    fn test_degenerate_is_defined() {
        let same = p(4.0, 4.0);
        assert!(is_degenerate(same, same, p(9.0, 1.0)));
        let value = angle(same, same, p(9.0, 1.0));
        assert!(value.is_finite());
        assert!((0.0..=180.0).contains(&value));

        let value = angle(same, same, same);
        assert!(value.is_finite());
        assert!(!is_degenerate(p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)));
    }

    #[test]
    fn test_signed_tilt() {
        assert!(approx(signed_tilt(p(0.0, 0.0), p(1.0, 0.0)), 0.0));
        assert!(approx(signed_tilt(p(0.0, 0.0), p(1.0, 1.0)), 45.0));
        assert!(approx(signed_tilt(p(0.0, 0.0), p(1.0, -1.0)), -45.0));
        assert!(approx(signed_tilt(p(0.0, 0.0), p(-1.0, 0.0)), 180.0));
        assert!(approx(signed_tilt(p(0.0, 0.0), p(0.0, 1.0)), 90.0));
    }

    #[test]
    fn test_horizontal_tilt_ignores_facing() {
        let hip = Point2::new(300.0, 210.0);
        let right = horizontal_tilt(hip, Point2::new(400.0, 200.0));
        let left = horizontal_tilt(hip, Point2::new(200.0, 200.0));
        assert!((right - left).abs() < 1e-9);
        assert!(right < 0.0 && right > -10.0);

        // Shoulders just above and just below a left-facing hip stay near level
        let above = horizontal_tilt(hip, Point2::new(200.0, 209.0));
        let below = horizontal_tilt(hip, Point2::new(200.0, 211.0));
        assert!(above.abs() < 1.0 && below.abs() < 1.0);
        assert!((above + below).abs() < 1e-9);

        assert!((horizontal_tilt(hip, Point2::new(300.0, 100.0)) + 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_decimal_rounding_law() {
        let values = [165.0, 164.99999, 0.004, 179.995_1, 12.345_678, -8.765_4, 0.0];
        for value in values {
            let formatted = format_two_decimals(value);
            let parsed: f64 = formatted.parse().unwrap();
            assert!((parsed - value).abs() <= 0.005 + 1e-12, "{} -> {}", value, formatted);
        }
        assert_eq!(format_two_decimals(165.0), "165.00");
        assert_eq!(format_two_decimals(-3.14159), "-3.14");
    }
}
