//! 2D vector helpers on top of [`glam::DVec2`]
//!
//! Screen and world positions are both plain `DVec2` values. Everything here
//! is a pure function.

use glam::DVec2;

/// The origin / zero displacement
pub const ZERO: DVec2 = DVec2::ZERO;

/// Euclidean distance between two points
pub fn distance(a: DVec2, b: DVec2) -> f64 {
    (a - b).length()
}

/// Point halfway between `a` and `b`
pub fn midpoint(a: DVec2, b: DVec2) -> DVec2 {
    (a + b) * 0.5
}

/// Average of a set of points, `None` for an empty set
pub fn centroid(points: &[DVec2]) -> Option<DVec2> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(ZERO, |acc, p| acc + *p);
    Some(sum / points.len() as f64)
}

/// Component-wise division (`a.x / b.x`, `a.y / b.y`)
pub fn divide_elements(a: DVec2, b: DVec2) -> DVec2 {
    DVec2::new(a.x / b.x, a.y / b.y)
}

/// Component-wise absolute value
pub fn abs(v: DVec2) -> DVec2 {
    DVec2::new(v.x.abs(), v.y.abs())
}

/// Scale a vector by a scalar
pub fn scale(v: DVec2, factor: f64) -> DVec2 {
    v * factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        assert_eq!(distance(DVec2::new(0.0, 0.0), DVec2::new(3.0, 4.0)), 5.0);
        assert_eq!(distance(DVec2::new(1.0, 1.0), DVec2::new(1.0, 1.0)), 0.0);
    }

    #[test]
    fn test_midpoint_is_between_points() {
        let mid = midpoint(DVec2::new(100.0, 100.0), DVec2::new(300.0, 50.0));
        assert_eq!(mid, DVec2::new(200.0, 75.0));
    }

    #[test]
    fn test_centroid() {
        assert_eq!(centroid(&[]), None);

        let points = [
            DVec2::new(0.0, 0.0),
            DVec2::new(6.0, 0.0),
            DVec2::new(0.0, 3.0),
        ];
        assert_eq!(centroid(&points), Some(DVec2::new(2.0, 1.0)));
    }

    #[test]
    fn test_divide_elements_and_abs() {
        let v = divide_elements(DVec2::new(-10.0, 9.0), DVec2::new(2.0, 3.0));
        assert_eq!(v, DVec2::new(-5.0, 3.0));
        assert_eq!(abs(v), DVec2::new(5.0, 3.0));
        assert_eq!(scale(v, 2.0), DVec2::new(-10.0, 6.0));
    }
}
