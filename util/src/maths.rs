//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::{Float, FloatConst};

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0) * (target_range.1 - target_range.0)
            / (source_range.1 - source_range.0))
}

/// Linearly interpolate between `a` and `b`, with `t = 0` giving `a` and `t = 1` giving `b`.
pub fn lerp<T>(a: T, b: T, t: T) -> T
where
    T: Float,
{
    a + (b - a) * t
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Wrap an angle into the range (-pi, pi].
pub fn wrap_pi<T>(angle: T) -> T
where
    T: Float + FloatConst,
{
    let tau = T::PI() + T::PI();

    let mut wrapped = rem_euclid(angle + T::PI(), tau) - T::PI();

    // rem_euclid gives [-pi, pi), move the lower bound over to pi
    if wrapped <= -T::PI() {
        wrapped = wrapped + tau;
    }

    wrapped
}

/// Get the shortest signed angular distance from `a` to `b`.
///
/// The result is in (-pi, pi], positive if `b` is anticlockwise of `a`.
pub fn get_ang_dist<T>(a: T, b: T) -> T
where
    T: Float + FloatConst,
{
    wrap_pi(b - a)
}

/// Interpolate between two angles along the shortest arc between them.
///
/// The returned angle is wrapped into (-pi, pi].
pub fn lerp_angle<T>(a: T, b: T, t: T) -> T
where
    T: Float + FloatConst,
{
    wrap_pi(a + get_ang_dist(a, b) * t)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn test_lin_map() {
        assert_relative_eq!(lin_map((0.0, 10.0), (0.0, 100.0), 2.5), 25.0);
        assert_relative_eq!(lin_map((-1.0, 1.0), (0.0, 4.0), 0.0), 2.0);
    }

    #[test]
    fn test_wrap_pi() {
        assert_relative_eq!(wrap_pi(0.0), 0.0);
        assert_relative_eq!(wrap_pi(PI), PI);
        assert_relative_eq!(wrap_pi(-PI), PI);
        assert_relative_eq!(wrap_pi(TAU + 1.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(wrap_pi(-TAU - 1.0), -1.0, epsilon = 1e-12);
        assert_relative_eq!(wrap_pi(1.5 * PI), -0.5 * PI, epsilon = 1e-12);
    }

    #[test]
    fn test_get_ang_dist() {
        assert_relative_eq!(get_ang_dist(1f64, 2f64), 1f64, epsilon = 1e-12);
        assert_relative_eq!(get_ang_dist(2f64, 1f64), -1f64, epsilon = 1e-12);
        assert_relative_eq!(get_ang_dist(0f64, TAU), 0f64, epsilon = 1e-12);
        assert_relative_eq!(get_ang_dist(1f64, TAU), -1f64, epsilon = 1e-12);
        assert_relative_eq!(get_ang_dist(TAU - 1f64, 1f64), 2f64, epsilon = 1e-12);
    }

    #[test]
    fn test_lerp_angle_takes_short_way() {
        let a = 350f64.to_radians();
        let b = 10f64.to_radians();

        // Half way between 350 and 10 degrees is 0, not 180
        assert_relative_eq!(lerp_angle(a, b, 0.5), 0.0, epsilon = 1e-12);
        assert_relative_eq!(lerp_angle(a, b, 0.25), -5f64.to_radians(), epsilon = 1e-12);
        assert_relative_eq!(lerp_angle(a, b, 1.0), b, epsilon = 1e-12);
    }
}
