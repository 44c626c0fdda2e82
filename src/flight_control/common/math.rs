use std::f64::consts::{PI, TAU};

/// Standard gravity used by the rocket equation, in m/s^2.
pub const G0: f64 = 9.80665;

/// Clamps `value` to the symmetric interval `[-limit, limit]`.
///
/// # Arguments
/// - `value`: The value to clamp.
/// - `limit`: The (non-negative) bound. A negative limit is treated as its absolute value.
///
/// # Returns
/// - The clamped value.
pub fn clamp_symmetric(value: f64, limit: f64) -> f64 {
    let lim = limit.abs();
    value.clamp(-lim, lim)
}

/// Wraps an angle in radians to `[0, 2*pi)`.
pub fn wrap_two_pi(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid may return TAU itself for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Wraps an angle in radians to `(-pi, pi]`.
pub fn wrap_pi(angle: f64) -> f64 {
    let wrapped = wrap_two_pi(angle);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// Linearly interpolates between `a` and `b`.
///
/// # Arguments
/// - `a`, `b`: The end points.
/// - `t`: The interpolation parameter, `0.0` yields `a`, `1.0` yields `b`. Not clamped.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 { a + (b - a) * t }

/// Positive real root of `a*x^2 + b*x + c = 0` with the larger value, if any.
pub fn larger_quadratic_root(a: f64, b: f64, c: f64) -> Option<f64> {
    if a.abs() <= f64::EPSILON {
        return if b.abs() <= f64::EPSILON { None } else { Some(-c / b) };
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let root = (-b + disc.sqrt()) / (2.0 * a);
    root.is_finite().then_some(root)
}
