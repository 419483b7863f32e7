//! Angle and modulo arithmetic on the carousel circle. All angles are in degrees.

pub const FULL_TURN: f64 = 360.0;
pub const HALF_TURN: f64 = 180.0;

/// positive_modulo returns `value` wrapped into [0, |divisor|[. A divisor of zero (or any
/// non-finite input) yields 0.0 instead of NaN.
pub fn positive_modulo(value: f64, divisor: f64) -> f64 {
    if divisor == 0.0 || !divisor.is_finite() || !value.is_finite() {
        return 0.0;
    }

    let rem = value.rem_euclid(divisor);

    // rem_euclid may round up to the divisor itself for tiny negative values
    if rem >= divisor.abs() {
        0.0
    } else {
        rem
    }
}

/// wrap_index maps a logical (possibly negative) position onto an index in [0, len[. Returns 0
/// for len == 0.
pub fn wrap_index(position: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    position.rem_euclid(len as i64) as usize
}

/// normalize_angle wraps any angle into the centered range ]-180, 180].
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = positive_modulo(angle, FULL_TURN);

    if wrapped > HALF_TURN {
        wrapped - FULL_TURN
    } else {
        wrapped
    }
}

/// resolve_front_step returns the (unwrapped) slot step that is nearest to the front position
/// for the given rotation. It is 0 if the angle per slot is zero.
pub fn resolve_front_step(rotation: f64, angle_per_slot: f64) -> i64 {
    if angle_per_slot == 0.0 || !angle_per_slot.is_finite() || !rotation.is_finite() {
        return 0;
    }
    (-rotation / angle_per_slot).round() as i64
}

/// shortest_rotation returns the signed rotation of minimal magnitude that moves `current` onto
/// `target` (modulo a full turn). The result lies in ]-180, 180], i.e. an exact half turn is
/// always resolved as +180.
pub fn shortest_rotation(current: f64, target: f64) -> f64 {
    HALF_TURN - positive_modulo(current - target + HALF_TURN, FULL_TURN)
}

/// ease_out_cubic is the timing curve 1 - (1 - t)^3. t is clamped to [0, 1].
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    1.0 - (1.0 - t).powi(3)
}

/// angular_distance returns the unsigned distance between two angles along the circle in
/// [0, 180].
pub fn angular_distance(a: f64, b: f64) -> f64 {
    normalize_angle(a - b).abs()
}
