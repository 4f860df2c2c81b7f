//! Saturating fixed-point arithmetic. Values are signed 32-bit with a
//! model-owned number of fractional bits. Overflow saturates, never wraps:
//! the dynamics are recurrent, and wraparound would inject spurious energy.

pub fn from_int(value: i32, frac: u32) -> i32 {
    value << frac
}

pub fn to_f32(value: i32, frac: u32) -> f32 {
    value as f32 / (1i64 << frac) as f32
}

/// Fixed-point multiply with an i64 intermediate. The shift rounds toward
/// negative infinity, matching a hardware arithmetic right shift.
pub fn mul(a: i32, b: i32, frac: u32) -> i32 {
    sat((a as i64 * b as i64) >> frac)
}

pub fn sat(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

pub fn clamp(value: i64, min: i32, max: i32) -> i32 {
    value.clamp(min as i64, max as i64) as i32
}

/// The window whose integer part fits an i8, so the 8-bit membrane view is
/// always representable.
pub fn signed_window(frac: u32) -> (i32, i32) {
    (-(128 << frac), (127 << frac) | ((1 << frac) - 1))
}
