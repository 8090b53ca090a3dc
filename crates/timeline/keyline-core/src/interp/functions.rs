//! Interpolation helpers:
//! - step_value (hold semantics)
//! - linear_value (numeric lerp, bools step)
//! - eased_value (timing curve -> linear blend)

use crate::interp::ease::Ease;
use crate::value::Value;

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Step interpolation: choose left value.
#[inline]
pub fn step_value(a: &Value) -> Value {
    *a
}

/// Linear interpolation across Value kinds. Bools never blend.
pub fn linear_value(a: &Value, b: &Value, t: f32) -> Value {
    match (a, b) {
        (Value::Number(va), Value::Number(vb)) => Value::Number(lerp_f32(*va, *vb, t)),
        // Fallback: bools and mismatched kinds hold the left value (fail-soft).
        _ => *a,
    }
}

/// Apply `ease` to the segment-local `t`, then blend. `none` holds the left value.
pub fn eased_value(a: &Value, b: &Value, t: f32, ease: Ease) -> Value {
    if ease.is_hold() {
        return step_value(a);
    }
    linear_value(a, b, ease.apply(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_blends_numbers() {
        let v = linear_value(&Value::Number(0.0), &Value::Number(100.0), 0.25);
        assert_eq!(v, Value::Number(25.0));
    }

    #[test]
    fn bools_hold_left() {
        let v = linear_value(&Value::Bool(false), &Value::Bool(true), 0.99);
        assert_eq!(v, Value::Bool(false));
    }

    #[test]
    fn hold_ease_keeps_left_value() {
        let v = eased_value(&Value::Number(1.0), &Value::Number(9.0), 0.5, Ease::Hold);
        assert_eq!(v, Value::Number(1.0));
    }
}
