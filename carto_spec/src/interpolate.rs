// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interpolation between evaluated values.
//!
//! Arrays of different lengths interpolate element-wise over the shorter
//! length; trailing elements of the longer operand are dropped.

use crate::color::Color;
use crate::specification::{ArrayItem, PropertyType};
use crate::value::Value;

/// An interpolation function over values of one declared type.
pub type Interpolator = fn(&Value, &Value, f64) -> Value;

/// Linearly interpolates two numbers.
#[must_use]
#[inline]
pub fn number(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Interpolates two colors component-wise, alpha included.
#[must_use]
pub fn color(a: Color, b: Color, t: f64) -> Color {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "color components are stored as f32"
    )]
    let t = t as f32;
    let mut out = [0.0_f32; 4];
    for (i, c) in out.iter_mut().enumerate() {
        *c = a.components[i] + (b.components[i] - a.components[i]) * t;
    }
    Color::new(out)
}

/// Interpolates two arrays element-wise over the shorter length.
///
/// Non-numeric element pairs take the element from `a`.
#[must_use]
pub fn array(a: &[Value], b: &[Value], t: f64) -> Vec<Value> {
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Value::Number(x), Value::Number(y)) => Value::Number(number(*x, *y, t)),
            _ => x.clone(),
        })
        .collect()
}

/// Interpolates two values of the same runtime type.
///
/// Returns `None` if the values are not both numbers, colors, or arrays.
#[must_use]
pub fn value(a: &Value, b: &Value, t: f64) -> Option<Value> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Some(Value::Number(number(*x, *y, t))),
        (Value::Color(x), Value::Color(y)) => Some(Value::Color(color(*x, *y, t))),
        (Value::Array(x), Value::Array(y)) => Some(Value::Array(array(x, y, t))),
        _ => None,
    }
}

/// Returns the interpolation function for a declared type, if one exists.
///
/// ```rust
/// use carto_spec::{PropertyType, Value, interpolate};
///
/// let lerp = interpolate::for_type(PropertyType::Number).unwrap();
/// assert_eq!(lerp(&Value::Number(0.8), &Value::Number(1.0), 0.5), Value::Number(0.9));
/// assert!(interpolate::for_type(PropertyType::String).is_none());
/// ```
#[must_use]
pub fn for_type(ty: PropertyType) -> Option<Interpolator> {
    match ty {
        PropertyType::Number
        | PropertyType::Color
        | PropertyType::Array {
            item: ArrayItem::Number,
            ..
        } => Some(same_type),
        PropertyType::Boolean
        | PropertyType::String
        | PropertyType::Enum(_)
        | PropertyType::Array {
            item: ArrayItem::String,
            ..
        }
        | PropertyType::Formatted
        | PropertyType::ResolvedImage => None,
    }
}

fn same_type(a: &Value, b: &Value, t: f64) -> Value {
    value(a, b, t).unwrap_or_else(|| a.clone())
}

/// Returns the interpolation ratio of `input` between `lower` and `upper`
/// for an exponential curve with the given `base`.
///
/// A base of `1` is linear.
#[must_use]
pub fn interpolation_factor(input: f64, base: f64, lower: f64, upper: f64) -> f64 {
    let difference = upper - lower;
    let progress = input - lower;
    if difference == 0.0 {
        0.0
    } else if base == 1.0 {
        progress / difference
    } else {
        (base.powf(progress) - 1.0) / (base.powf(difference) - 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_interpolate_per_component() {
        let white = Color::new([1.0, 1.0, 1.0, 1.0]);
        let red = Color::new([1.0, 0.0, 0.0, 1.0]);
        assert_eq!(color(white, red, 0.5).components, [1.0, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn arrays_of_different_length_clamp_to_shorter() {
        let a = [Value::Number(0.0), Value::Number(10.0), Value::Number(4.0)];
        let b = [Value::Number(2.0), Value::Number(20.0)];
        assert_eq!(
            array(&a, &b, 0.5),
            vec![Value::Number(1.0), Value::Number(15.0)]
        );
        assert_eq!(array(&b, &a, 0.5).len(), 2);
    }

    #[test]
    fn mismatched_types_do_not_interpolate() {
        assert!(value(&Value::Number(1.0), &Value::from("x"), 0.5).is_none());
        let lerp = for_type(PropertyType::Number).unwrap();
        assert_eq!(lerp(&Value::Number(1.0), &Value::Null, 0.5), Value::Number(1.0));
    }

    #[test]
    fn exponential_factor() {
        assert_eq!(interpolation_factor(5.0, 1.0, 0.0, 10.0), 0.5);
        assert_eq!(interpolation_factor(3.0, 2.0, 3.0, 3.0), 0.0);
        let f = interpolation_factor(1.0, 2.0, 0.0, 2.0);
        assert!((f - 1.0 / 3.0).abs() < 1e-12);
    }
}
