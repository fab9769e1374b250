// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coercion of evaluated values to a property's declared type.

use crate::color::parse_color;
use crate::specification::{ArrayItem, PropertyType};
use crate::value::{Formatted, Value};

/// Coerces `value` to `ty` where an implicit conversion exists.
///
/// Strings become colors for color properties and formatted text for
/// formatted properties. Values with no conversion are returned unchanged so
/// that unvalidated input still reaches the consumer as authored.
#[must_use]
pub fn coerce(value: Value, ty: PropertyType) -> Value {
    match (ty, value) {
        (PropertyType::Color, Value::String(s)) => match parse_color(&s) {
            Some(color) => Value::Color(color),
            None => Value::String(s),
        },
        (PropertyType::Formatted, Value::String(s)) => Value::Formatted(Formatted::from_plain(s)),
        (PropertyType::Formatted, Value::Number(n)) => {
            Value::Formatted(Formatted::from_plain(n.to_string()))
        }
        (_, value) => value,
    }
}

/// Returns `true` if `value` is an instance of `ty`.
#[must_use]
pub fn is_instance(value: &Value, ty: PropertyType) -> bool {
    match ty {
        PropertyType::Number => matches!(value, Value::Number(_)),
        PropertyType::Boolean => matches!(value, Value::Bool(_)),
        PropertyType::String | PropertyType::ResolvedImage => matches!(value, Value::String(_)),
        PropertyType::Enum(values) => value.as_str().is_some_and(|s| values.contains(&s)),
        PropertyType::Color => matches!(value, Value::Color(_)),
        PropertyType::Formatted => matches!(value, Value::Formatted(_)),
        PropertyType::Array { item, length } => value.as_array().is_some_and(|items| {
            length.is_none_or(|len| items.len() == len)
                && items.iter().all(|v| match item {
                    ArrayItem::Number => matches!(v, Value::Number(_)),
                    ArrayItem::String => matches!(v, Value::String(_)),
                })
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_become_colors() {
        let red = coerce(Value::from("red"), PropertyType::Color);
        assert_eq!(red.as_color().map(|c| c.components), Some([1.0, 0.0, 0.0, 1.0]));
        let junk = coerce(Value::from("notacolor"), PropertyType::Color);
        assert_eq!(junk, Value::from("notacolor"));
    }

    #[test]
    fn strings_become_formatted() {
        let text = coerce(Value::from("label"), PropertyType::Formatted);
        assert_eq!(text.as_formatted().map(Formatted::to_plain_text).as_deref(), Some("label"));
    }

    #[test]
    fn array_instances_check_length() {
        let ty = PropertyType::Array {
            item: ArrayItem::Number,
            length: Some(2),
        };
        let pair = Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]);
        assert!(is_instance(&pair, ty));
        assert!(!is_instance(&Value::Array(vec![Value::Number(1.0)]), ty));
    }
}
