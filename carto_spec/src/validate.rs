// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Up-front validation of authored property values.

use serde_json::Value as Json;

use crate::coerce::{coerce, is_instance};
use crate::error::ExpressionError;
use crate::expression::Expr;
use crate::function;
use crate::specification::PropertySpecification;
use crate::style_expression::StylePropertyExpression;
use crate::value::Value;

/// Checks that `json` is an acceptable value for `spec`.
///
/// `null` is always accepted and means "reset to default". Literals must be
/// instances of the declared type after implicit coercion. Functions and
/// expressions must normalize.
///
/// # Errors
///
/// Returns the first problem found.
pub fn validate(json: &Json, spec: &PropertySpecification) -> Result<(), ExpressionError> {
    if json.is_null() {
        return Ok(());
    }
    if function::is_function(json) || Expr::is_expression(json) {
        StylePropertyExpression::normalize(Some(json), spec)?;
        return Ok(());
    }
    let value = coerce(Value::from_json(json), spec.ty());
    if is_instance(&value, spec.ty()) {
        Ok(())
    } else {
        Err(ExpressionError::mismatch(
            spec.name(),
            format!("{:?}", spec.ty()),
            json,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specification::{ArrayItem, PropertyType};
    use serde_json::json;

    #[test]
    fn literals_are_type_checked() {
        let color = PropertySpecification::builder("fill-color", PropertyType::Color).build();
        assert!(validate(&json!("red"), &color).is_ok());
        assert!(validate(&json!("not a color"), &color).is_err());
        assert!(validate(&json!(null), &color).is_ok());

        let translate = PropertySpecification::builder(
            "fill-translate",
            PropertyType::Array {
                item: ArrayItem::Number,
                length: Some(2),
            },
        )
        .build();
        assert!(validate(&json!([0, 1]), &translate).is_ok());
        assert!(validate(&json!([0, 1, 2]), &translate).is_err());

        let anchor =
            PropertySpecification::builder("light-anchor", PropertyType::Enum(&["map", "viewport"]))
                .build();
        assert!(validate(&json!("map"), &anchor).is_ok());
        assert!(validate(&json!("world"), &anchor).is_err());
    }

    #[test]
    fn functions_and_expressions_must_normalize() {
        let opacity = PropertySpecification::builder("fill-opacity", PropertyType::Number).build();
        assert!(validate(&json!({"stops": [[0, 0], [10, 1]]}), &opacity).is_ok());
        assert_eq!(
            validate(&json!({"stops": [[10, 0], [0, 1]]}), &opacity),
            Err(ExpressionError::UnorderedStops)
        );
        assert!(matches!(
            validate(&json!(["get", "opacity"]), &opacity),
            Err(ExpressionError::DataDrivenNotSupported(_))
        ));
    }
}
