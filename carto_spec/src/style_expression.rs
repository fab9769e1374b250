// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Normalized, typed expressions bound to a property specification.

use std::sync::Arc;

use log::trace;
use serde_json::Value as Json;

use crate::coerce::{coerce, is_instance};
use crate::error::ExpressionError;
use crate::expression::{Expr, ExpressionKind, FeatureContext, Globals};
use crate::function;
use crate::specification::{ExpressionParameters, PropertySpecification, PropertyType};
use crate::value::Value;

/// An expression normalized against a [`PropertySpecification`].
///
/// Every style input (a literal, a legacy function, or an expression) is
/// normalized to this form. Evaluation never fails: a null result or an
/// evaluation error yields the property's default.
#[derive(Clone, Debug, PartialEq)]
pub struct StylePropertyExpression {
    kind: ExpressionKind,
    expression: Arc<Expr>,
    ty: PropertyType,
    default: Value,
}

impl StylePropertyExpression {
    /// Normalizes `input` for `spec`. `None` normalizes the specification's
    /// default.
    ///
    /// # Errors
    ///
    /// Returns an error when the input is malformed or depends on inputs the
    /// property does not accept.
    pub fn normalize(
        input: Option<&Json>,
        spec: &PropertySpecification,
    ) -> Result<Self, ExpressionError> {
        let ty = spec.ty();
        let expression = match input.or(spec.default_json()) {
            None => Expr::Literal(Value::Null),
            Some(json) if function::is_function(json) => function::convert(json, spec)?,
            Some(json) if Expr::is_expression(json) => {
                Expr::parse(json)?.map_outputs(&|v| coerce(v, ty))
            }
            Some(json) => Expr::Literal(coerce(Value::from_json(json), ty)),
        };

        let kind = expression.kind();
        if kind.is_data_driven() && !spec.supports_data_driven() {
            return Err(ExpressionError::DataDrivenNotSupported(spec.name().into()));
        }
        if matches!(kind, ExpressionKind::Camera | ExpressionKind::Composite)
            && !spec.parameters().contains(ExpressionParameters::ZOOM)
        {
            return Err(ExpressionError::ZoomNotSupported(spec.name().into()));
        }

        Ok(Self {
            kind,
            expression: Arc::new(expression),
            ty,
            default: spec.default_value(),
        })
    }

    /// Wraps an already evaluated constant.
    #[must_use]
    pub fn constant(value: Value, spec: &PropertySpecification) -> Self {
        Self {
            kind: ExpressionKind::Constant,
            expression: Arc::new(Expr::Literal(value)),
            ty: spec.ty(),
            default: spec.default_value(),
        }
    }

    /// The evaluation class.
    #[must_use]
    #[inline]
    pub fn kind(&self) -> ExpressionKind {
        self.kind
    }

    /// Returns `true` if evaluation needs a feature.
    #[must_use]
    #[inline]
    pub fn is_data_driven(&self) -> bool {
        self.kind.is_data_driven()
    }

    /// The underlying expression tree.
    #[must_use]
    pub fn expression(&self) -> &Expr {
        &self.expression
    }

    /// The literal value, if this expression is a constant literal.
    #[must_use]
    pub fn as_literal(&self) -> Option<&Value> {
        match &*self.expression {
            Expr::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// The property default used when evaluation produces nothing.
    #[must_use]
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Evaluates the expression, falling back to the property default.
    #[must_use]
    pub fn evaluate(&self, globals: &Globals<'_>, ctx: &FeatureContext<'_>) -> Value {
        match self.expression.evaluate(globals, ctx) {
            Ok(Value::Null) => self.default.clone(),
            Ok(Value::Number(n)) if n.is_nan() => self.default.clone(),
            Ok(value) => {
                let value = coerce(value, self.ty);
                if is_instance(&value, self.ty) {
                    value
                } else {
                    trace!(
                        "expected {:?}, found {}, using default",
                        self.ty,
                        value.type_name()
                    );
                    self.default.clone()
                }
            }
            Err(err) => {
                trace!("expression evaluation failed, using default: {err}");
                self.default.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::global_state::GlobalState;
    use crate::value::{Feature, FeatureState};
    use serde_json::json;

    fn radius() -> PropertySpecification {
        PropertySpecification::builder("circle-radius", PropertyType::Number)
            .default(json!(5))
            .data_driven()
            .build()
    }

    #[test]
    fn none_normalizes_the_default() {
        let expr = StylePropertyExpression::normalize(None, &radius()).unwrap();
        assert_eq!(expr.kind(), ExpressionKind::Constant);
        assert_eq!(expr.as_literal(), Some(&Value::Number(5.0)));
    }

    #[test]
    fn string_outputs_are_coerced_to_colors() {
        let spec = PropertySpecification::builder("circle-color", PropertyType::Color)
            .default(json!("#000000"))
            .build();
        let expr = StylePropertyExpression::normalize(
            Some(&json!(["interpolate", ["linear"], ["zoom"], 0, "#000000", 10, "#ffffff"])),
            &spec,
        )
        .unwrap();
        let state = GlobalState::new();
        let value = expr.evaluate(&Globals::new(5.0, &state), &FeatureContext::EMPTY);
        let components = value.as_color().unwrap().components;
        assert!((components[0] - 0.5).abs() < 1e-6, "{components:?}");
    }

    #[test]
    fn data_expressions_require_support() {
        let spec = PropertySpecification::builder("line-cap", PropertyType::String).build();
        assert_eq!(
            StylePropertyExpression::normalize(Some(&json!(["get", "cap"])), &spec),
            Err(ExpressionError::DataDrivenNotSupported("line-cap".into()))
        );
        let spec = PropertySpecification::builder("sky-only", PropertyType::Number)
            .parameters(ExpressionParameters::empty())
            .build();
        assert_eq!(
            StylePropertyExpression::normalize(
                Some(&json!(["interpolate", ["linear"], ["zoom"], 0, 0, 1, 1])),
                &spec
            ),
            Err(ExpressionError::ZoomNotSupported("sky-only".into()))
        );
    }

    #[test]
    fn failures_fall_back_to_default() {
        let expr =
            StylePropertyExpression::normalize(Some(&json!(["get", "radius"])), &radius()).unwrap();
        let state = GlobalState::new();
        let globals = Globals::new(0.0, &state);
        let missing = Feature::new();
        let present = Feature::new().with_property("radius", 9.0);
        let feature_state = FeatureState::new();

        assert_eq!(
            expr.evaluate(&globals, &FeatureContext::new(&missing, &feature_state)),
            Value::Number(5.0)
        );
        assert_eq!(
            expr.evaluate(&globals, &FeatureContext::new(&present, &feature_state)),
            Value::Number(9.0)
        );
        let mistyped = Feature::new().with_property("radius", "big");
        assert_eq!(
            expr.evaluate(&globals, &FeatureContext::new(&mistyped, &feature_state)),
            Value::Number(5.0)
        );
    }
}
