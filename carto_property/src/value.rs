// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw property values as authored.

use std::sync::Arc;

use carto_spec::StylePropertyExpression;
use log::warn;
use serde_json::Value as Json;

use crate::error::PropertyError;
use crate::parameters::{EvaluationParameters, SetterOptions};
use crate::possibly_evaluated::Evaluated;
use crate::property::Property;

/// An authored value for one property, normalized to an expression.
///
/// Absent input normalizes to the property's default. A `PropertyValue` is
/// never mutated: setting a property replaces it.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyValue {
    property: Arc<Property>,
    value: Option<Json>,
    expression: StylePropertyExpression,
}

impl PropertyValue {
    /// Normalizes `value` for `property`, validating literal input.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Expression`] if the value is rejected.
    pub fn new(property: Arc<Property>, value: Option<Json>) -> Result<Self, PropertyError> {
        Self::with_options(property, value, SetterOptions::default())
    }

    /// Normalizes `value` for `property`.
    ///
    /// With `options.validate` unset, a literal of the wrong type is kept;
    /// evaluating it yields the property default.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Expression`] if the value is rejected.
    pub fn with_options(
        property: Arc<Property>,
        value: Option<Json>,
        options: SetterOptions,
    ) -> Result<Self, PropertyError> {
        let spec = property.specification();
        let reject = |source| {
            warn!("rejected value for \"{}\": {source}", spec.name());
            PropertyError::Expression {
                name: spec.name(),
                source,
            }
        };
        if options.validate
            && let Some(json) = &value
        {
            carto_spec::validate(json, spec).map_err(reject)?;
        }
        let expression = StylePropertyExpression::normalize(value.as_ref(), spec).map_err(reject)?;
        Ok(Self {
            property,
            value,
            expression,
        })
    }

    /// The default value for `property`.
    ///
    /// A default authored as an expression, like a heatmap color ramp, keeps
    /// its expression.
    #[must_use]
    pub fn default_for(property: Arc<Property>) -> Self {
        let spec = property.specification();
        let expression = StylePropertyExpression::normalize(None, spec)
            .unwrap_or_else(|_| StylePropertyExpression::constant(spec.default_value(), spec));
        Self {
            property,
            value: None,
            expression,
        }
    }

    /// The property this value is for.
    #[must_use]
    pub fn property(&self) -> &Arc<Property> {
        &self.property
    }

    /// The authored input, if any.
    #[must_use]
    pub fn value(&self) -> Option<&Json> {
        self.value.as_ref()
    }

    /// The normalized expression.
    #[must_use]
    pub fn expression(&self) -> &StylePropertyExpression {
        &self.expression
    }

    /// Returns `true` if the value depends on feature data.
    #[must_use]
    #[inline]
    pub fn is_data_driven(&self) -> bool {
        self.expression.is_data_driven()
    }

    /// Reduces this value with its property's semantics.
    #[must_use]
    pub fn possibly_evaluate(&self, parameters: &EvaluationParameters) -> Evaluated {
        self.property.possibly_evaluate(self, parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carto_spec::{ExpressionError, ExpressionKind, PropertySpecification, PropertyType};
    use serde_json::json;

    fn opacity() -> Arc<Property> {
        Arc::new(Property::DataDriven(
            PropertySpecification::builder("circle-opacity", PropertyType::Number)
                .default(json!(1))
                .transition(true)
                .data_driven()
                .build(),
        ))
    }

    #[test]
    fn absent_input_uses_default() {
        let value = PropertyValue::new(opacity(), None).unwrap();
        assert!(value.value().is_none());
        assert_eq!(value.expression().kind(), ExpressionKind::Constant);
        assert!(!value.is_data_driven());
        assert_eq!(value, PropertyValue::new(opacity(), None).unwrap());
    }

    #[test]
    fn data_driven_detection() {
        let camera = PropertyValue::new(
            opacity(),
            Some(json!(["interpolate", ["linear"], ["zoom"], 0, 0, 10, 1])),
        )
        .unwrap();
        assert!(!camera.is_data_driven());
        let source = PropertyValue::new(opacity(), Some(json!(["get", "o"]))).unwrap();
        assert!(source.is_data_driven());
    }

    #[test]
    fn validation_is_optional() {
        let err = PropertyValue::new(opacity(), Some(json!("opaque"))).unwrap_err();
        assert!(matches!(
            err,
            PropertyError::Expression {
                name: "circle-opacity",
                source: ExpressionError::TypeMismatch { .. }
            }
        ));

        let lax = PropertyValue::with_options(
            opacity(),
            Some(json!("opaque")),
            SetterOptions { validate: false },
        )
        .unwrap();
        assert_eq!(lax.value(), Some(&json!("opaque")));
    }
}
