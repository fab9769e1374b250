// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The final, cacheable stage of the evaluation chain.

use std::sync::Arc;

use carto_spec::{
    ExpressionKind, Feature, FeatureContext, FeatureState, StylePropertyExpression, Value,
};

use crate::defaults::Properties;
use crate::error::PropertyError;
use crate::format_override::FormatSectionOverride;
use crate::id::PropertyId;
use crate::parameters::EvaluationParameters;
use crate::property::{CrossFaded, Position};
use crate::store::OwnEntries;

/// A per-feature evaluator whose result is not known until a feature is.
#[derive(Clone, Debug, PartialEq)]
pub enum Deferred {
    /// Evaluate the expression against the feature.
    Expression(StylePropertyExpression),
    /// Prefer a rich-text span's explicit value, then the feature.
    SectionOverride(Arc<FormatSectionOverride>),
}

/// Either a ready value or a deferred per-feature evaluator.
#[derive(Clone, Debug, PartialEq)]
pub enum PossiblyEvaluatedValue<T> {
    /// Known for every feature.
    Constant(T),
    /// Depends on feature data.
    Source(Deferred),
    /// Depends on feature data and zoom.
    Composite(Deferred),
}

/// A possibly-evaluated data-driven value together with the parameters of
/// the frame that produced it.
///
/// Deferred evaluation always uses the captured parameters, never the
/// caller's, so every feature of a frame sees the same zoom and global state.
///
/// ```rust
/// use carto_property::{EvaluationParameters, PossiblyEvaluatedPropertyValue};
/// use carto_spec::Value;
///
/// let value = PossiblyEvaluatedPropertyValue::constant(Value::Number(2.0), EvaluationParameters::new(0.0));
/// assert!(value.is_constant());
/// assert_eq!(value.constant_or(Value::Null), Value::Number(2.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PossiblyEvaluatedPropertyValue<T> {
    value: PossiblyEvaluatedValue<T>,
    parameters: EvaluationParameters,
}

impl<T: Clone> PossiblyEvaluatedPropertyValue<T> {
    /// Wraps a possibly-evaluated value with its frame parameters.
    #[must_use]
    pub fn new(value: PossiblyEvaluatedValue<T>, parameters: EvaluationParameters) -> Self {
        Self { value, parameters }
    }

    /// A value that is the same for every feature.
    #[must_use]
    pub fn constant(value: T, parameters: EvaluationParameters) -> Self {
        Self::new(PossiblyEvaluatedValue::Constant(value), parameters)
    }

    /// Returns `true` if no feature is needed to evaluate this value.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        matches!(self.value, PossiblyEvaluatedValue::Constant(_))
    }

    /// The constant, or `fallback` when evaluation needs a feature.
    #[must_use]
    pub fn constant_or(&self, fallback: T) -> T {
        match &self.value {
            PossiblyEvaluatedValue::Constant(value) => value.clone(),
            _ => fallback,
        }
    }

    /// The wrapped value.
    #[must_use]
    pub fn value(&self) -> &PossiblyEvaluatedValue<T> {
        &self.value
    }

    /// The parameters captured when this value was produced.
    #[must_use]
    pub fn parameters(&self) -> &EvaluationParameters {
        &self.parameters
    }
}

impl PossiblyEvaluatedPropertyValue<Value> {
    /// Reduces `expression`: constant and zoom-only expressions evaluate now,
    /// the rest are deferred.
    pub(crate) fn from_expression(
        expression: &StylePropertyExpression,
        parameters: &EvaluationParameters,
    ) -> Self {
        let value = match expression.kind() {
            ExpressionKind::Constant | ExpressionKind::Camera => PossiblyEvaluatedValue::Constant(
                expression.evaluate(&parameters.globals(), &FeatureContext::EMPTY),
            ),
            ExpressionKind::Source => {
                PossiblyEvaluatedValue::Source(Deferred::Expression(expression.clone()))
            }
            ExpressionKind::Composite => {
                PossiblyEvaluatedValue::Composite(Deferred::Expression(expression.clone()))
            }
        };
        Self::new(value, parameters.clone())
    }

    /// Evaluates for `feature`.
    #[must_use]
    pub fn evaluate(&self, feature: &Feature, feature_state: &FeatureState) -> Value {
        self.evaluate_in(&FeatureContext::new(feature, feature_state))
    }

    /// Evaluates in an explicit feature context, e.g. with a rich-text span
    /// active.
    #[must_use]
    pub fn evaluate_in(&self, ctx: &FeatureContext<'_>) -> Value {
        match &self.value {
            PossiblyEvaluatedValue::Constant(value) => value.clone(),
            PossiblyEvaluatedValue::Source(deferred)
            | PossiblyEvaluatedValue::Composite(deferred) => match deferred {
                Deferred::Expression(expression) => {
                    expression.evaluate(&self.parameters.globals(), ctx)
                }
                Deferred::SectionOverride(section_override) => section_override.evaluate(ctx),
            },
        }
    }
}

impl PossiblyEvaluatedPropertyValue<Option<CrossFaded<Value>>> {
    /// Evaluates for `feature`.
    #[must_use]
    pub fn evaluate(
        &self,
        feature: &Feature,
        feature_state: &FeatureState,
    ) -> Option<CrossFaded<Value>> {
        self.evaluate_in(&FeatureContext::new(feature, feature_state))
    }

    /// Evaluates in an explicit feature context.
    #[must_use]
    pub fn evaluate_in(&self, ctx: &FeatureContext<'_>) -> Option<CrossFaded<Value>> {
        match &self.value {
            PossiblyEvaluatedValue::Constant(value) => value.clone(),
            PossiblyEvaluatedValue::Source(deferred)
            | PossiblyEvaluatedValue::Composite(deferred) => match deferred {
                Deferred::Expression(expression) => {
                    CrossFaded::sample(expression, &self.parameters, ctx)
                }
                Deferred::SectionOverride(section_override) => {
                    let value = section_override.evaluate(ctx);
                    CrossFaded::from_samples(value.clone(), value.clone(), value, &self.parameters)
                }
            },
        }
    }
}

/// The reduced form of one property, shaped by its [`Property`](crate::Property) kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Evaluated {
    /// A constant-only property's value.
    Constant(Value),
    /// A data-driven property's value.
    DataDriven(PossiblyEvaluatedPropertyValue<Value>),
    /// A cross-faded property's pair, or `None` when unset.
    CrossFaded(Option<CrossFaded<Value>>),
    /// A cross-faded data-driven property's value.
    CrossFadedDataDriven(PossiblyEvaluatedPropertyValue<Option<CrossFaded<Value>>>),
    /// Whether a color ramp is present.
    ColorRamp(bool),
    /// A light position in Cartesian coordinates.
    Position(Position),
}

impl Evaluated {
    /// The value of a constant-only property.
    #[must_use]
    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Self::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// The value of a data-driven property.
    #[must_use]
    pub fn as_data_driven(&self) -> Option<&PossiblyEvaluatedPropertyValue<Value>> {
        match self {
            Self::DataDriven(value) => Some(value),
            _ => None,
        }
    }

    /// The pair of a cross-faded property.
    #[must_use]
    pub fn as_cross_faded(&self) -> Option<&CrossFaded<Value>> {
        match self {
            Self::CrossFaded(value) => value.as_ref(),
            _ => None,
        }
    }

    /// The value of a cross-faded data-driven property.
    #[must_use]
    pub fn as_cross_faded_data_driven(
        &self,
    ) -> Option<&PossiblyEvaluatedPropertyValue<Option<CrossFaded<Value>>>> {
        match self {
            Self::CrossFadedDataDriven(value) => Some(value),
            _ => None,
        }
    }

    /// Whether a color ramp is present.
    #[must_use]
    pub fn as_color_ramp(&self) -> Option<bool> {
        match self {
            Self::ColorRamp(present) => Some(*present),
            _ => None,
        }
    }

    /// A light position.
    #[must_use]
    pub fn as_position(&self) -> Option<Position> {
        match self {
            Self::Position(position) => Some(*position),
            _ => None,
        }
    }

    /// The value when it is the same for every feature: constant-only
    /// values, and data-driven values that reduced to a constant.
    #[must_use]
    pub fn constant_value(&self) -> Option<&Value> {
        match self {
            Self::Constant(value) => Some(value),
            Self::DataDriven(value) => match value.value() {
                PossiblyEvaluatedValue::Constant(value) => Some(value),
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns `true` if evaluation needs a feature.
    #[must_use]
    pub fn is_data_driven(&self) -> bool {
        match self {
            Self::DataDriven(value) => !value.is_constant(),
            Self::CrossFadedDataDriven(value) => !value.is_constant(),
            _ => false,
        }
    }
}

/// Reduced values for every property of one layer, for one frame.
///
/// Only properties the author set are stored; every other lookup falls
/// back to the shared defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct PossiblyEvaluated {
    properties: Arc<Properties>,
    values: OwnEntries<Evaluated>,
}

impl PossiblyEvaluated {
    /// A store holding only defaults.
    #[must_use]
    pub fn new(properties: Arc<Properties>) -> Self {
        Self {
            properties,
            values: OwnEntries::default(),
        }
    }

    pub(crate) fn from_entries(properties: Arc<Properties>, values: OwnEntries<Evaluated>) -> Self {
        Self { properties, values }
    }

    /// The property container.
    #[must_use]
    pub fn properties(&self) -> &Arc<Properties> {
        &self.properties
    }

    /// The reduced value of `name`, or `None` for unknown names.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Evaluated> {
        self.properties.id(name).map(|id| self.get_by_id(id))
    }

    /// The reduced value of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this store's container.
    #[must_use]
    pub fn get_by_id(&self, id: PropertyId) -> &Evaluated {
        self.values
            .get(id)
            .unwrap_or_else(|| self.properties.default_possibly_evaluated(id))
    }

    /// Shorthand for the per-feature-invariant value of `name`.
    #[must_use]
    pub fn constant(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(Evaluated::constant_value)
    }

    /// Shorthand for a data-driven property's value.
    #[must_use]
    pub fn data_driven(&self, name: &str) -> Option<&PossiblyEvaluatedPropertyValue<Value>> {
        self.get(name).and_then(Evaluated::as_data_driven)
    }

    /// Replaces the reduced value of `name`.
    ///
    /// Consumers use this for derived values, e.g. a fallback from a sibling
    /// property.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::UnknownProperty`] for unknown names.
    pub fn set(&mut self, name: &str, value: Evaluated) -> Result<(), PropertyError> {
        let id = self
            .properties
            .id(name)
            .ok_or_else(|| PropertyError::UnknownProperty(name.into()))?;
        self.values.insert(id, value);
        Ok(())
    }

    /// The ids of properties with an explicitly reduced value.
    pub fn own_ids(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.values.ids()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carto_spec::{GlobalState, PropertySpecification, PropertyType};
    use serde_json::json;

    fn radius_spec() -> PropertySpecification {
        PropertySpecification::builder("circle-radius", PropertyType::Number)
            .default(json!(5))
            .data_driven()
            .build()
    }

    fn normalize(json: serde_json::Value) -> StylePropertyExpression {
        StylePropertyExpression::normalize(Some(&json), &radius_spec()).unwrap()
    }

    #[test]
    fn camera_expressions_reduce_to_constants() {
        let params = EvaluationParameters::new(5.0);
        let value = PossiblyEvaluatedPropertyValue::from_expression(
            &normalize(json!(["interpolate", ["linear"], ["zoom"], 0, 0, 10, 10])),
            &params,
        );
        assert!(value.is_constant());
        assert_eq!(value.constant_or(Value::Null), Value::Number(5.0));
    }

    #[test]
    fn source_expressions_defer() {
        let params = EvaluationParameters::new(0.0);
        let value =
            PossiblyEvaluatedPropertyValue::from_expression(&normalize(json!(["get", "r"])), &params);
        assert!(!value.is_constant());
        assert!(matches!(value.value(), PossiblyEvaluatedValue::Source(_)));
        assert_eq!(value.constant_or(Value::Number(-1.0)), Value::Number(-1.0));

        let feature = Feature::new().with_property("r", 12.0);
        assert_eq!(
            value.evaluate(&feature, &FeatureState::new()),
            Value::Number(12.0)
        );
    }

    #[test]
    fn deferred_evaluation_uses_captured_parameters() {
        let expr = normalize(json!([
            "interpolate",
            ["linear"],
            ["zoom"],
            0,
            ["get", "r"],
            10,
            100
        ]));
        let value =
            PossiblyEvaluatedPropertyValue::from_expression(&expr, &EvaluationParameters::new(5.0));
        assert!(matches!(value.value(), PossiblyEvaluatedValue::Composite(_)));
        assert_eq!(value.parameters().zoom, 5.0);

        let feature = Feature::new().with_property("r", 0.0);
        assert_eq!(
            value.evaluate(&feature, &FeatureState::new()),
            Value::Number(50.0)
        );
    }

    #[test]
    fn global_state_is_read_from_the_snapshot() {
        let mut state = GlobalState::new();
        state.set("size", 17.0);
        let params = EvaluationParameters::new(0.0).with_global_state(state.clone());
        let value = PossiblyEvaluatedPropertyValue::from_expression(
            &normalize(json!(["global-state", "size"])),
            &params,
        );
        state.set("size", 30.0);
        assert_eq!(value.constant_or(Value::Null), Value::Number(17.0));
    }
}
