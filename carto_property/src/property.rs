// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property kinds: how a property reduces and how it interpolates.

use carto_spec::{
    ExpressionKind, FeatureContext, PropertySpecification, StylePropertyExpression, Value,
    interpolate,
};
use log::trace;

use crate::parameters::EvaluationParameters;
use crate::possibly_evaluated::{
    Deferred, Evaluated, PossiblyEvaluatedPropertyValue, PossiblyEvaluatedValue,
};
use crate::value::PropertyValue;

/// The semantics of one property.
///
/// Every kind owns its specification and defines two operations:
/// [`possibly_evaluate`](Self::possibly_evaluate) reduces a raw value for a
/// frame, and [`interpolate`](Self::interpolate) blends two reduced values
/// during a transition. A kind is stateless and shared by every value for
/// the property.
#[derive(Clone, Debug, PartialEq)]
pub enum Property {
    /// Never reads feature data; reduces to a plain value.
    ConstantOnly(PropertySpecification),
    /// May read feature data; reduces to a constant or a deferred evaluator.
    DataDriven(PropertySpecification),
    /// Image references and dash patterns blended between integer zooms.
    CrossFaded(PropertySpecification),
    /// Like [`CrossFaded`](Self::CrossFaded), but may read feature data.
    CrossFadedDataDriven(PropertySpecification),
    /// A color ramp; reduces to whether a ramp is present.
    ColorRamp(PropertySpecification),
    /// A bespoke kind with its own value shape.
    Composite(CompositeKind, PropertySpecification),
}

/// Bespoke property kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompositeKind {
    /// A light position authored as `[radial, azimuthal, polar]`.
    LightPosition,
    /// A line width held at the integer zoom below the frame's zoom.
    ///
    /// Reduces like [`Property::DataDriven`], but both the reduction and any
    /// deferred per-feature evaluation see `floor(zoom)`.
    LineFloorwidth,
}

impl Property {
    /// The property's specification.
    #[must_use]
    pub fn specification(&self) -> &PropertySpecification {
        match self {
            Self::ConstantOnly(spec)
            | Self::DataDriven(spec)
            | Self::CrossFaded(spec)
            | Self::CrossFadedDataDriven(spec)
            | Self::ColorRamp(spec)
            | Self::Composite(_, spec) => spec,
        }
    }

    /// The property name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.specification().name()
    }

    /// Returns `true` for kinds that blend between integer zooms.
    #[must_use]
    pub fn is_cross_faded(&self) -> bool {
        matches!(self, Self::CrossFaded(_) | Self::CrossFadedDataDriven(_))
    }

    /// Reduces `value` for the frame described by `parameters`.
    ///
    /// # Panics
    ///
    /// Panics if a [`ConstantOnly`](Self::ConstantOnly) property is given a
    /// data-driven value. Normalization rejects such values for properties
    /// that do not accept feature data, so this indicates a property table
    /// whose kind and specification disagree.
    #[must_use]
    pub fn possibly_evaluate(
        &self,
        value: &PropertyValue,
        parameters: &EvaluationParameters,
    ) -> Evaluated {
        let expression = value.expression();
        match self {
            Self::ConstantOnly(spec) => {
                assert!(
                    !value.is_data_driven(),
                    "Value for '{}' should not be data-driven",
                    spec.name()
                );
                Evaluated::Constant(expression.evaluate(&parameters.globals(), &FeatureContext::EMPTY))
            }
            Self::DataDriven(_) => Evaluated::DataDriven(
                PossiblyEvaluatedPropertyValue::from_expression(expression, parameters),
            ),
            Self::Composite(CompositeKind::LineFloorwidth, _) => {
                let floored = parameters.at_zoom(parameters.zoom.floor());
                Evaluated::DataDriven(PossiblyEvaluatedPropertyValue::from_expression(
                    expression, &floored,
                ))
            }
            Self::CrossFaded(_) => {
                if is_unset(expression) {
                    return Evaluated::CrossFaded(None);
                }
                Evaluated::CrossFaded(CrossFaded::sample(
                    expression,
                    parameters,
                    &FeatureContext::EMPTY,
                ))
            }
            Self::CrossFadedDataDriven(_) => {
                let evaluated = if expression.is_data_driven() {
                    let deferred = Deferred::Expression(expression.clone());
                    if expression.kind() == ExpressionKind::Source {
                        PossiblyEvaluatedValue::Source(deferred)
                    } else {
                        PossiblyEvaluatedValue::Composite(deferred)
                    }
                } else if is_unset(expression) {
                    PossiblyEvaluatedValue::Constant(None)
                } else {
                    PossiblyEvaluatedValue::Constant(CrossFaded::sample(
                        expression,
                        parameters,
                        &FeatureContext::EMPTY,
                    ))
                };
                Evaluated::CrossFadedDataDriven(PossiblyEvaluatedPropertyValue::new(
                    evaluated,
                    parameters.clone(),
                ))
            }
            Self::ColorRamp(_) => Evaluated::ColorRamp(!is_unset(expression)),
            Self::Composite(CompositeKind::LightPosition, spec) => {
                let raw = expression.evaluate(&parameters.globals(), &FeatureContext::EMPTY);
                Evaluated::Position(Position::from_value(&raw).unwrap_or_else(|| {
                    trace!("'{}' is not a [r, azimuthal, polar] triple", spec.name());
                    Position::default()
                }))
            }
        }
    }

    /// Blends two reduced values at `t` in `[0, 1]`.
    ///
    /// Kinds and types without an interpolation return `a` unchanged, as do
    /// data-driven values that still need a feature.
    #[must_use]
    pub fn interpolate(&self, a: &Evaluated, b: &Evaluated, t: f64) -> Evaluated {
        match (self, a, b) {
            (Self::ConstantOnly(spec), Evaluated::Constant(x), Evaluated::Constant(y)) => {
                Evaluated::Constant(interpolate_typed(spec, x, y, t))
            }
            (
                Self::DataDriven(spec) | Self::Composite(CompositeKind::LineFloorwidth, spec),
                Evaluated::DataDriven(x),
                Evaluated::DataDriven(y),
            ) => {
                let (
                    PossiblyEvaluatedValue::Constant(xv),
                    PossiblyEvaluatedValue::Constant(yv),
                ) = (x.value(), y.value())
                else {
                    // Data we have not seen yet cannot be interpolated.
                    return a.clone();
                };
                let value = if xv.is_null() || yv.is_null() {
                    Value::Null
                } else {
                    interpolate_typed(spec, xv, yv, t)
                };
                Evaluated::DataDriven(PossiblyEvaluatedPropertyValue::constant(
                    value,
                    x.parameters().clone(),
                ))
            }
            (Self::ColorRamp(_), _, _) => Evaluated::ColorRamp(false),
            (
                Self::Composite(CompositeKind::LightPosition, _),
                Evaluated::Position(x),
                Evaluated::Position(y),
            ) => Evaluated::Position(x.lerp(*y, t)),
            _ => a.clone(),
        }
    }
}

fn is_unset(expression: &StylePropertyExpression) -> bool {
    expression.as_literal().is_some_and(Value::is_null)
}

fn interpolate_typed(spec: &PropertySpecification, a: &Value, b: &Value, t: f64) -> Value {
    match interpolate::for_type(spec.ty()) {
        Some(interpolator) => interpolator(a, b, t),
        None => a.clone(),
    }
}

/// A pair of values to blend between two integer-zoom representations.
#[derive(Clone, Debug, PartialEq)]
pub struct CrossFaded<T> {
    /// The outgoing representation.
    pub from: T,
    /// The incoming representation.
    pub to: T,
}

impl CrossFaded<Value> {
    /// Evaluates `expression` at the integer zooms around the frame's zoom
    /// and folds the samples into a pair.
    pub(crate) fn sample(
        expression: &StylePropertyExpression,
        parameters: &EvaluationParameters,
        ctx: &FeatureContext<'_>,
    ) -> Option<Self> {
        let z = parameters.zoom.floor();
        let globals = parameters.globals();
        let at = |zoom: f64| expression.evaluate(&globals.at_zoom(zoom), ctx);
        Self::from_samples(at(z - 1.0), at(z), at(z + 1.0), parameters)
    }

    /// Folds three zoom samples into a pair: zooming in fades from the lower
    /// sample, zooming out from the upper one.
    ///
    /// Returns `None` when the current sample is unset.
    #[must_use]
    pub fn from_samples(
        min: Value,
        mid: Value,
        max: Value,
        parameters: &EvaluationParameters,
    ) -> Option<Self> {
        if mid.is_null() {
            return None;
        }
        Some(if parameters.zoom > parameters.zoom_history.last_integer_zoom() {
            Self { from: min, to: mid }
        } else {
            Self { from: max, to: mid }
        })
    }
}

/// A light position in Cartesian coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Position {
    /// X.
    pub x: f64,
    /// Y.
    pub y: f64,
    /// Z.
    pub z: f64,
}

impl Position {
    /// Converts spherical coordinates `[radial, azimuthal, polar]`, in
    /// degrees, to Cartesian.
    ///
    /// The azimuthal angle is measured from north, so it is offset by 90°.
    ///
    /// ```rust
    /// use carto_property::Position;
    ///
    /// let p = Position::from_spherical([1.0, 0.0, 0.0]);
    /// assert!(p.x.abs() < 1e-12 && p.y.abs() < 1e-12);
    /// assert!((p.z - 1.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn from_spherical([r, azimuthal, polar]: [f64; 3]) -> Self {
        let azimuthal = (azimuthal + 90.0).to_radians();
        let polar = polar.to_radians();
        Self {
            x: r * azimuthal.cos() * polar.sin(),
            y: r * azimuthal.sin() * polar.sin(),
            z: r * polar.cos(),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value.as_array()? {
            [r, a, p] => Some(Self::from_spherical([
                r.as_number()?,
                a.as_number()?,
                p.as_number()?,
            ])),
            _ => None,
        }
    }

    /// Interpolates component-wise.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: interpolate::number(self.x, other.x, t),
            y: interpolate::number(self.y, other.y, t),
            z: interpolate::number(self.z, other.z, t),
        }
    }
}
