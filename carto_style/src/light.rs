// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The style's directional light.

use std::sync::Arc;

use carto_property::{
    EvaluationParameters, PossiblyEvaluated, Position, Properties, SetterOptions,
    TransitionParameters, Transitionable, Transitioning,
};
use carto_spec::{Color, Value};
use serde_json::{Map, Value as Json};

use crate::error::StyleError;
use crate::setter;

/// The light used to shade extrusions.
///
/// ```rust
/// use carto_property::{EvaluationParameters, SetterOptions};
/// use carto_style::{Light, reference};
/// use serde_json::json;
///
/// let mut light = Light::new(reference::light());
/// light
///     .set_light(
///         json!({"intensity": 0.8}).as_object().unwrap(),
///         SetterOptions::default(),
///     )
///     .unwrap();
/// light.recalculate(&EvaluationParameters::new(0.0));
/// assert_eq!(light.intensity(), 0.8);
/// assert_eq!(light.anchor(), "viewport");
/// ```
#[derive(Clone, Debug)]
pub struct Light {
    transitionable: Transitionable,
    transitioning: Transitioning,
    properties: PossiblyEvaluated,
}

impl Light {
    /// A light with every property at its default.
    #[must_use]
    pub fn new(properties: Arc<Properties>) -> Self {
        let transitionable = Transitionable::new(properties.clone());
        Self {
            transitioning: transitionable.untransitioned(),
            transitionable,
            properties: PossiblyEvaluated::new(properties),
        }
    }

    /// A light built from a style document's `light` object, with no
    /// transition from the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if any entry is unknown or malformed.
    pub fn from_object(
        properties: Arc<Properties>,
        object: &Map<String, Json>,
        options: SetterOptions,
    ) -> Result<Self, StyleError> {
        let mut light = Self::new(properties);
        light.set_light(object, options)?;
        light.transitioning = light.transitionable.untransitioned();
        Ok(light)
    }

    /// Applies every entry of `object`; `<name>-transition` keys set timing.
    ///
    /// # Errors
    ///
    /// Returns an error if any entry is unknown or malformed, in which case
    /// nothing is applied.
    pub fn set_light(
        &mut self,
        object: &Map<String, Json>,
        options: SetterOptions,
    ) -> Result<(), StyleError> {
        setter::set_all(&mut self.transitionable, object, options)
    }

    /// The authored values and timings.
    #[must_use]
    pub fn get_light(&self) -> Map<String, Json> {
        self.transitionable.serialize()
    }

    /// Starts transitions toward the current values.
    pub fn update_transitions(&mut self, parameters: &TransitionParameters) {
        let prior = std::mem::replace(
            &mut self.transitioning,
            Transitioning::new(self.transitionable.properties().clone()),
        );
        self.transitioning = self.transitionable.transitioned(parameters, prior);
    }

    /// Returns `true` while any property is mid-transition.
    #[must_use]
    pub fn has_transition(&self) -> bool {
        self.transitioning.has_transition()
    }

    /// Reduces every property for the frame.
    pub fn recalculate(&mut self, parameters: &EvaluationParameters) {
        self.properties = self.transitioning.possibly_evaluate(parameters);
    }

    /// Reduced values from the last [`recalculate`](Self::recalculate).
    #[must_use]
    pub fn properties(&self) -> &PossiblyEvaluated {
        &self.properties
    }

    /// `map` or `viewport`.
    #[must_use]
    pub fn anchor(&self) -> &str {
        self.properties
            .constant("anchor")
            .and_then(Value::as_str)
            .unwrap_or("viewport")
    }

    /// The light's position in Cartesian coordinates.
    #[must_use]
    pub fn position(&self) -> Position {
        self.properties
            .get("position")
            .and_then(|evaluated| evaluated.as_position())
            .unwrap_or_else(|| Position::from_spherical([1.15, 210.0, 30.0]))
    }

    /// The light's color.
    #[must_use]
    pub fn color(&self) -> Color {
        self.properties
            .constant("color")
            .and_then(Value::as_color)
            .unwrap_or(Color::WHITE)
    }

    /// The light's intensity.
    #[must_use]
    pub fn intensity(&self) -> f64 {
        self.properties
            .constant("intensity")
            .and_then(Value::as_number)
            .unwrap_or(0.5)
    }
}
