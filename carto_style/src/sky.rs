// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sky and fog drawn behind a pitched map.

use std::sync::Arc;

use carto_property::{
    EvaluationParameters, PossiblyEvaluated, Properties, SetterOptions, TransitionParameters,
    Transitionable, Transitioning,
};
use serde_json::{Map, Value as Json};

use crate::error::StyleError;
use crate::setter;

/// The style's sky.
#[derive(Clone, Debug)]
pub struct Sky {
    transitionable: Transitionable,
    transitioning: Transitioning,
    properties: PossiblyEvaluated,
}

impl Sky {
    /// A sky with every property at its default.
    #[must_use]
    pub fn new(properties: Arc<Properties>) -> Self {
        let transitionable = Transitionable::new(properties.clone());
        Self {
            transitioning: transitionable.untransitioned(),
            transitionable,
            properties: PossiblyEvaluated::new(properties),
        }
    }

    /// A sky built from a style document's `sky` object, with no
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
        let mut sky = Self::new(properties);
        sky.set_sky(object, options)?;
        sky.transitioning = sky.transitionable.untransitioned();
        Ok(sky)
    }

    /// Applies every entry of `object`; `<name>-transition` keys set timing.
    ///
    /// # Errors
    ///
    /// Returns an error if any entry is unknown or malformed, in which case
    /// nothing is applied.
    pub fn set_sky(
        &mut self,
        object: &Map<String, Json>,
        options: SetterOptions,
    ) -> Result<(), StyleError> {
        setter::set_all(&mut self.transitionable, object, options)
    }

    /// The authored values and timings.
    #[must_use]
    pub fn get_sky(&self) -> Map<String, Json> {
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

    /// Fog opacity for a camera pitch in degrees.
    ///
    /// Fog fades in between 60° and 70°, as the horizon comes into view.
    ///
    /// ```rust
    /// use carto_style::{Sky, reference};
    ///
    /// let sky = Sky::new(reference::sky());
    /// assert_eq!(sky.calculate_fog_blend_opacity(45.0), 0.0);
    /// assert_eq!(sky.calculate_fog_blend_opacity(65.0), 0.5);
    /// assert_eq!(sky.calculate_fog_blend_opacity(80.0), 1.0);
    /// ```
    #[must_use]
    pub fn calculate_fog_blend_opacity(&self, pitch: f64) -> f64 {
        if pitch < 60.0 {
            0.0
        } else if pitch < 70.0 {
            (pitch - 60.0) / 10.0
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference;
    use carto_spec::Value;
    use serde_json::json;

    #[test]
    fn defaults() {
        let mut sky = Sky::new(reference::sky());
        sky.recalculate(&EvaluationParameters::new(0.0));
        let props = sky.properties();
        assert_eq!(props.constant("fog-ground-blend"), Some(&Value::Number(0.5)));
        assert_eq!(props.constant("atmosphere-blend"), Some(&Value::Number(0.8)));
        assert!(props.constant("sky-color").and_then(Value::as_color).is_some());
    }

    #[test]
    fn zoom_dependent_blend() {
        let object = json!({
            "atmosphere-blend": ["interpolate", ["linear"], ["zoom"], 0, 1, 12, 0]
        });
        let mut sky = Sky::from_object(
            reference::sky(),
            object.as_object().unwrap(),
            SetterOptions::default(),
        )
        .unwrap();
        sky.recalculate(&EvaluationParameters::new(6.0));
        assert_eq!(
            sky.properties().constant("atmosphere-blend"),
            Some(&Value::Number(0.5))
        );
    }

    #[test]
    fn fog_fade_edges() {
        let sky = Sky::new(reference::sky());
        assert_eq!(sky.calculate_fog_blend_opacity(59.9), 0.0);
        assert_eq!(sky.calculate_fog_blend_opacity(60.0), 0.0);
        assert_eq!(sky.calculate_fog_blend_opacity(70.0), 1.0);
    }
}
