// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint property stores: authored values with timing, and the time-aware
//! stage that blends between successive values.

use std::sync::Arc;

use log::{debug, trace};
use serde_json::{Map, Value as Json};

use crate::defaults::Properties;
use crate::ease::ease_cubic_in_out;
use crate::error::PropertyError;
use crate::id::PropertyId;
use crate::parameters::{
    EvaluationParameters, SetterOptions, TransitionParameters, TransitionSpecification,
};
use crate::possibly_evaluated::{Evaluated, PossiblyEvaluated};
use crate::property::Property;
use crate::store::OwnEntries;
use crate::value::PropertyValue;

/// An authored paint value with optional explicit transition timing.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionablePropertyValue {
    value: PropertyValue,
    transition: Option<TransitionSpecification>,
}

impl TransitionablePropertyValue {
    /// The default value of `property`, without explicit timing.
    #[must_use]
    pub fn new(property: Arc<Property>) -> Self {
        Self {
            value: PropertyValue::default_for(property),
            transition: None,
        }
    }

    /// The authored value.
    #[must_use]
    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    /// The explicit timing, if any.
    #[must_use]
    pub fn transition(&self) -> Option<TransitionSpecification> {
        self.transition
    }

    /// Starts a transition from `prior` to this value.
    ///
    /// Explicit timing is merged field-wise over the parameters' defaults.
    #[must_use]
    pub fn transitioned(
        &self,
        parameters: &TransitionParameters,
        prior: TransitioningPropertyValue,
    ) -> TransitioningPropertyValue {
        let timing = self
            .transition
            .unwrap_or_default()
            .or(parameters.transition);
        TransitioningPropertyValue::new(self.value.clone(), Some(prior), timing, parameters.now)
    }

    /// This value with no transition in flight.
    #[must_use]
    pub fn untransitioned(&self) -> TransitioningPropertyValue {
        TransitioningPropertyValue::new(
            self.value.clone(),
            None,
            TransitionSpecification::default(),
            0.0,
        )
    }
}

/// A paint value that may be mid-transition from earlier values.
///
/// The prior link is owned and dropped as soon as it stops mattering, so a
/// long history of edits never costs more than the edits still in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitioningPropertyValue {
    value: PropertyValue,
    prior: Option<Box<Self>>,
    begin: f64,
    end: f64,
}

impl TransitioningPropertyValue {
    /// Creates a value transitioning from `prior` over `transition`,
    /// starting at `now`.
    ///
    /// The prior value is kept only if the property transitions and the
    /// timing is non-zero.
    #[must_use]
    pub fn new(
        value: PropertyValue,
        prior: Option<Self>,
        transition: TransitionSpecification,
        now: f64,
    ) -> Self {
        let delay = transition.delay_or_zero();
        let duration = transition.duration_or_zero();
        let begin = now + delay;
        let end = begin + duration;
        let keep_prior =
            value.property().specification().transition() && (delay != 0.0 || duration != 0.0);
        Self {
            prior: if keep_prior { prior.map(Box::new) } else { None },
            value,
            begin,
            end,
        }
    }

    /// The target value.
    #[must_use]
    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    /// When the transition starts.
    #[must_use]
    #[inline]
    pub fn begin(&self) -> f64 {
        self.begin
    }

    /// When the transition ends.
    #[must_use]
    #[inline]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Returns `true` while an earlier value is still linked.
    #[must_use]
    #[inline]
    pub fn has_prior(&self) -> bool {
        self.prior.is_some()
    }

    /// The number of earlier values still linked.
    #[must_use]
    pub fn prior_depth(&self) -> usize {
        let mut depth = 0;
        let mut link = self.prior.as_deref();
        while let Some(prior) = link {
            depth += 1;
            link = prior.prior.as_deref();
        }
        depth
    }

    /// Reduces this value at `parameters.now`.
    ///
    /// Completed transitions and data-driven targets drop the prior link.
    pub fn possibly_evaluate(&mut self, parameters: &EvaluationParameters) -> Evaluated {
        let now = parameters.now;
        let final_value = self.value.possibly_evaluate(parameters);
        if self.prior.is_none() {
            return final_value;
        }
        if now > self.end {
            debug!(
                "transition of '{}' complete, dropping prior",
                self.value.property().name()
            );
            self.prior = None;
            return final_value;
        }
        if self.value.is_data_driven() {
            // Geometry layout must see the final data-driven function, so
            // these snap instead of animating.
            debug!(
                "'{}' is data-driven, snapping without transition",
                self.value.property().name()
            );
            self.prior = None;
            return final_value;
        }
        let Some(prior) = self.prior.as_deref_mut() else {
            return final_value;
        };
        if now < self.begin {
            return prior.possibly_evaluate(parameters);
        }
        let t = if self.end > self.begin {
            (now - self.begin) / (self.end - self.begin)
        } else {
            1.0
        };
        let prior_value = prior.possibly_evaluate(parameters);
        trace!(
            "'{}' transitioning at t = {t}",
            self.value.property().name()
        );
        self.value
            .property()
            .interpolate(&prior_value, &final_value, ease_cubic_in_out(t))
    }
}

/// Authored paint values for one layer.
///
/// Only properties the author set are stored; the rest read the shared
/// defaults of the layer type's [`Properties`].
///
/// ```rust
/// use std::sync::Arc;
///
/// use carto_property::{Properties, Property, Transitionable, TransitionSpecification};
/// use carto_spec::{PropertySpecification, PropertyType};
/// use serde_json::json;
///
/// let mut builder = Properties::builder();
/// builder.register(Property::DataDriven(
///     PropertySpecification::builder("circle-radius", PropertyType::Number)
///         .default(json!(5))
///         .transition(true)
///         .data_driven()
///         .build(),
/// ));
/// let properties = builder.build();
///
/// let mut paint = Transitionable::new(properties);
/// paint.set_value("circle-radius", Some(json!(10))).unwrap();
/// paint
///     .set_transition("circle-radius", Some(TransitionSpecification::new(500.0, 0.0)))
///     .unwrap();
///
/// let serialized = paint.serialize();
/// assert_eq!(serialized["circle-radius"], json!(10));
/// assert_eq!(serialized["circle-radius-transition"], json!({"duration": 500.0, "delay": 0.0}));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Transitionable {
    properties: Arc<Properties>,
    values: OwnEntries<TransitionablePropertyValue>,
}

impl Transitionable {
    /// Creates a store holding only defaults.
    #[must_use]
    pub fn new(properties: Arc<Properties>) -> Self {
        Self {
            properties,
            values: OwnEntries::default(),
        }
    }

    /// The property container.
    #[must_use]
    pub fn properties(&self) -> &Arc<Properties> {
        &self.properties
    }

    fn lookup(&self, name: &str) -> Result<PropertyId, PropertyError> {
        self.properties
            .id(name)
            .ok_or_else(|| PropertyError::UnknownProperty(name.into()))
    }

    fn entry(&self, id: PropertyId) -> &TransitionablePropertyValue {
        self.values
            .get(id)
            .unwrap_or_else(|| self.properties.default_transitionable(id))
    }

    fn entry_mut(&mut self, id: PropertyId) -> &mut TransitionablePropertyValue {
        let properties = &self.properties;
        self.values
            .get_or_insert_with(id, || properties.default_transitionable(id).clone())
    }

    /// The authored input for `name`, if one was set.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::UnknownProperty`] for unknown names.
    pub fn get_value(&self, name: &str) -> Result<Option<Json>, PropertyError> {
        let id = self.lookup(name)?;
        Ok(self.entry(id).value.value().cloned())
    }

    /// Sets the authored input for `name`, validating it. `None` resets to
    /// the default.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown names or rejected input. The store is
    /// unchanged on error.
    pub fn set_value(&mut self, name: &str, value: Option<Json>) -> Result<(), PropertyError> {
        self.set_value_with_options(name, value, SetterOptions::default())
    }

    /// Sets the authored input for `name`.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown names or rejected input. The store is
    /// unchanged on error.
    pub fn set_value_with_options(
        &mut self,
        name: &str,
        value: Option<Json>,
        options: SetterOptions,
    ) -> Result<(), PropertyError> {
        let id = self.lookup(name)?;
        let value = PropertyValue::with_options(self.properties.property(id).clone(), value, options)?;
        self.entry_mut(id).value = value;
        Ok(())
    }

    /// The explicit timing for `name`, if one was set.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::UnknownProperty`] for unknown names.
    pub fn get_transition(
        &self,
        name: &str,
    ) -> Result<Option<TransitionSpecification>, PropertyError> {
        let id = self.lookup(name)?;
        Ok(self.entry(id).transition)
    }

    /// Sets explicit timing for `name`. `None` restores the frame default.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::UnknownProperty`] for unknown names.
    pub fn set_transition(
        &mut self,
        name: &str,
        transition: Option<TransitionSpecification>,
    ) -> Result<(), PropertyError> {
        let id = self.lookup(name)?;
        self.entry_mut(id).transition = transition;
        Ok(())
    }

    /// Returns `true` if the current value of `name` depends on feature data.
    #[must_use]
    pub fn is_data_driven(&self, name: &str) -> bool {
        self.properties
            .id(name)
            .is_some_and(|id| self.entry(id).value.is_data_driven())
    }

    /// The authored inputs and explicit timings, keyed by name and
    /// `<name>-transition`.
    #[must_use]
    pub fn serialize(&self) -> Map<String, Json> {
        let mut out = Map::new();
        for (id, entry) in self.values.iter() {
            let name = self.properties.property(id).name();
            if let Some(value) = entry.value.value() {
                out.insert(name.into(), value.clone());
            }
            if let Some(transition) = entry.transition
                && let Ok(json) = serde_json::to_value(transition)
            {
                out.insert(format!("{name}-transition"), json);
            }
        }
        out
    }

    /// Starts transitions from `prior` to the current values.
    ///
    /// In-flight transitions in `prior` continue as the starting point of
    /// the new ones.
    #[must_use]
    pub fn transitioned(
        &self,
        parameters: &TransitionParameters,
        mut prior: Transitioning,
    ) -> Transitioning {
        let values = self
            .values
            .iter()
            .map(|(id, entry)| {
                let prior_value = prior
                    .values
                    .remove(id)
                    .unwrap_or_else(|| self.properties.default_transitioning(id).clone());
                (id, entry.transitioned(parameters, prior_value))
            })
            .collect();
        Transitioning {
            properties: self.properties.clone(),
            values,
        }
    }

    /// The current values with no transitions in flight.
    #[must_use]
    pub fn untransitioned(&self) -> Transitioning {
        Transitioning {
            properties: self.properties.clone(),
            values: self
                .values
                .iter()
                .map(|(id, entry)| (id, entry.untransitioned()))
                .collect(),
        }
    }
}

/// Paint values for one layer, possibly mid-transition.
#[derive(Clone, Debug, PartialEq)]
pub struct Transitioning {
    properties: Arc<Properties>,
    values: OwnEntries<TransitioningPropertyValue>,
}

impl Transitioning {
    /// Creates a store holding only defaults.
    #[must_use]
    pub fn new(properties: Arc<Properties>) -> Self {
        Self {
            properties,
            values: OwnEntries::default(),
        }
    }

    /// The value for `name`, or `None` for unknown names.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TransitioningPropertyValue> {
        let id = self.properties.id(name)?;
        Some(
            self.values
                .get(id)
                .unwrap_or_else(|| self.properties.default_transitioning(id)),
        )
    }

    /// Reduces every property at `parameters`, pruning finished transitions.
    pub fn possibly_evaluate(&mut self, parameters: &EvaluationParameters) -> PossiblyEvaluated {
        let values = self
            .values
            .iter_mut()
            .map(|(id, value)| (id, value.possibly_evaluate(parameters)))
            .collect();
        PossiblyEvaluated::from_entries(self.properties.clone(), values)
    }

    /// Returns `true` if any property still links an earlier value.
    #[must_use]
    pub fn has_transition(&self) -> bool {
        self.values.iter().any(|(_, value)| value.has_prior())
    }
}
