// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-layer-type property container.
//!
//! [`Properties`] holds the property descriptors of one layer type together
//! with their default value at every stage. It is built once and shared by
//! every store of every layer of that type.

use std::sync::Arc;

use hashbrown::HashMap;

use crate::id::PropertyId;
use crate::parameters::EvaluationParameters;
use crate::possibly_evaluated::Evaluated;
use crate::property::Property;
use crate::transition::{TransitionablePropertyValue, TransitioningPropertyValue};
use crate::value::PropertyValue;

/// Property descriptors and their default values, indexed by [`PropertyId`].
///
/// # Example
///
/// ```rust
/// use carto_property::{Properties, Property};
/// use carto_spec::{PropertySpecification, PropertyType, Value};
/// use serde_json::json;
///
/// let mut builder = Properties::builder();
/// let opacity = builder.register(Property::DataDriven(
///     PropertySpecification::builder("fill-opacity", PropertyType::Number)
///         .default(json!(1))
///         .data_driven()
///         .build(),
/// ));
/// let properties = builder.build();
///
/// assert_eq!(properties.id("fill-opacity"), Some(opacity));
/// assert_eq!(
///     properties.default_possibly_evaluated(opacity).constant_value(),
///     Some(&Value::Number(1.0))
/// );
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Properties {
    properties: Vec<Arc<Property>>,
    by_name: HashMap<&'static str, PropertyId>,
    default_values: Vec<PropertyValue>,
    default_transitionable: Vec<TransitionablePropertyValue>,
    default_transitioning: Vec<TransitioningPropertyValue>,
    default_possibly_evaluated: Vec<Evaluated>,
    overridable: Vec<PropertyId>,
}

impl Properties {
    /// Starts an empty container.
    #[must_use]
    pub fn builder() -> PropertiesBuilder {
        PropertiesBuilder::default()
    }

    /// Returns the number of properties.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if the container has no properties.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Looks up a property by name.
    #[must_use]
    pub fn id(&self, name: &str) -> Option<PropertyId> {
        self.by_name.get(name).copied()
    }

    /// The descriptor for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this container.
    #[must_use]
    pub fn property(&self, id: PropertyId) -> &Arc<Property> {
        &self.properties[id.slot()]
    }

    /// The descriptor named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<Property>> {
        self.id(name).map(|id| self.property(id))
    }

    /// Iterates over every property in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &Arc<Property>)> + '_ {
        self.properties.iter().enumerate().map(|(slot, property)| {
            #[expect(clippy::cast_possible_truncation, reason = "checked at registration")]
            let id = PropertyId::new(slot as u16);
            (id, property)
        })
    }

    /// Properties that rich-text sections may override per span.
    #[must_use]
    pub fn overridable(&self) -> &[PropertyId] {
        &self.overridable
    }

    /// The default authored value of `id`.
    #[must_use]
    pub fn default_value(&self, id: PropertyId) -> &PropertyValue {
        &self.default_values[id.slot()]
    }

    /// The default transitionable value of `id`.
    #[must_use]
    pub fn default_transitionable(&self, id: PropertyId) -> &TransitionablePropertyValue {
        &self.default_transitionable[id.slot()]
    }

    /// The default transitioning value of `id`.
    #[must_use]
    pub fn default_transitioning(&self, id: PropertyId) -> &TransitioningPropertyValue {
        &self.default_transitioning[id.slot()]
    }

    /// The default reduced value of `id`, as seen at zoom 0.
    #[must_use]
    pub fn default_possibly_evaluated(&self, id: PropertyId) -> &Evaluated {
        &self.default_possibly_evaluated[id.slot()]
    }
}

/// Builder for [`Properties`].
#[derive(Debug, Default)]
pub struct PropertiesBuilder {
    properties: Vec<Arc<Property>>,
    by_name: HashMap<&'static str, PropertyId>,
}

impl PropertiesBuilder {
    /// Registers `property` and returns its id.
    ///
    /// # Panics
    ///
    /// Panics if a property with the same name is already registered,
    /// or if more than 65,535 properties are registered.
    pub fn register(&mut self, property: Property) -> PropertyId {
        let name = property.name();
        assert!(
            !self.by_name.contains_key(name),
            "Property '{name}' is already registered"
        );
        assert!(
            self.properties.len() < u16::MAX as usize,
            "Too many properties registered (max {})",
            u16::MAX
        );

        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let id = PropertyId::new(self.properties.len() as u16);

        self.properties.push(Arc::new(property));
        self.by_name.insert(name, id);
        id
    }

    /// Computes every default and freezes the container.
    #[must_use]
    pub fn build(self) -> Arc<Properties> {
        let parameters = EvaluationParameters::new(0.0);
        let default_values: Vec<_> = self
            .properties
            .iter()
            .map(|property| PropertyValue::default_for(property.clone()))
            .collect();
        let default_transitionable: Vec<_> = self
            .properties
            .iter()
            .map(|property| TransitionablePropertyValue::new(property.clone()))
            .collect();
        let default_transitioning: Vec<_> = default_transitionable
            .iter()
            .map(TransitionablePropertyValue::untransitioned)
            .collect();
        let default_possibly_evaluated = default_transitioning
            .iter()
            .map(|value| value.clone().possibly_evaluate(&parameters))
            .collect();
        let mut overridable: Vec<_> = self
            .by_name
            .values()
            .copied()
            .filter(|id| self.properties[id.slot()].specification().overridable())
            .collect();
        overridable.sort_unstable();

        Arc::new(Properties {
            properties: self.properties,
            by_name: self.by_name,
            default_values,
            default_transitionable,
            default_transitioning,
            default_possibly_evaluated,
            overridable,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carto_spec::{PropertySpecification, PropertyType, Value};
    use serde_json::json;

    fn builder() -> PropertiesBuilder {
        let mut builder = Properties::builder();
        builder.register(Property::DataDriven(
            PropertySpecification::builder("text-color", PropertyType::Color)
                .default(json!("#000000"))
                .transition(true)
                .overridable()
                .data_driven()
                .build(),
        ));
        builder.register(Property::DataDriven(
            PropertySpecification::builder("text-opacity", PropertyType::Number)
                .default(json!(1))
                .transition(true)
                .data_driven()
                .build(),
        ));
        builder
    }

    #[test]
    fn ids_follow_registration_order() {
        let properties = builder().build();
        let names: Vec<_> = properties.iter().map(|(_, p)| p.name()).collect();
        assert_eq!(names, ["text-color", "text-opacity"]);
        assert_eq!(properties.id("text-opacity"), Some(PropertyId::new(1)));
        assert_eq!(properties.id("text-size"), None);
        assert_eq!(properties.len(), 2);
    }

    #[test]
    fn defaults_at_every_stage() {
        let properties = builder().build();
        let id = PropertyId::new(1);
        assert!(properties.default_value(id).value().is_none());
        assert!(properties.default_transitionable(id).transition().is_none());
        assert!(!properties.default_transitioning(id).has_prior());
        assert_eq!(
            properties.default_possibly_evaluated(id).constant_value(),
            Some(&Value::Number(1.0))
        );
    }

    #[test]
    fn overridable_properties_are_listed() {
        let properties = builder().build();
        assert_eq!(properties.overridable(), [PropertyId::new(0)]);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn duplicate_names_panic() {
        let mut builder = builder();
        builder.register(Property::DataDriven(
            PropertySpecification::builder("text-opacity", PropertyType::Number).build(),
        ));
    }
}
