// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout property store.

use std::sync::Arc;

use serde_json::{Map, Value as Json};

use crate::defaults::Properties;
use crate::error::PropertyError;
use crate::id::PropertyId;
use crate::parameters::{EvaluationParameters, SetterOptions};
use crate::possibly_evaluated::PossiblyEvaluated;
use crate::store::OwnEntries;
use crate::value::PropertyValue;

/// Authored layout values for one layer.
///
/// Layout properties never transition: they reduce straight from the
/// authored value.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    properties: Arc<Properties>,
    values: OwnEntries<PropertyValue>,
}

impl Layout {
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

    fn entry(&self, id: PropertyId) -> &PropertyValue {
        self.values
            .get(id)
            .unwrap_or_else(|| self.properties.default_value(id))
    }

    /// The authored input for `name`, if one was set.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::UnknownProperty`] for unknown names.
    pub fn get_value(&self, name: &str) -> Result<Option<Json>, PropertyError> {
        let id = self.lookup(name)?;
        Ok(self.entry(id).value().cloned())
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
        let property = self.properties.property(id).clone();
        if value.is_none() {
            self.values.remove(id);
            return Ok(());
        }
        let value = PropertyValue::with_options(property, value, options)?;
        self.values.insert(id, value);
        Ok(())
    }

    /// Returns `true` if the current value of `name` depends on feature data.
    #[must_use]
    pub fn is_data_driven(&self, name: &str) -> bool {
        self.properties
            .id(name)
            .is_some_and(|id| self.entry(id).is_data_driven())
    }

    /// The authored inputs, keyed by name.
    #[must_use]
    pub fn serialize(&self) -> Map<String, Json> {
        self.values
            .iter()
            .filter_map(|(id, value)| {
                let json = value.value()?.clone();
                Some((self.properties.property(id).name().to_owned(), json))
            })
            .collect()
    }

    /// Reduces every property at `parameters`.
    #[must_use]
    pub fn possibly_evaluate(&self, parameters: &EvaluationParameters) -> PossiblyEvaluated {
        let values = self
            .values
            .iter()
            .map(|(id, value)| (id, value.possibly_evaluate(parameters)))
            .collect();
        PossiblyEvaluated::from_entries(self.properties.clone(), values)
    }
}
