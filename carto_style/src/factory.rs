// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared property tables, built once per style.

use std::sync::Arc;

use carto_property::{Properties, SetterOptions};
use hashbrown::HashMap;
use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value as Json};

use crate::error::StyleError;
use crate::layer::{LayerSpecification, LayerType, StyleLayer};
use crate::light::Light;
use crate::reference;
use crate::sky::Sky;

/// Builds style objects over property tables shared by every instance.
///
/// Each layer type's tables are built when the factory is created; every
/// layer of that type holds the same [`Arc`].
///
/// ```rust
/// use std::sync::Arc;
///
/// use carto_style::StyleLayerFactory;
/// use serde_json::json;
///
/// let factory = StyleLayerFactory::new();
/// let a = factory.create_from_json(&json!({"id": "a", "type": "line"})).unwrap();
/// let b = factory.create_from_json(&json!({"id": "b", "type": "line"})).unwrap();
/// assert!(Arc::ptr_eq(a.paint().properties(), b.paint().properties()));
///
/// assert!(factory.create_from_json(&json!({"id": "c", "type": "raster"})).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct StyleLayerFactory {
    layers: HashMap<LayerType, (Arc<Properties>, Arc<Properties>)>,
    light: Arc<Properties>,
    sky: Arc<Properties>,
}

impl Default for StyleLayerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleLayerFactory {
    /// Builds the tables for every layer type, the light, and the sky.
    #[must_use]
    pub fn new() -> Self {
        let layers: HashMap<_, _> = LayerType::ALL
            .into_iter()
            .map(|ty| {
                (
                    ty,
                    (reference::paint_properties(ty), reference::layout_properties(ty)),
                )
            })
            .collect();
        debug!("built property tables for {} layer types", layers.len());
        Self {
            layers,
            light: reference::light(),
            sky: reference::sky(),
        }
    }

    /// The paint and layout tables of `ty`.
    #[must_use]
    pub fn properties(&self, ty: LayerType) -> Option<(&Arc<Properties>, &Arc<Properties>)> {
        self.layers.get(&ty).map(|(paint, layout)| (paint, layout))
    }

    /// Creates a layer from its document.
    ///
    /// # Errors
    ///
    /// Returns an error if the type has no tables or a property is unknown
    /// or malformed.
    pub fn create(&self, spec: LayerSpecification) -> Result<StyleLayer, StyleError> {
        let (paint, layout) = self
            .properties(spec.ty)
            .ok_or_else(|| StyleError::UnknownLayerType(spec.ty.as_str().into()))?;
        StyleLayer::new(spec, paint.clone(), layout.clone())
    }

    /// Creates a layer from an untyped document.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::UnknownLayerType`] for types other than
    /// [`LayerType::ALL`], and the errors of [`create`](Self::create).
    pub fn create_from_json(&self, json: &Json) -> Result<StyleLayer, StyleError> {
        if let Some(name) = json.get("type").and_then(Json::as_str)
            && LayerType::from_name(name).is_none()
        {
            return Err(StyleError::UnknownLayerType(name.into()));
        }
        let spec = LayerSpecification::deserialize(json)?;
        self.create(spec)
    }

    /// Creates the light from the style's `light` object, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry is unknown or malformed.
    pub fn light(&self, object: Option<&Map<String, Json>>) -> Result<Light, StyleError> {
        match object {
            Some(object) => Light::from_object(self.light.clone(), object, SetterOptions::default()),
            None => Ok(Light::new(self.light.clone())),
        }
    }

    /// Creates the sky from the style's `sky` object, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry is unknown or malformed.
    pub fn sky(&self, object: Option<&Map<String, Json>>) -> Result<Sky, StyleError> {
        match object {
            Some(object) => Sky::from_object(self.sky.clone(), object, SetterOptions::default()),
            None => Ok(Sky::new(self.sky.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_type_has_tables() {
        let factory = StyleLayerFactory::default();
        for ty in LayerType::ALL {
            assert!(factory.properties(ty).is_some(), "{ty:?} is missing");
        }
    }

    #[test]
    fn layers_share_tables() {
        let factory = StyleLayerFactory::new();
        let a = factory.create_from_json(&json!({"id": "a", "type": "fill"})).unwrap();
        let b = factory.create_from_json(&json!({"id": "b", "type": "fill"})).unwrap();
        assert!(Arc::ptr_eq(a.layout().properties(), b.layout().properties()));
    }

    #[test]
    fn rejects_unknown_type_and_bad_documents() {
        let factory = StyleLayerFactory::new();
        assert!(matches!(
            factory.create_from_json(&json!({"id": "r", "type": "raster"})),
            Err(StyleError::UnknownLayerType(name)) if name == "raster"
        ));
        assert!(matches!(
            factory.create_from_json(&json!({"type": "fill"})),
            Err(StyleError::Malformed(_))
        ));
        assert!(matches!(
            factory.create_from_json(&json!({"id": "f", "type": "fill", "paint": {"line-width": 2}})),
            Err(StyleError::Property(_))
        ));
    }

    #[test]
    fn light_and_sky_from_documents() {
        let factory = StyleLayerFactory::new();
        let light = factory
            .light(json!({"anchor": "map"}).as_object())
            .unwrap();
        assert_eq!(light.get_light().get("anchor"), Some(&json!("map")));
        assert!(factory.sky(None).unwrap().get_sky().is_empty());
        assert!(factory.sky(json!({"fog-depth": 1}).as_object()).is_err());
    }
}
