// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Static per-property metadata.
//!
//! A [`PropertySpecification`] describes one paint or layout property: its
//! value type, its default, and which kinds of expressions and transitions
//! it accepts. Specifications are built once at startup and shared.

use bitflags::bitflags;

use crate::coerce::coerce;
use crate::value::Value;

/// The declared value type of a property.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PropertyType {
    /// A number.
    Number,
    /// A boolean.
    Boolean,
    /// A free-form string.
    String,
    /// One of a fixed set of strings.
    Enum(&'static [&'static str]),
    /// A color.
    Color,
    /// An array, optionally of fixed length.
    Array {
        /// The element type.
        item: ArrayItem,
        /// The required length, if fixed.
        length: Option<usize>,
    },
    /// Rich text.
    Formatted,
    /// A reference to an image by name.
    ResolvedImage,
}

/// Element type of a [`PropertyType::Array`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArrayItem {
    /// Numeric elements.
    Number,
    /// String elements.
    String,
}

impl PropertyType {
    /// Returns `true` if values of this type can be interpolated numerically.
    #[must_use]
    pub fn is_interpolatable(self) -> bool {
        matches!(
            self,
            Self::Number
                | Self::Color
                | Self::Array {
                    item: ArrayItem::Number,
                    ..
                }
        )
    }
}

bitflags! {
    /// The inputs an expression for a property may depend on.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct ExpressionParameters: u8 {
        /// The camera zoom.
        const ZOOM = 1 << 0;
        /// Feature attributes.
        const FEATURE = 1 << 1;
        /// Feature state.
        const FEATURE_STATE = 1 << 2;
        /// Heatmap density, for heatmap color ramps.
        const HEATMAP_DENSITY = 1 << 3;
        /// Line progress, for line gradients.
        const LINE_PROGRESS = 1 << 4;
    }
}

/// Static metadata for a single style property.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertySpecification {
    name: &'static str,
    ty: PropertyType,
    default: Option<serde_json::Value>,
    transition: bool,
    overridable: bool,
    interpolated: bool,
    parameters: ExpressionParameters,
}

impl PropertySpecification {
    /// Starts building a specification for `name` with the given type.
    #[must_use]
    pub fn builder(name: &'static str, ty: PropertyType) -> PropertySpecificationBuilder {
        PropertySpecificationBuilder {
            spec: Self {
                name,
                ty,
                default: None,
                transition: false,
                overridable: false,
                interpolated: ty.is_interpolatable(),
                parameters: ExpressionParameters::ZOOM,
            },
        }
    }

    /// The property name, e.g. `"circle-radius"`.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared value type.
    #[must_use]
    #[inline]
    pub fn ty(&self) -> PropertyType {
        self.ty
    }

    /// The default literal, as authored.
    #[must_use]
    #[inline]
    pub fn default_json(&self) -> Option<&serde_json::Value> {
        self.default.as_ref()
    }

    /// The default literal coerced to the declared type, or [`Value::Null`]
    /// when the property has no default.
    #[must_use]
    pub fn default_value(&self) -> Value {
        self.default
            .as_ref()
            .map_or(Value::Null, |json| coerce(Value::from_json(json), self.ty))
    }

    /// Whether changes to this property animate.
    #[must_use]
    #[inline]
    pub fn transition(&self) -> bool {
        self.transition
    }

    /// Whether rich-text sections may override this property per span.
    #[must_use]
    #[inline]
    pub fn overridable(&self) -> bool {
        self.overridable
    }

    /// Whether zoom curves for this property may interpolate.
    #[must_use]
    #[inline]
    pub fn interpolated(&self) -> bool {
        self.interpolated
    }

    /// The inputs expressions for this property may depend on.
    #[must_use]
    #[inline]
    pub fn parameters(&self) -> ExpressionParameters {
        self.parameters
    }

    /// Whether expressions for this property may read feature data.
    #[must_use]
    pub fn supports_data_driven(&self) -> bool {
        self.parameters
            .intersects(ExpressionParameters::FEATURE | ExpressionParameters::FEATURE_STATE)
    }
}

/// Builder for [`PropertySpecification`].
///
/// ```rust
/// use carto_spec::{ExpressionParameters, PropertySpecification, PropertyType};
/// use serde_json::json;
///
/// let spec = PropertySpecification::builder("circle-radius", PropertyType::Number)
///     .default(json!(5))
///     .transition(true)
///     .data_driven()
///     .build();
///
/// assert!(spec.transition());
/// assert!(spec.supports_data_driven());
/// assert!(spec.parameters().contains(ExpressionParameters::ZOOM));
/// ```
#[derive(Clone, Debug)]
pub struct PropertySpecificationBuilder {
    spec: PropertySpecification,
}

impl PropertySpecificationBuilder {
    /// Sets the default literal.
    #[must_use]
    pub fn default(mut self, value: serde_json::Value) -> Self {
        self.spec.default = Some(value);
        self
    }

    /// Sets whether changes animate.
    #[must_use]
    pub fn transition(mut self, transition: bool) -> Self {
        self.spec.transition = transition;
        self
    }

    /// Marks the property as overridable by formatted text sections.
    #[must_use]
    pub fn overridable(mut self) -> Self {
        self.spec.overridable = true;
        self
    }

    /// Allows zoom, feature, and feature-state inputs.
    #[must_use]
    pub fn data_driven(mut self) -> Self {
        self.spec.parameters |= ExpressionParameters::ZOOM
            | ExpressionParameters::FEATURE
            | ExpressionParameters::FEATURE_STATE;
        self
    }

    /// Replaces the accepted expression inputs.
    #[must_use]
    pub fn parameters(mut self, parameters: ExpressionParameters) -> Self {
        self.spec.parameters = parameters;
        self
    }

    /// Sets whether zoom curves may interpolate.
    #[must_use]
    pub fn interpolated(mut self, interpolated: bool) -> Self {
        self.spec.interpolated = interpolated;
        self
    }

    /// Builds the specification.
    #[must_use]
    pub fn build(self) -> PropertySpecification {
        self.spec
    }
}
