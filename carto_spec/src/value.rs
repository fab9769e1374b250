// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runtime values produced by evaluating style input.

use std::collections::BTreeMap;

use hashbrown::HashMap;

use crate::color::{Color, color_to_css};

/// A fully evaluated style value.
///
/// [`Value::Null`] doubles as the "unset" value: properties without a default
/// evaluate to it, and consumers treat it as "defer to a sibling property".
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string, also used for resolved image names and enum values.
    String(String),
    /// A color.
    Color(Color),
    /// An array of values.
    Array(Vec<Self>),
    /// An object.
    Object(BTreeMap<String, Self>),
    /// Rich text made of independently styled sections.
    Formatted(Formatted),
}

impl Value {
    /// Converts a JSON literal into a value without any type coercion.
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::String(s.clone()),
            serde_json::Value::Array(items) => {
                Self::Array(items.iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => Self::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts this value back into JSON.
    ///
    /// Colors are rendered as CSS `rgba(...)` strings and formatted text as
    /// its concatenated plain text.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Color(c) => serde_json::Value::String(color_to_css(*c)),
            Self::Array(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Self::Formatted(f) => serde_json::Value::String(f.to_plain_text()),
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the number, if this is one.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the color, if this is one.
    #[must_use]
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the array elements, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the formatted text, if this is formatted.
    #[must_use]
    pub fn as_formatted(&self) -> Option<&Formatted> {
        match self {
            Self::Formatted(f) => Some(f),
            _ => None,
        }
    }

    /// Truthiness as used by color-ramp presence checks and `case` conditions.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Color(_) | Self::Array(_) | Self::Object(_) | Self::Formatted(_) => true,
        }
    }

    /// A short type name used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Color(_) => "color",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Formatted(_) => "formatted",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Color(a), Self::Color(b)) => a.components == b.components,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Formatted(a), Self::Formatted(b)) => a == b,
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Color> for Value {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

/// Rich text: a sequence of sections, each of which may override paint
/// properties for its own span.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Formatted {
    /// The sections in display order.
    pub sections: Vec<FormattedSection>,
}

impl Formatted {
    /// Creates formatted text made of a single unstyled section.
    #[must_use]
    pub fn from_plain(text: impl Into<String>) -> Self {
        Self {
            sections: vec![FormattedSection::new(text)],
        }
    }

    /// Concatenates the text of every section.
    #[must_use]
    pub fn to_plain_text(&self) -> String {
        self.sections.iter().map(|s| s.text.as_str()).collect()
    }

    /// Returns `true` if any section carries an explicit value for `property`.
    #[must_use]
    pub fn has_override_for(&self, property: &str) -> bool {
        self.sections
            .iter()
            .any(|section| section.override_for(property).is_some())
    }
}

/// One span of [`Formatted`] text.
#[derive(Clone, Debug, Default)]
pub struct FormattedSection {
    /// The span's text.
    pub text: String,
    /// Font scale relative to `text-size`.
    pub scale: Option<f64>,
    /// Comma separated font stack.
    pub font_stack: Option<String>,
    /// Per-span override for `text-color`.
    pub text_color: Option<Color>,
}

impl FormattedSection {
    /// Creates an unstyled section.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Sets the `text-color` override for this span.
    #[must_use]
    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = Some(color);
        self
    }

    /// Returns this span's explicit value for an overridable paint property.
    #[must_use]
    pub fn override_for(&self, property: &str) -> Option<Value> {
        match property {
            "text-color" => self.text_color.map(Value::Color),
            _ => None,
        }
    }
}

impl PartialEq for FormattedSection {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
            && self.scale == other.scale
            && self.font_stack == other.font_stack
            && self.text_color.map(|c| c.components) == other.text_color.map(|c| c.components)
    }
}

/// Per-feature mutable state, keyed by attribute name.
pub type FeatureState = HashMap<String, Value>;

/// A rendered feature as seen by data-driven expressions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Feature {
    /// The feature identifier, if any.
    pub id: Option<Value>,
    /// The feature's attributes.
    pub properties: HashMap<String, Value>,
}

impl Feature {
    /// Creates a feature without attributes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_conversion() {
        let value = Value::from_json(&json!([1, "a", true, null]));
        assert_eq!(
            value,
            Value::Array(vec![
                Value::Number(1.0),
                Value::from("a"),
                Value::Bool(true),
                Value::Null
            ])
        );
        assert_eq!(value.to_json(), json!([1.0, "a", true, null]));
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(Value::Color(Color::new([0.0, 0.0, 0.0, 0.0])).is_truthy());
        assert!(Value::from("x").is_truthy());
    }

    #[test]
    fn section_overrides() {
        let red = Color::new([1.0, 0.0, 0.0, 1.0]);
        let formatted = Formatted {
            sections: vec![
                FormattedSection::new("a"),
                FormattedSection::new("b").with_text_color(red),
            ],
        };
        assert!(formatted.has_override_for("text-color"));
        assert!(!formatted.has_override_for("text-halo-color"));
        assert_eq!(formatted.to_plain_text(), "ab");
        assert_eq!(
            formatted.sections[1].override_for("text-color"),
            Some(Value::Color(red))
        );
    }
}
