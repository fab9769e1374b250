// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style layers: per-layer paint and layout stores driven once per frame.

use std::sync::Arc;

use carto_property::{
    CrossfadeParameters, Deferred, EvaluationParameters, Evaluated, FormatSectionOverride, Layout,
    PossiblyEvaluated, PossiblyEvaluatedValue, Properties, PropertyError, SetterOptions,
    TransitionParameters,
    Transitionable, Transitioning,
};
use carto_spec::{Expr, Value};
use log::{trace, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::error::StyleError;
use crate::setter;

/// Derived from `line-width` each frame; never set directly.
const LINE_FLOORWIDTH: &str = "line-floorwidth";

/// The kinds of layer with property tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    /// A solid color or pattern behind everything else.
    Background,
    /// Points drawn as circles.
    Circle,
    /// Filled polygons.
    Fill,
    /// Stroked lines.
    Line,
    /// Point density rendered through a color ramp.
    Heatmap,
    /// Text and icons.
    Symbol,
}

impl LayerType {
    /// Every layer type.
    pub const ALL: [Self; 6] = [
        Self::Background,
        Self::Circle,
        Self::Fill,
        Self::Line,
        Self::Heatmap,
        Self::Symbol,
    ];

    /// The name used in style documents.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Circle => "circle",
            Self::Fill => "fill",
            Self::Line => "line",
            Self::Heatmap => "heatmap",
            Self::Symbol => "symbol",
        }
    }

    /// Looks up a type by its style document name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == name)
    }
}

/// Whether a layer is drawn.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    /// Drawn.
    #[default]
    #[serde(rename = "visible")]
    Visible,
    /// Not drawn.
    #[serde(rename = "none")]
    Hidden,
}

/// A layer as it appears in a style document.
///
/// ```rust
/// use carto_style::{LayerSpecification, LayerType};
/// use serde_json::json;
///
/// let spec: LayerSpecification = serde_json::from_value(json!({
///     "id": "water",
///     "type": "fill",
///     "source": "osm",
///     "source-layer": "water",
///     "paint": {"fill-color": "#0000ff"}
/// }))
/// .unwrap();
/// assert_eq!(spec.ty, LayerType::Fill);
/// assert_eq!(spec.source_layer.as_deref(), Some("water"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerSpecification {
    /// Unique layer id.
    pub id: String,
    /// The layer type.
    #[serde(rename = "type")]
    pub ty: LayerType,
    /// Name of the source to draw from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Layer of a vector source to draw from.
    #[serde(
        default,
        rename = "source-layer",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_layer: Option<String>,
    /// Arbitrary author data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Json>,
    /// Hidden below this zoom.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minzoom: Option<f64>,
    /// Hidden at and above this zoom.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxzoom: Option<f64>,
    /// Feature filter, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Json>,
    /// Layout properties.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub layout: Map<String, Json>,
    /// Paint properties and transitions.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub paint: Map<String, Json>,
}

/// One style layer with its property stores.
///
/// The frame driver calls [`update_transitions`](Self::update_transitions)
/// and then [`recalculate`](Self::recalculate); renderers read
/// [`paint`](Self::paint) and [`layout`](Self::layout).
#[derive(Clone, Debug)]
pub struct StyleLayer {
    id: String,
    ty: LayerType,
    source: Option<String>,
    source_layer: Option<String>,
    metadata: Option<Json>,
    minzoom: Option<f64>,
    maxzoom: Option<f64>,
    filter: Option<Json>,
    visibility: Option<Visibility>,
    unevaluated_layout: Layout,
    layout: PossiblyEvaluated,
    transitionable: Transitionable,
    transitioning: Transitioning,
    paint: PossiblyEvaluated,
    crossfade: Option<CrossfadeParameters>,
}

impl StyleLayer {
    /// Builds a layer from its document, sharing the given property tables.
    ///
    /// Properties in the document are not type-checked.
    ///
    /// # Errors
    ///
    /// Returns an error if a property is unknown or malformed.
    pub fn new(
        spec: LayerSpecification,
        paint: Arc<Properties>,
        layout: Arc<Properties>,
    ) -> Result<Self, StyleError> {
        let mut layer = Self {
            id: spec.id,
            ty: spec.ty,
            source: spec.source,
            source_layer: spec.source_layer,
            metadata: spec.metadata,
            minzoom: spec.minzoom,
            maxzoom: spec.maxzoom,
            filter: spec.filter,
            visibility: None,
            unevaluated_layout: Layout::new(layout.clone()),
            layout: PossiblyEvaluated::new(layout),
            transitionable: Transitionable::new(paint.clone()),
            transitioning: Transitioning::new(paint.clone()),
            paint: PossiblyEvaluated::new(paint),
            crossfade: None,
        };
        let unchecked = SetterOptions { validate: false };
        for (name, value) in spec.paint {
            layer.set_paint_property(&name, Some(value), unchecked)?;
        }
        for (name, value) in spec.layout {
            layer.set_layout_property(&name, Some(value), unchecked)?;
        }
        layer.transitioning = layer.transitionable.untransitioned();
        Ok(layer)
    }

    /// The layer id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The layer type.
    #[must_use]
    pub fn layer_type(&self) -> LayerType {
        self.ty
    }

    /// Name of the source to draw from.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Layer of a vector source to draw from.
    #[must_use]
    pub fn source_layer(&self) -> Option<&str> {
        self.source_layer.as_deref()
    }

    /// The feature filter.
    #[must_use]
    pub fn filter(&self) -> Option<&Json> {
        self.filter.as_ref()
    }

    /// Sets the zoom range outside which the layer is hidden.
    pub fn set_zoom_range(&mut self, minzoom: Option<f64>, maxzoom: Option<f64>) {
        self.minzoom = minzoom;
        self.maxzoom = maxzoom;
    }

    /// The authored layout value for `name`, if set.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown names.
    pub fn get_layout_property(&self, name: &str) -> Result<Option<Json>, StyleError> {
        if name == "visibility" {
            return Ok(self.visibility.map(serde_json::to_value).transpose()?);
        }
        Ok(self.unevaluated_layout.get_value(name)?)
    }

    /// Sets a layout property. `None` or JSON `null` resets it.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown names or rejected input; the layer is
    /// unchanged on error.
    pub fn set_layout_property(
        &mut self,
        name: &str,
        value: Option<Json>,
        options: SetterOptions,
    ) -> Result<(), StyleError> {
        let value = value.filter(|json| !json.is_null());
        if name == "visibility" {
            self.visibility = value.map(serde_json::from_value).transpose()?;
            return Ok(());
        }
        self.unevaluated_layout
            .set_value_with_options(name, value, options)?;
        Ok(())
    }

    /// The authored paint value for `name`, or the timing for
    /// `<name>-transition`.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown names.
    pub fn get_paint_property(&self, name: &str) -> Result<Option<Json>, StyleError> {
        setter::get(&self.transitionable, name)
    }

    /// Sets a paint property, or its timing for `<name>-transition`.
    ///
    /// Returns `true` when the change invalidates per-feature data already
    /// built for this layer: the old or new value is data-driven, the
    /// property is cross-faded, or a formatted `text-field` overrides it.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown names or rejected input; the layer is
    /// unchanged on error.
    pub fn set_paint_property(
        &mut self,
        name: &str,
        value: Option<Json>,
        options: SetterOptions,
    ) -> Result<bool, StyleError> {
        if name.strip_suffix(setter::TRANSITION_SUFFIX).unwrap_or(name) == LINE_FLOORWIDTH {
            return Err(PropertyError::UnknownProperty(name.into()).into());
        }
        if name.ends_with(setter::TRANSITION_SUFFIX) {
            setter::set(&mut self.transitionable, name, value, options)?;
            return Ok(false);
        }
        let was_data_driven = self.transitionable.is_data_driven(name);
        setter::set(&mut self.transitionable, name, value, options)?;
        let is_data_driven = self.transitionable.is_data_driven(name);
        let cross_faded = self
            .transitionable
            .properties()
            .get(name)
            .is_some_and(|property| property.is_cross_faded());
        Ok(was_data_driven
            || is_data_driven
            || cross_faded
            || (self.ty == LayerType::Symbol && has_paint_override(&self.layout, name)))
    }

    /// The layer's visibility.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility.unwrap_or_default()
    }

    /// Returns `true` if the layer is not drawn at `zoom`.
    #[must_use]
    pub fn is_hidden(&self, zoom: f64) -> bool {
        if self.minzoom.is_some_and(|min| min > 0.0 && zoom < min) {
            return true;
        }
        if self.maxzoom.is_some_and(|max| max > 0.0 && zoom >= max) {
            return true;
        }
        self.visibility() == Visibility::Hidden
    }

    /// Starts transitions toward the current paint values, continuing any
    /// in flight.
    pub fn update_transitions(&mut self, parameters: &TransitionParameters) {
        let prior = std::mem::replace(
            &mut self.transitioning,
            Transitioning::new(self.transitionable.properties().clone()),
        );
        self.transitioning = self.transitionable.transitioned(parameters, prior);
    }

    /// Returns `true` while any paint property is mid-transition.
    #[must_use]
    pub fn has_transition(&self) -> bool {
        self.transitioning.has_transition()
    }

    /// Reduces layout and paint for the frame described by `parameters`.
    pub fn recalculate(&mut self, parameters: &EvaluationParameters) {
        trace!("recalculating layer '{}'", self.id);
        self.crossfade = Some(parameters.crossfade_parameters());
        self.layout = self.unevaluated_layout.possibly_evaluate(parameters);
        self.paint = self.transitioning.possibly_evaluate(parameters);
        match self.ty {
            LayerType::Fill => self.resolve_fill_outline(),
            LayerType::Line => self.resolve_line_floorwidth(parameters),
            LayerType::Symbol => {
                self.resolve_symbol_alignments();
                self.set_paint_overrides();
            }
            _ => {}
        }
    }

    /// Reduced paint values from the last [`recalculate`](Self::recalculate).
    #[must_use]
    pub fn paint(&self) -> &PossiblyEvaluated {
        &self.paint
    }

    /// Reduced layout values from the last [`recalculate`](Self::recalculate).
    #[must_use]
    pub fn layout(&self) -> &PossiblyEvaluated {
        &self.layout
    }

    /// Cross-fade parameters from the last [`recalculate`](Self::recalculate).
    #[must_use]
    pub fn crossfade_parameters(&self) -> Option<CrossfadeParameters> {
        self.crossfade
    }

    /// Returns `true` if any paint value reads feature state.
    #[must_use]
    pub fn is_state_dependent(&self) -> bool {
        self.paint.own_ids().any(|id| {
            let Some(value) = self.paint.get_by_id(id).as_data_driven() else {
                return false;
            };
            match value.value() {
                PossiblyEvaluatedValue::Source(Deferred::Expression(expression))
                | PossiblyEvaluatedValue::Composite(Deferred::Expression(expression)) => expression
                    .expression()
                    .any(&|e| matches!(e, Expr::FeatureState(_))),
                _ => false,
            }
        })
    }

    /// The layer as a style document, with only authored values.
    #[must_use]
    pub fn serialize(&self) -> LayerSpecification {
        let mut layout = self.unevaluated_layout.serialize();
        if let Some(visibility) = self.visibility
            && let Ok(json) = serde_json::to_value(visibility)
        {
            layout.insert("visibility".into(), json);
        }
        LayerSpecification {
            id: self.id.clone(),
            ty: self.ty,
            source: self.source.clone(),
            source_layer: self.source_layer.clone(),
            metadata: self.metadata.clone(),
            minzoom: self.minzoom,
            maxzoom: self.maxzoom,
            filter: self.filter.clone(),
            layout,
            paint: self.transitionable.serialize(),
        }
    }

    /// An unset outline draws with the fill color.
    fn resolve_fill_outline(&mut self) {
        let unset = self
            .paint
            .constant("fill-outline-color")
            .is_some_and(Value::is_null);
        if unset && let Some(fill) = self.paint.get("fill-color").cloned() {
            replace(&mut self.paint, "fill-outline-color", fill);
        }
    }

    /// Reduces the target `line-width` at the integer zoom of the frame.
    fn resolve_line_floorwidth(&mut self, parameters: &EvaluationParameters) {
        let (Some(floorwidth), Some(width)) = (
            self.paint.properties().get(LINE_FLOORWIDTH).cloned(),
            self.transitioning.get("line-width"),
        ) else {
            return;
        };
        let evaluated = floorwidth.possibly_evaluate(width.value(), parameters);
        replace(&mut self.paint, LINE_FLOORWIDTH, evaluated);
    }

    /// Resolves `auto` alignments from the symbol placement.
    fn resolve_symbol_alignments(&mut self) {
        let along_line = self
            .layout
            .constant("symbol-placement")
            .and_then(Value::as_str)
            .is_some_and(|placement| placement != "point");
        let rotation = if along_line { "map" } else { "viewport" };
        for name in ["text-rotation-alignment", "icon-rotation-alignment"] {
            if self.is_auto(name) {
                replace(&mut self.layout, name, Evaluated::Constant(rotation.into()));
            }
        }
        if self.is_auto("text-pitch-alignment") {
            let text_rotation = self
                .layout
                .constant("text-rotation-alignment")
                .and_then(Value::as_str);
            let pitch = if text_rotation == Some("map") {
                "map"
            } else {
                "viewport"
            };
            replace(
                &mut self.layout,
                "text-pitch-alignment",
                Evaluated::Constant(pitch.into()),
            );
        }
        if self.is_auto("icon-pitch-alignment")
            && let Some(icon_rotation) = self.layout.get("icon-rotation-alignment").cloned()
        {
            replace(&mut self.layout, "icon-pitch-alignment", icon_rotation);
        }
    }

    fn is_auto(&self, name: &str) -> bool {
        self.layout.constant(name).and_then(Value::as_str) == Some("auto")
    }

    /// Defers overridable paint properties to per-span evaluation when the
    /// text field carries span overrides for them.
    fn set_paint_overrides(&mut self) {
        let properties = self.paint.properties().clone();
        for &id in properties.overridable() {
            let property = properties.property(id);
            if !has_paint_override(&self.layout, property.name()) {
                continue;
            }
            let Some(value) = self.paint.get_by_id(id).as_data_driven().cloned() else {
                continue;
            };
            let overridden = FormatSectionOverride::new(property.clone(), value);
            replace(
                &mut self.paint,
                property.name(),
                overridden.into_possibly_evaluated(),
            );
        }
    }
}

fn replace(store: &mut PossiblyEvaluated, name: &str, value: Evaluated) {
    if let Err(err) = store.set(name, value) {
        warn!("cannot replace reduced value: {err}");
    }
}

/// Returns `true` if the reduced `text-field` carries a span override for
/// `name`.
fn has_paint_override(layout: &PossiblyEvaluated, name: &str) -> bool {
    let Some(text_field) = layout.data_driven("text-field") else {
        return false;
    };
    match text_field.value() {
        PossiblyEvaluatedValue::Constant(Value::Formatted(formatted)) => {
            formatted.has_override_for(name)
        }
        PossiblyEvaluatedValue::Source(Deferred::Expression(expression))
        | PossiblyEvaluatedValue::Composite(Deferred::Expression(expression)) => {
            expression_has_override(expression.expression(), name)
        }
        _ => false,
    }
}

fn expression_has_override(expression: &Expr, name: &str) -> bool {
    match expression {
        Expr::Literal(Value::Formatted(formatted)) => formatted.has_override_for(name),
        Expr::Format(sections) => sections.iter().any(|s| s.has_override_for(name)),
        _ => {
            let mut found = false;
            expression.each_child(&mut |child| {
                found = found || expression_has_override(child, name);
            });
            found
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{layout_properties, paint_properties};
    use carto_spec::{Feature, FeatureState};
    use serde_json::json;

    fn layer(json: Json) -> StyleLayer {
        let spec: LayerSpecification = serde_json::from_value(json).unwrap();
        let ty = spec.ty;
        StyleLayer::new(spec, paint_properties(ty), layout_properties(ty)).unwrap()
    }

    #[test]
    fn visibility_and_zoom_range() {
        let mut circles = layer(json!({"id": "c", "type": "circle", "minzoom": 5, "maxzoom": 10}));
        assert!(circles.is_hidden(4.0));
        assert!(!circles.is_hidden(5.0));
        assert!(circles.is_hidden(10.0));

        circles
            .set_layout_property("visibility", Some(json!("none")), SetterOptions::default())
            .unwrap();
        assert_eq!(circles.visibility(), Visibility::Hidden);
        assert!(circles.is_hidden(7.0));
        assert_eq!(circles.get_layout_property("visibility").unwrap(), Some(json!("none")));

        assert!(
            circles
                .set_layout_property("visibility", Some(json!("maybe")), SetterOptions::default())
                .is_err()
        );
        assert_eq!(circles.visibility(), Visibility::Hidden);
    }

    #[test]
    fn paint_updates_report_bucket_invalidation() {
        let mut circles = layer(json!({"id": "c", "type": "circle"}));
        let options = SetterOptions::default();
        assert!(!circles.set_paint_property("circle-radius", Some(json!(4)), options).unwrap());
        assert!(
            circles
                .set_paint_property("circle-radius", Some(json!(["get", "r"])), options)
                .unwrap()
        );
        assert!(circles.set_paint_property("circle-radius", Some(json!(4)), options).unwrap());
        assert!(
            !circles
                .set_paint_property("circle-radius-transition", Some(json!({"duration": 0})), options)
                .unwrap()
        );

        let mut fills = layer(json!({"id": "f", "type": "fill"}));
        assert!(fills.set_paint_property("fill-pattern", Some(json!("stripes")), options).unwrap());
    }

    #[test]
    fn unknown_and_rejected_properties() {
        let mut circles = layer(json!({"id": "c", "type": "circle"}));
        let options = SetterOptions::default();
        assert!(matches!(
            circles.set_paint_property("fill-color", Some(json!("red")), options),
            Err(StyleError::Property(_))
        ));
        assert!(matches!(
            circles.set_paint_property("circle-radius-transition", Some(json!({"speed": 1})), options),
            Err(StyleError::Malformed(_))
        ));
        assert!(circles.get_paint_property("circle-bogus").is_err());
    }

    #[test]
    fn fill_outline_falls_back_to_fill_color() {
        let mut fills = layer(json!({
            "id": "f",
            "type": "fill",
            "paint": {"fill-color": "#ff0000"}
        }));
        fills.recalculate(&EvaluationParameters::new(0.0));
        let outline = fills.paint().constant("fill-outline-color").and_then(Value::as_color);
        assert_eq!(outline.map(|c| c.components), Some([1.0, 0.0, 0.0, 1.0]));

        fills
            .set_paint_property("fill-outline-color", Some(json!("#0000ff")), SetterOptions::default())
            .unwrap();
        fills.update_transitions(&TransitionParameters::new(0.0));
        fills.recalculate(&EvaluationParameters::new(0.0).with_now(1000.0));
        let outline = fills.paint().constant("fill-outline-color").and_then(Value::as_color);
        assert_eq!(outline.map(|c| c.components), Some([0.0, 0.0, 1.0, 1.0]));
    }

    #[test]
    fn symbol_alignments_resolve_from_placement() {
        let mut symbols = layer(json!({
            "id": "s",
            "type": "symbol",
            "layout": {"symbol-placement": "line", "icon-pitch-alignment": "viewport"}
        }));
        symbols.recalculate(&EvaluationParameters::new(0.0));
        let layout = symbols.layout();
        assert_eq!(layout.constant("text-rotation-alignment"), Some(&Value::from("map")));
        assert_eq!(layout.constant("text-pitch-alignment"), Some(&Value::from("map")));
        assert_eq!(layout.constant("icon-rotation-alignment"), Some(&Value::from("map")));
        assert_eq!(layout.constant("icon-pitch-alignment"), Some(&Value::from("viewport")));
    }

    #[test]
    fn feature_state_dependence() {
        let mut circles = layer(json!({
            "id": "c",
            "type": "circle",
            "paint": {"circle-radius": ["coalesce", ["feature-state", "r"], 3]}
        }));
        circles.recalculate(&EvaluationParameters::new(0.0));
        assert!(circles.is_state_dependent());

        let mut state = FeatureState::new();
        state.insert("r".into(), Value::Number(9.0));
        let radius = circles
            .paint()
            .data_driven("circle-radius")
            .map(|v| v.evaluate(&Feature::new(), &state));
        assert_eq!(radius, Some(Value::Number(9.0)));
    }
}
