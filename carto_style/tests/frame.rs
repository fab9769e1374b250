// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-driving tests for `carto_style`.
//!
//! These set properties the way a style editor would, then run the
//! `update_transitions` / `recalculate` cycle a map does each frame and
//! check what a renderer would read back.

use carto_property::{
    EvaluationParameters, SetterOptions, TransitionParameters, TransitionSpecification,
};
use carto_spec::{Feature, FeatureContext, FeatureState, FormattedSection, GlobalState, Value};
use carto_style::{LayerType, StyleLayer, StyleLayerFactory, Visibility};
use serde_json::{Map, Value as Json, json};

fn object(json: Json) -> Map<String, Json> {
    json.as_object().cloned().unwrap()
}

fn layer(factory: &StyleLayerFactory, json: Json) -> StyleLayer {
    factory.create_from_json(&json).unwrap()
}

fn at(zoom: f64, now: f64) -> EvaluationParameters {
    EvaluationParameters::new(zoom).with_now(now)
}

fn three_seconds(now: f64) -> TransitionParameters {
    TransitionParameters::new(now).with_transition(TransitionSpecification::new(3000.0, 0.0))
}

#[test]
fn light_color_midpoint_is_linear_midpoint() {
    let factory = StyleLayerFactory::new();
    let mut light = factory.light(None).unwrap();
    light
        .set_light(&object(json!({"color": "red"})), SetterOptions::default())
        .unwrap();
    light.update_transitions(&three_seconds(0.0));
    light.recalculate(&at(0.0, 1500.0));
    assert_eq!(light.color().components, [1.0, 0.5, 0.5, 1.0]);
    assert!(light.has_transition());

    light.recalculate(&at(0.0, 3001.0));
    assert_eq!(light.color().components, [1.0, 0.0, 0.0, 1.0]);
    assert!(!light.has_transition());
}

#[test]
fn sky_blend_midpoint() {
    let factory = StyleLayerFactory::new();
    let mut sky = factory.sky(None).unwrap();
    sky.set_sky(&object(json!({"atmosphere-blend": 1})), SetterOptions::default())
        .unwrap();
    sky.update_transitions(&three_seconds(0.0));
    sky.recalculate(&at(0.0, 1500.0));
    let blend = sky
        .properties()
        .constant("atmosphere-blend")
        .and_then(Value::as_number)
        .unwrap();
    assert!((blend - 0.9).abs() < 1e-9, "blend was {blend}");
}

#[test]
fn zero_timing_applies_immediately() {
    let factory = StyleLayerFactory::new();
    let mut light = factory.light(None).unwrap();
    light
        .set_light(&object(json!({"intensity": 1})), SetterOptions::default())
        .unwrap();
    light.update_transitions(
        &TransitionParameters::new(0.0).with_transition(TransitionSpecification::new(0.0, 0.0)),
    );
    assert!(!light.has_transition());
    light.recalculate(&at(0.0, 0.0));
    assert_eq!(light.intensity(), 1.0);
}

#[test]
fn legacy_zoom_stops() {
    let factory = StyleLayerFactory::new();
    let mut light = factory
        .light(Some(&object(json!({"intensity": {"stops": [[16, 0.2], [17, 0.8]]}}))))
        .unwrap();
    light.recalculate(&EvaluationParameters::new(16.5));
    assert!((light.intensity() - 0.5).abs() < 1e-9);
}

#[test]
fn zoom_breakpoints() {
    let factory = StyleLayerFactory::new();
    let mut sky = factory
        .sky(Some(&object(json!({
            "atmosphere-blend": ["interpolate", ["linear"], ["zoom"], 0, 1, 5, 1, 7, 0]
        }))))
        .unwrap();
    sky.recalculate(&EvaluationParameters::new(6.0));
    assert_eq!(
        sky.properties().constant("atmosphere-blend"),
        Some(&Value::Number(0.5))
    );
}

#[test]
fn global_state_is_read_each_frame() {
    let factory = StyleLayerFactory::new();
    let mut circles = layer(
        &factory,
        json!({
            "id": "points",
            "type": "circle",
            "paint": {"circle-radius": ["global-state", "size"]}
        }),
    );

    let mut state: GlobalState = [("size", 17.0)].into_iter().collect();
    circles.recalculate(&EvaluationParameters::new(0.0).with_global_state(state.clone()));
    assert_eq!(
        circles.paint().constant("circle-radius"),
        Some(&Value::Number(17.0))
    );

    state.set("size", 4.0);
    circles.recalculate(&EvaluationParameters::new(0.0).with_global_state(state));
    assert_eq!(
        circles.paint().constant("circle-radius"),
        Some(&Value::Number(4.0))
    );
}

#[test]
fn data_driven_target_snaps_mid_transition() {
    let factory = StyleLayerFactory::new();
    let mut circles = layer(&factory, json!({"id": "points", "type": "circle"}));
    let options = SetterOptions::default();

    circles
        .set_paint_property("circle-radius", Some(json!(10)), options)
        .unwrap();
    circles.update_transitions(&TransitionParameters::new(0.0));
    circles.recalculate(&at(0.0, 150.0));
    assert!(circles.has_transition());

    assert!(
        circles
            .set_paint_property("circle-radius", Some(json!(["get", "r"])), options)
            .unwrap()
    );
    circles.update_transitions(&TransitionParameters::new(150.0));
    circles.recalculate(&at(0.0, 200.0));
    assert!(!circles.has_transition());

    let feature = Feature::new().with_property("r", 7.0);
    let radius = circles
        .paint()
        .data_driven("circle-radius")
        .map(|value| value.evaluate(&feature, &FeatureState::new()));
    assert_eq!(radius, Some(Value::Number(7.0)));
}

#[test]
fn text_color_span_override() {
    let factory = StyleLayerFactory::new();
    let mut symbols = layer(
        &factory,
        json!({
            "id": "labels",
            "type": "symbol",
            "layout": {"text-field": ["format", "Main St", {"text-color": "#ff0000"}]},
            "paint": {"text-color": ["get", "color"]}
        }),
    );
    symbols.recalculate(&EvaluationParameters::new(0.0));

    let text_color = symbols.paint().data_driven("text-color").unwrap();
    let feature = Feature::new().with_property("color", "#0000ff");
    let state = FeatureState::new();

    let plain = text_color.evaluate(&feature, &state);
    assert_eq!(plain.as_color().map(|c| c.components), Some([0.0, 0.0, 1.0, 1.0]));

    let span = FormattedSection::new("Main St")
        .with_text_color(carto_spec::color::parse_color("#ff0000").unwrap());
    let overridden = text_color.evaluate_in(&FeatureContext::new(&feature, &state).with_section(&span));
    assert_eq!(overridden.as_color().map(|c| c.components), Some([1.0, 0.0, 0.0, 1.0]));

    assert!(
        symbols
            .set_paint_property("text-color", Some(json!("#00ff00")), SetterOptions::default())
            .unwrap()
    );
}

#[test]
fn zoom_dependent_text_field_still_overrides_text_color() {
    let factory = StyleLayerFactory::new();
    let mut symbols = layer(
        &factory,
        json!({
            "id": "labels",
            "type": "symbol",
            "layout": {
                "text-field": [
                    "step", ["zoom"],
                    ["format", ["get", "name"], {"text-color": "#ff0000"}],
                    10, ["format", ["get", "name"], {}]
                ]
            },
            "paint": {"text-color": ["get", "color"]}
        }),
    );
    symbols.recalculate(&EvaluationParameters::new(5.0));

    let text_color = symbols.paint().data_driven("text-color").unwrap();
    let feature = Feature::new()
        .with_property("name", "Main St")
        .with_property("color", "#0000ff");
    let state = FeatureState::new();
    let span = FormattedSection::new("Main St")
        .with_text_color(carto_spec::color::parse_color("#ff0000").unwrap());
    let overridden = text_color.evaluate_in(&FeatureContext::new(&feature, &state).with_section(&span));
    assert_eq!(overridden.as_color().map(|c| c.components), Some([1.0, 0.0, 0.0, 1.0]));

    assert!(
        symbols
            .set_paint_property("text-color", Some(json!("#00ff00")), SetterOptions::default())
            .unwrap()
    );
}

#[test]
fn line_floorwidth_follows_width_at_integer_zoom() {
    let factory = StyleLayerFactory::new();
    let mut lines = layer(
        &factory,
        json!({
            "id": "roads",
            "type": "line",
            "paint": {"line-width": ["interpolate", ["linear"], ["zoom"], 10, 1, 16, 7]}
        }),
    );
    lines.recalculate(&EvaluationParameters::new(12.5));
    assert_eq!(lines.paint().constant("line-width"), Some(&Value::Number(3.5)));
    assert_eq!(
        lines.paint().constant("line-floorwidth"),
        Some(&Value::Number(3.0))
    );

    // Tracks the target width, not the in-flight blend.
    lines
        .set_paint_property("line-width", Some(json!(9)), SetterOptions::default())
        .unwrap();
    lines.update_transitions(&TransitionParameters::new(0.0));
    lines.recalculate(&at(12.5, 150.0));
    assert!(lines.has_transition());
    assert_eq!(
        lines.paint().constant("line-floorwidth"),
        Some(&Value::Number(9.0))
    );

    assert!(
        lines
            .set_paint_property("line-floorwidth", Some(json!(2)), SetterOptions::default())
            .is_err()
    );
    assert!(!lines.serialize().paint.contains_key("line-floorwidth"));
}

#[test]
fn serialize_round_trips_through_the_factory() {
    let factory = StyleLayerFactory::new();
    let document = json!({
        "id": "water",
        "type": "fill",
        "source": "osm",
        "source-layer": "water",
        "minzoom": 2.0,
        "layout": {"visibility": "none"},
        "paint": {
            "fill-color": "#0000ff",
            "fill-color-transition": {"duration": 500.0}
        }
    });
    let water = layer(&factory, document.clone());
    assert_eq!(water.layer_type(), LayerType::Fill);
    assert_eq!(water.visibility(), Visibility::Hidden);

    let serialized = serde_json::to_value(water.serialize()).unwrap();
    assert_eq!(serialized, document);

    let replayed = layer(&factory, serialized);
    assert_eq!(replayed.serialize(), water.serialize());
}

#[test]
fn recalculate_is_idempotent() {
    let factory = StyleLayerFactory::new();
    let mut lines = layer(
        &factory,
        json!({
            "id": "roads",
            "type": "line",
            "paint": {
                "line-width": ["interpolate", ["linear"], ["zoom"], 10, 1, 16, 8],
                "line-color": ["get", "color"]
            }
        }),
    );
    lines
        .set_paint_property("line-opacity", Some(json!(0.5)), SetterOptions::default())
        .unwrap();
    lines.update_transitions(&TransitionParameters::new(0.0));

    lines.recalculate(&at(13.0, 100.0));
    let first = lines.paint().clone();
    lines.recalculate(&at(13.0, 100.0));
    assert_eq!(lines.paint(), &first);
}

#[test]
fn hidden_by_zoom_range_and_visibility() {
    let factory = StyleLayerFactory::new();
    let mut heat = layer(
        &factory,
        json!({"id": "heat", "type": "heatmap", "minzoom": 3, "maxzoom": 9}),
    );
    assert!(heat.is_hidden(2.0));
    assert!(!heat.is_hidden(3.0));
    assert!(heat.is_hidden(9.0));

    heat.set_zoom_range(None, None);
    assert!(!heat.is_hidden(20.0));
    heat.set_layout_property("visibility", Some(json!("none")), SetterOptions::default())
        .unwrap();
    assert!(heat.is_hidden(20.0));
    heat.set_layout_property("visibility", None, SetterOptions::default())
        .unwrap();
    assert_eq!(heat.visibility(), Visibility::Visible);
}
