// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tables for the light, the sky, and each layer type.
//!
//! Each function builds a fresh [`Properties`] container. Building is not
//! free, so callers build each table once and share it; see
//! [`StyleLayerFactory`](crate::StyleLayerFactory).

use std::sync::Arc;

use carto_property::{CompositeKind, Properties, PropertiesBuilder, Property};
use carto_spec::{
    ArrayItem, ExpressionParameters, PropertySpecification, PropertySpecificationBuilder,
    PropertyType,
};
use serde_json::{Value as Json, json};

use crate::layer::LayerType;

const ANCHOR: PropertyType = PropertyType::Enum(&["map", "viewport"]);
const TRANSLATE: PropertyType = PropertyType::Array {
    item: ArrayItem::Number,
    length: Some(2),
};

/// A property with a default whose changes animate.
fn animated(name: &'static str, ty: PropertyType, default: Json) -> PropertySpecificationBuilder {
    PropertySpecification::builder(name, ty)
        .default(default)
        .transition(true)
}

/// A property with a default whose changes apply at once.
fn plain(name: &'static str, ty: PropertyType, default: Json) -> PropertySpecificationBuilder {
    PropertySpecification::builder(name, ty).default(default)
}

fn translate(builder: &mut PropertiesBuilder, translate: &'static str, anchor: &'static str) {
    builder.register(Property::ConstantOnly(
        animated(translate, TRANSLATE, json!([0, 0])).build(),
    ));
    builder.register(Property::ConstantOnly(
        plain(anchor, ANCHOR, json!("map")).build(),
    ));
}

/// The light.
#[must_use]
pub fn light() -> Arc<Properties> {
    let mut builder = Properties::builder();
    builder.register(Property::ConstantOnly(
        plain("anchor", ANCHOR, json!("viewport")).build(),
    ));
    builder.register(Property::Composite(
        CompositeKind::LightPosition,
        animated(
            "position",
            PropertyType::Array {
                item: ArrayItem::Number,
                length: Some(3),
            },
            json!([1.15, 210, 30]),
        )
        .build(),
    ));
    builder.register(Property::ConstantOnly(
        animated("color", PropertyType::Color, json!("#ffffff")).build(),
    ));
    builder.register(Property::ConstantOnly(
        animated("intensity", PropertyType::Number, json!(0.5)).build(),
    ));
    builder.build()
}

/// The sky.
#[must_use]
pub fn sky() -> Arc<Properties> {
    let mut builder = Properties::builder();
    for (name, default) in [
        ("sky-color", "#88C6FC"),
        ("horizon-color", "#ffffff"),
        ("fog-color", "#ffffff"),
    ] {
        builder.register(Property::ConstantOnly(
            animated(name, PropertyType::Color, json!(default)).build(),
        ));
    }
    for (name, default) in [
        ("fog-ground-blend", 0.5),
        ("horizon-fog-blend", 0.8),
        ("sky-horizon-blend", 0.8),
        ("atmosphere-blend", 0.8),
    ] {
        builder.register(Property::ConstantOnly(
            animated(name, PropertyType::Number, json!(default)).build(),
        ));
    }
    builder.build()
}

/// Paint properties of `ty`.
#[must_use]
pub fn paint_properties(ty: LayerType) -> Arc<Properties> {
    let mut builder = Properties::builder();
    match ty {
        LayerType::Background => {
            builder.register(Property::ConstantOnly(
                animated("background-color", PropertyType::Color, json!("#000000")).build(),
            ));
            builder.register(Property::CrossFaded(
                PropertySpecification::builder("background-pattern", PropertyType::ResolvedImage)
                    .transition(true)
                    .build(),
            ));
            builder.register(Property::ConstantOnly(
                animated("background-opacity", PropertyType::Number, json!(1)).build(),
            ));
        }
        LayerType::Circle => {
            for (name, default) in [("circle-radius", 5), ("circle-blur", 0), ("circle-opacity", 1)] {
                builder.register(Property::DataDriven(
                    animated(name, PropertyType::Number, json!(default))
                        .data_driven()
                        .build(),
                ));
            }
            builder.register(Property::DataDriven(
                animated("circle-color", PropertyType::Color, json!("#000000"))
                    .data_driven()
                    .build(),
            ));
            translate(&mut builder, "circle-translate", "circle-translate-anchor");
            builder.register(Property::ConstantOnly(
                plain("circle-pitch-scale", ANCHOR, json!("map")).build(),
            ));
            builder.register(Property::ConstantOnly(
                plain("circle-pitch-alignment", ANCHOR, json!("viewport")).build(),
            ));
            for (name, default) in [("circle-stroke-width", 0), ("circle-stroke-opacity", 1)] {
                builder.register(Property::DataDriven(
                    animated(name, PropertyType::Number, json!(default))
                        .data_driven()
                        .build(),
                ));
            }
            builder.register(Property::DataDriven(
                animated("circle-stroke-color", PropertyType::Color, json!("#000000"))
                    .data_driven()
                    .build(),
            ));
        }
        LayerType::Fill => {
            builder.register(Property::ConstantOnly(
                plain("fill-antialias", PropertyType::Boolean, json!(true)).build(),
            ));
            builder.register(Property::DataDriven(
                animated("fill-opacity", PropertyType::Number, json!(1))
                    .data_driven()
                    .build(),
            ));
            builder.register(Property::DataDriven(
                animated("fill-color", PropertyType::Color, json!("#000000"))
                    .data_driven()
                    .build(),
            ));
            builder.register(Property::DataDriven(
                PropertySpecification::builder("fill-outline-color", PropertyType::Color)
                    .transition(true)
                    .data_driven()
                    .build(),
            ));
            translate(&mut builder, "fill-translate", "fill-translate-anchor");
            builder.register(Property::CrossFadedDataDriven(
                PropertySpecification::builder("fill-pattern", PropertyType::ResolvedImage)
                    .transition(true)
                    .data_driven()
                    .build(),
            ));
        }
        LayerType::Line => {
            builder.register(Property::DataDriven(
                animated("line-opacity", PropertyType::Number, json!(1))
                    .data_driven()
                    .build(),
            ));
            builder.register(Property::DataDriven(
                animated("line-color", PropertyType::Color, json!("#000000"))
                    .data_driven()
                    .build(),
            ));
            translate(&mut builder, "line-translate", "line-translate-anchor");
            for (name, default) in [
                ("line-width", 1),
                ("line-gap-width", 0),
                ("line-offset", 0),
                ("line-blur", 0),
            ] {
                builder.register(Property::DataDriven(
                    animated(name, PropertyType::Number, json!(default))
                        .data_driven()
                        .build(),
                ));
            }
            // Filled in from `line-width` on every recalculation.
            builder.register(Property::Composite(
                CompositeKind::LineFloorwidth,
                plain("line-floorwidth", PropertyType::Number, json!(1))
                    .data_driven()
                    .build(),
            ));
            builder.register(Property::CrossFaded(
                PropertySpecification::builder(
                    "line-dasharray",
                    PropertyType::Array {
                        item: ArrayItem::Number,
                        length: None,
                    },
                )
                .transition(true)
                .build(),
            ));
            builder.register(Property::CrossFadedDataDriven(
                PropertySpecification::builder("line-pattern", PropertyType::ResolvedImage)
                    .transition(true)
                    .data_driven()
                    .build(),
            ));
            builder.register(Property::ColorRamp(
                PropertySpecification::builder("line-gradient", PropertyType::Color)
                    .parameters(ExpressionParameters::LINE_PROGRESS)
                    .build(),
            ));
        }
        LayerType::Heatmap => {
            builder.register(Property::DataDriven(
                animated("heatmap-radius", PropertyType::Number, json!(30))
                    .data_driven()
                    .build(),
            ));
            builder.register(Property::DataDriven(
                plain("heatmap-weight", PropertyType::Number, json!(1))
                    .data_driven()
                    .build(),
            ));
            builder.register(Property::ConstantOnly(
                animated("heatmap-intensity", PropertyType::Number, json!(1)).build(),
            ));
            builder.register(Property::ColorRamp(
                plain(
                    "heatmap-color",
                    PropertyType::Color,
                    json!([
                        "interpolate",
                        ["linear"],
                        ["heatmap-density"],
                        0,
                        "rgba(0, 0, 255, 0)",
                        0.1,
                        "royalblue",
                        0.3,
                        "cyan",
                        0.5,
                        "lime",
                        0.7,
                        "yellow",
                        1,
                        "red"
                    ]),
                )
                .parameters(ExpressionParameters::HEATMAP_DENSITY)
                .build(),
            ));
            builder.register(Property::ConstantOnly(
                animated("heatmap-opacity", PropertyType::Number, json!(1)).build(),
            ));
        }
        LayerType::Symbol => {
            builder.register(Property::DataDriven(
                animated("text-color", PropertyType::Color, json!("#000000"))
                    .overridable()
                    .data_driven()
                    .build(),
            ));
            builder.register(Property::DataDriven(
                animated("text-halo-color", PropertyType::Color, json!("rgba(0, 0, 0, 0)"))
                    .data_driven()
                    .build(),
            ));
            for (name, default) in [
                ("text-opacity", 1),
                ("text-halo-width", 0),
                ("icon-opacity", 1),
            ] {
                builder.register(Property::DataDriven(
                    animated(name, PropertyType::Number, json!(default))
                        .data_driven()
                        .build(),
                ));
            }
            builder.register(Property::DataDriven(
                animated("icon-color", PropertyType::Color, json!("#000000"))
                    .data_driven()
                    .build(),
            ));
        }
    }
    builder.build()
}

/// Layout properties of `ty`. Visibility is handled by the layer itself.
#[must_use]
pub fn layout_properties(ty: LayerType) -> Arc<Properties> {
    let mut builder = Properties::builder();
    let sort_key = |name| {
        Property::DataDriven(
            PropertySpecification::builder(name, PropertyType::Number)
                .data_driven()
                .build(),
        )
    };
    match ty {
        LayerType::Background | LayerType::Heatmap => {}
        LayerType::Circle => {
            builder.register(sort_key("circle-sort-key"));
        }
        LayerType::Fill => {
            builder.register(sort_key("fill-sort-key"));
        }
        LayerType::Line => {
            builder.register(Property::ConstantOnly(
                plain(
                    "line-cap",
                    PropertyType::Enum(&["butt", "round", "square"]),
                    json!("butt"),
                )
                .build(),
            ));
            builder.register(Property::DataDriven(
                plain(
                    "line-join",
                    PropertyType::Enum(&["bevel", "round", "miter"]),
                    json!("miter"),
                )
                .data_driven()
                .build(),
            ));
            builder.register(Property::ConstantOnly(
                plain("line-miter-limit", PropertyType::Number, json!(2)).build(),
            ));
            builder.register(Property::ConstantOnly(
                plain("line-round-limit", PropertyType::Number, json!(1.05)).build(),
            ));
            builder.register(sort_key("line-sort-key"));
        }
        LayerType::Symbol => {
            builder.register(Property::ConstantOnly(
                plain(
                    "symbol-placement",
                    PropertyType::Enum(&["point", "line", "line-center"]),
                    json!("point"),
                )
                .build(),
            ));
            builder.register(sort_key("symbol-sort-key"));
            builder.register(Property::DataDriven(
                plain("text-field", PropertyType::Formatted, json!(""))
                    .data_driven()
                    .build(),
            ));
            builder.register(Property::DataDriven(
                plain(
                    "text-font",
                    PropertyType::Array {
                        item: ArrayItem::String,
                        length: None,
                    },
                    json!(["Open Sans Regular", "Arial Unicode MS Regular"]),
                )
                .data_driven()
                .build(),
            ));
            builder.register(Property::DataDriven(
                plain("text-size", PropertyType::Number, json!(16))
                    .data_driven()
                    .build(),
            ));
            builder.register(Property::ConstantOnly(
                plain(
                    "text-rotation-alignment",
                    PropertyType::Enum(&["map", "viewport", "viewport-glyph", "auto"]),
                    json!("auto"),
                )
                .build(),
            ));
            builder.register(Property::ConstantOnly(
                plain(
                    "text-pitch-alignment",
                    PropertyType::Enum(&["map", "viewport", "auto"]),
                    json!("auto"),
                )
                .build(),
            ));
            builder.register(Property::DataDriven(
                PropertySpecification::builder("icon-image", PropertyType::ResolvedImage)
                    .data_driven()
                    .build(),
            ));
            builder.register(Property::DataDriven(
                plain("icon-size", PropertyType::Number, json!(1))
                    .data_driven()
                    .build(),
            ));
            for name in ["icon-rotation-alignment", "icon-pitch-alignment"] {
                builder.register(Property::ConstantOnly(
                    plain(name, PropertyType::Enum(&["map", "viewport", "auto"]), json!("auto"))
                        .build(),
                ));
            }
        }
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use carto_property::Evaluated;
    use carto_spec::Value;

    #[test]
    fn light_defaults() {
        let light = light();
        let position = light
            .get("position")
            .and_then(|p| p.specification().default_json().cloned());
        assert_eq!(position, Some(json!([1.15, 210, 30])));
        let anchor = light.id("anchor").map(|id| light.default_possibly_evaluated(id));
        assert_eq!(
            anchor.and_then(Evaluated::constant_value),
            Some(&Value::from("viewport"))
        );
    }

    #[test]
    fn every_layer_type_builds() {
        for ty in LayerType::ALL {
            assert!(!paint_properties(ty).is_empty(), "{ty:?} has no paint properties");
            let _ = layout_properties(ty);
        }
    }

    #[test]
    fn heatmap_color_ramp_is_present_by_default() {
        let paint = paint_properties(LayerType::Heatmap);
        let id = paint.id("heatmap-color");
        assert_eq!(
            id.map(|id| paint.default_possibly_evaluated(id).as_color_ramp()),
            Some(Some(true))
        );
        let line = paint_properties(LayerType::Line);
        let id = line.id("line-gradient");
        assert_eq!(
            id.map(|id| line.default_possibly_evaluated(id).as_color_ramp()),
            Some(Some(false))
        );
    }

    #[test]
    fn only_text_color_is_overridable() {
        let paint = paint_properties(LayerType::Symbol);
        let names: Vec<_> = paint
            .overridable()
            .iter()
            .map(|&id| paint.property(id).name())
            .collect();
        assert_eq!(names, ["text-color"]);
    }
}
