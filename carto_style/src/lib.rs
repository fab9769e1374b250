// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Carto Style: style layers, light and sky over `carto_property`.
//!
//! This crate owns the objects a map style document describes and drives
//! them through the property chain once per frame:
//!
//! **set → update transitions → recalculate → read**
//!
//! ## Core Concepts
//!
//! ### Layers
//!
//! [`StyleLayer`] keeps authored paint values with their timings, the
//! in-flight transitions, and the reduced values of the last frame. Layers
//! are created by a [`StyleLayerFactory`], which builds the property tables
//! of each [`LayerType`] once and shares them.
//!
//! ```rust
//! use carto_property::{EvaluationParameters, SetterOptions, TransitionParameters};
//! use carto_spec::Value;
//! use carto_style::StyleLayerFactory;
//! use serde_json::json;
//!
//! let factory = StyleLayerFactory::new();
//! let mut layer = factory
//!     .create_from_json(&json!({
//!         "id": "roads",
//!         "type": "line",
//!         "paint": {"line-width": 2, "line-width-transition": {"duration": 1000}}
//!     }))
//!     .unwrap();
//!
//! layer
//!     .set_paint_property("line-width", Some(json!(4)), SetterOptions::default())
//!     .unwrap();
//! layer.update_transitions(&TransitionParameters::new(0.0));
//!
//! layer.recalculate(&EvaluationParameters::new(14.0).with_now(500.0));
//! assert_eq!(layer.paint().constant("line-width"), Some(&Value::Number(3.0)));
//!
//! layer.recalculate(&EvaluationParameters::new(14.0).with_now(1000.0));
//! assert_eq!(layer.paint().constant("line-width"), Some(&Value::Number(4.0)));
//! ```
//!
//! ### Light and Sky
//!
//! [`Light`] and [`Sky`] are single-object versions of the same chain, set
//! from a JSON object where `<name>-transition` keys carry timings.
//!
//! ### Color Ramps
//!
//! [`render_color_ramp`] turns a `heatmap-color` or `line-gradient`
//! expression into a texture for the renderer.

mod color_ramp;
mod error;
mod factory;
mod layer;
mod light;
pub mod reference;
mod setter;
mod sky;

pub use color_ramp::{ColorRamp, RampInput, render_color_ramp};
pub use error::StyleError;
pub use factory::StyleLayerFactory;
pub use layer::{LayerSpecification, LayerType, StyleLayer, Visibility};
pub use light::Light;
pub use sky::Sky;
