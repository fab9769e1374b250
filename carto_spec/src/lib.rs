// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Carto Spec: style property metadata, values, and expressions.
//!
//! This crate describes *what* a style property is and how an authored value
//! for it is understood. The evaluation chain that turns authored values into
//! per-frame results lives in `carto_property`.
//!
//! ## Core Concepts
//!
//! - [`PropertySpecification`] - name, type, default, and the inputs a
//!   property's expressions may read
//! - [`Value`] - a dynamically typed style value (numbers, colors, arrays,
//!   formatted text)
//! - [`StylePropertyExpression`] - an authored literal, legacy function, or
//!   expression normalized against a specification
//! - [`GlobalState`] - a shared, copy-on-write map read by
//!   `["global-state", key]`
//!
//! ## Quick Start
//!
//! ```rust
//! use carto_spec::{
//!     FeatureContext, GlobalState, Globals, PropertySpecification, PropertyType,
//!     StylePropertyExpression, Value,
//! };
//! use serde_json::json;
//!
//! let spec = PropertySpecification::builder("light-intensity", PropertyType::Number)
//!     .default(json!(0.5))
//!     .transition(true)
//!     .build();
//!
//! let expr = StylePropertyExpression::normalize(
//!     Some(&json!({"stops": [[16, 0.2], [17, 0.8]]})),
//!     &spec,
//! )
//! .unwrap();
//!
//! let state = GlobalState::new();
//! let value = expr.evaluate(&Globals::new(16.5, &state), &FeatureContext::EMPTY);
//! assert!((value.as_number().unwrap() - 0.5).abs() < 1e-9);
//! ```
//!
//! ## Evaluation Classes
//!
//! | Kind | Reads zoom | Reads feature |
//! |------|------------|---------------|
//! | [`ExpressionKind::Constant`] | no | no |
//! | [`ExpressionKind::Camera`] | yes | no |
//! | [`ExpressionKind::Source`] | no | yes |
//! | [`ExpressionKind::Composite`] | yes | yes |
//!
//! Global state does not change the class: a `["global-state", ...]`
//! expression is constant for the duration of a frame.

mod coerce;
mod error;
mod expression;
mod global_state;
mod specification;
mod style_expression;
mod validate;
mod value;

pub mod color;
pub mod function;
pub mod interpolate;

pub use coerce::{coerce, is_instance};
pub use color::Color;
pub use error::ExpressionError;
pub use expression::{
    Expr, ExpressionKind, FeatureContext, FormatSection, Globals, Interpolation,
};
pub use global_state::GlobalState;
pub use specification::{
    ArrayItem, ExpressionParameters, PropertySpecification, PropertySpecificationBuilder,
    PropertyType,
};
pub use style_expression::StylePropertyExpression;
pub use validate::validate;
pub use value::{Feature, FeatureState, Formatted, FormattedSection, Value};
