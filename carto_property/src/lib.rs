// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Carto Property: the evaluation chain for map style properties.
//!
//! This crate takes authored paint and layout values, built on the
//! expressions of `carto_spec`, and reduces them once per frame to values
//! a renderer can consume. Layer types, their property tables, and the
//! layer object itself live in `carto_style`.
//!
//! ## Core Concepts
//!
//! ### The Chain
//!
//! Paint properties pass through four stages; layout properties skip the
//! middle two:
//!
//! - [`PropertyValue`] - the authored value, normalized to an expression
//! - [`TransitionablePropertyValue`] - the value plus optional timing
//! - [`TransitioningPropertyValue`] - the value mid-animation, linked to
//!   whatever was visible when it was set
//! - [`Evaluated`] - the frame's reduced value, constant or still
//!   per-feature
//!
//! Each stage has a per-layer store ([`Transitionable`], [`Transitioning`],
//! [`Layout`], [`PossiblyEvaluated`]) that only allocates for properties the
//! author touched. Every other lookup reads the shared defaults in
//! [`Properties`].
//!
//! ### Property Kinds
//!
//! A [`Property`] decides how its values reduce and blend:
//!
//! | Kind | Reduces to | Blends |
//! |------|------------|--------|
//! | `ConstantOnly` | a value | numerically, if the type allows |
//! | `DataDriven` | a value or a deferred feature evaluator | constants only |
//! | `CrossFaded` | a [`CrossFaded`] pair of images | never |
//! | `CrossFadedDataDriven` | a deferred pair | never |
//! | `ColorRamp` | whether a ramp is set | never |
//! | `Composite` | a [`Position`] | componentwise |
//!
//! ## Quick Start
//!
//! ```rust
//! use carto_property::{
//!     EvaluationParameters, Properties, Property, Transitionable, TransitionParameters,
//!     TransitionSpecification,
//! };
//! use carto_spec::{PropertySpecification, PropertyType, Value};
//! use serde_json::json;
//!
//! let mut builder = Properties::builder();
//! builder.register(Property::DataDriven(
//!     PropertySpecification::builder("fill-opacity", PropertyType::Number)
//!         .default(json!(1))
//!         .transition(true)
//!         .data_driven()
//!         .build(),
//! ));
//! let properties = builder.build();
//!
//! let mut paint = Transitionable::new(properties);
//! let idle = paint.untransitioned();
//! paint.set_value("fill-opacity", Some(json!(0))).unwrap();
//!
//! // Animate from the default to the new value over one second.
//! let mut transitioning = paint.transitioned(
//!     &TransitionParameters::new(0.0)
//!         .with_transition(TransitionSpecification::new(1000.0, 0.0)),
//!     idle,
//! );
//!
//! let halfway = transitioning.possibly_evaluate(&EvaluationParameters::new(0.0).with_now(500.0));
//! assert_eq!(halfway.constant("fill-opacity"), Some(&Value::Number(0.5)));
//!
//! let done = transitioning.possibly_evaluate(&EvaluationParameters::new(0.0).with_now(1500.0));
//! assert_eq!(done.constant("fill-opacity"), Some(&Value::Number(0.0)));
//! assert!(!transitioning.has_transition());
//! ```
//!
//! ## Memory
//!
//! | Choice | Effect |
//! |--------|--------|
//! | **Sparse stores** | only authored properties take space per layer |
//! | **Shared defaults** | defaults live once per layer type |
//! | **Inline storage** | `SmallVec` for the usual handful of entries |
//! | **Pruned history** | finished transitions drop their prior link |

mod defaults;
mod ease;
mod error;
mod format_override;
mod id;
mod layout;
mod parameters;
mod possibly_evaluated;
mod property;
mod store;
mod transition;
mod value;

pub use defaults::{Properties, PropertiesBuilder};
pub use ease::ease_cubic_in_out;
pub use error::PropertyError;
pub use format_override::FormatSectionOverride;
pub use id::PropertyId;
pub use layout::Layout;
pub use parameters::{
    CrossfadeParameters, EvaluationParameters, SetterOptions, TransitionParameters,
    TransitionSpecification, ZoomHistory,
};
pub use possibly_evaluated::{
    Deferred, Evaluated, PossiblyEvaluated, PossiblyEvaluatedPropertyValue,
    PossiblyEvaluatedValue,
};
pub use property::{CompositeKind, CrossFaded, Position, Property};
pub use transition::{
    Transitionable, TransitionablePropertyValue, Transitioning, TransitioningPropertyValue,
};
pub use value::PropertyValue;
