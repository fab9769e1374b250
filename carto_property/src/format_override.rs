// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-span overrides for paint properties of formatted text.

use std::sync::Arc;

use carto_spec::{FeatureContext, Value};

use crate::possibly_evaluated::{
    Deferred, Evaluated, PossiblyEvaluatedPropertyValue, PossiblyEvaluatedValue,
};
use crate::property::Property;

/// Evaluates an overridable paint property with rich-text spans in mind.
///
/// A span with an explicit value for the property wins. Otherwise the
/// wrapped value is evaluated for the feature, and without a feature the
/// property's default applies.
#[derive(Clone, Debug, PartialEq)]
pub struct FormatSectionOverride {
    property: Arc<Property>,
    default: PossiblyEvaluatedPropertyValue<Value>,
}

impl FormatSectionOverride {
    /// Wraps the possibly-evaluated value of `property`.
    ///
    /// # Panics
    ///
    /// Panics if the property's specification is not overridable.
    #[must_use]
    pub fn new(property: Arc<Property>, default: PossiblyEvaluatedPropertyValue<Value>) -> Self {
        assert!(
            property.specification().overridable(),
            "Property '{}' is not overridable",
            property.name()
        );
        Self { property, default }
    }

    /// The overridden property.
    #[must_use]
    pub fn property(&self) -> &Arc<Property> {
        &self.property
    }

    /// Evaluates in `ctx`.
    #[must_use]
    pub fn evaluate(&self, ctx: &FeatureContext<'_>) -> Value {
        if let Some(value) = ctx
            .formatted_section
            .and_then(|section| section.override_for(self.property.name()))
        {
            return value;
        }
        if let (Some(_), Some(_)) = (ctx.feature, ctx.feature_state) {
            return self.default.evaluate_in(&FeatureContext {
                formatted_section: None,
                ..*ctx
            });
        }
        self.property.specification().default_value()
    }

    /// Replaces a data-driven value with a deferred override evaluator that
    /// keeps its frame parameters.
    ///
    /// A wrapped value that also reads the zoom stays composite.
    #[must_use]
    pub fn into_possibly_evaluated(self) -> Evaluated {
        let parameters = self.default.parameters().clone();
        let composite = matches!(self.default.value(), PossiblyEvaluatedValue::Composite(_));
        let deferred = Deferred::SectionOverride(Arc::new(self));
        let value = if composite {
            PossiblyEvaluatedValue::Composite(deferred)
        } else {
            PossiblyEvaluatedValue::Source(deferred)
        };
        Evaluated::DataDriven(PossiblyEvaluatedPropertyValue::new(value, parameters))
    }
}
