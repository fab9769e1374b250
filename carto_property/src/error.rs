// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use carto_spec::ExpressionError;
use thiserror::Error;

/// An error raised by a property store setter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropertyError {
    /// The store has no property with this name.
    #[error("unknown property \"{0}\"")]
    UnknownProperty(String),
    /// The supplied value could not be normalized for the property.
    #[error("{name}: {source}")]
    Expression {
        /// The property being set.
        name: &'static str,
        /// What was wrong with the value.
        #[source]
        source: ExpressionError,
    },
}
