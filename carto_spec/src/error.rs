// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while normalizing or validating style input.

use thiserror::Error;

/// An error produced while parsing, validating, or evaluating style input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// An expression operator received the wrong number of arguments.
    #[error("\"{operator}\" expects {expected} arguments, found {found}")]
    WrongArity {
        /// The operator name.
        operator: &'static str,
        /// A human readable description of the accepted argument count.
        expected: &'static str,
        /// The number of arguments supplied.
        found: usize,
    },
    /// An operand had an unexpected shape.
    #[error("{context}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Where the mismatch was found.
        context: String,
        /// The expected type.
        expected: String,
        /// The supplied JSON or value, rendered for diagnostics.
        found: String,
    },
    /// A legacy function object was malformed.
    #[error("invalid function: {0}")]
    InvalidFunction(String),
    /// Stops were not in strictly ascending order.
    #[error("stop inputs must be in ascending order")]
    UnorderedStops,
    /// A data-driven expression was supplied for a property that does not support one.
    #[error("data expressions not supported for \"{0}\"")]
    DataDrivenNotSupported(String),
    /// A zoom expression was supplied for a property that does not support one.
    #[error("zoom expressions not supported for \"{0}\"")]
    ZoomNotSupported(String),
    /// A runtime evaluation failure.
    #[error("evaluation failed: {0}")]
    Evaluation(String),
}

impl ExpressionError {
    pub(crate) fn mismatch(
        context: impl Into<String>,
        expected: impl Into<String>,
        found: &serde_json::Value,
    ) -> Self {
        Self::TypeMismatch {
            context: context.into(),
            expected: expected.into(),
            found: found.to_string(),
        }
    }
}
