// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use carto_property::PropertyError;
use thiserror::Error;

/// Errors raised while building or editing style objects.
#[derive(Error, Debug)]
pub enum StyleError {
    /// The layer document names a type with no property tables.
    #[error("unknown layer type \"{0}\"")]
    UnknownLayerType(String),
    /// A layer document, visibility, or transition did not deserialize.
    #[error("malformed style document: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A property setter rejected its input.
    #[error(transparent)]
    Property(#[from] PropertyError),
}
