// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Name-based access to paint stores, where `<name>-transition` addresses
//! the timing of `<name>`.

use carto_property::{SetterOptions, Transitionable, TransitionSpecification};
use serde_json::{Map, Value as Json};

use crate::error::StyleError;

pub(crate) const TRANSITION_SUFFIX: &str = "-transition";

/// Sets a value or a timing. JSON `null` resets.
pub(crate) fn set(
    paint: &mut Transitionable,
    name: &str,
    value: Option<Json>,
    options: SetterOptions,
) -> Result<(), StyleError> {
    let value = value.filter(|json| !json.is_null());
    match name.strip_suffix(TRANSITION_SUFFIX) {
        Some(base) => {
            let transition = value
                .map(serde_json::from_value::<TransitionSpecification>)
                .transpose()?;
            paint.set_transition(base, transition)?;
        }
        None => paint.set_value_with_options(name, value, options)?,
    }
    Ok(())
}

/// Reads a value or a timing.
pub(crate) fn get(paint: &Transitionable, name: &str) -> Result<Option<Json>, StyleError> {
    match name.strip_suffix(TRANSITION_SUFFIX) {
        Some(base) => Ok(paint
            .get_transition(base)?
            .map(serde_json::to_value)
            .transpose()?),
        None => Ok(paint.get_value(name)?),
    }
}

/// Applies every entry of `object`, or none of them.
pub(crate) fn set_all(
    paint: &mut Transitionable,
    object: &Map<String, Json>,
    options: SetterOptions,
) -> Result<(), StyleError> {
    let mut next = paint.clone();
    for (name, value) in object {
        set(&mut next, name, Some(value.clone()), options)?;
    }
    *paint = next;
    Ok(())
}
