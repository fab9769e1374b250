// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Externally owned key-value state read by `global-state` expressions.

use std::sync::Arc;

use hashbrown::HashMap;

use crate::value::Value;

/// A shared mapping of global state values.
///
/// Cloning is cheap: clones share storage until one of them is mutated, at
/// which point the mutated handle gets its own copy. Evaluation contexts hold
/// a clone, so a frame keeps seeing the values it started with while the
/// owner updates the mapping for the next frame.
///
/// ```rust
/// use carto_spec::{GlobalState, Value};
///
/// let mut state = GlobalState::new();
/// state.set("size", 17.0);
/// let snapshot = state.clone();
///
/// state.set("size", 20.0);
/// assert_eq!(snapshot.get("size"), Some(&Value::Number(17.0)));
/// assert_eq!(state.get("size"), Some(&Value::Number(20.0)));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlobalState {
    values: Arc<HashMap<String, Value>>,
}

impl GlobalState {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Sets a value, returning the previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        Arc::make_mut(&mut self.values).insert(key.into(), value.into())
    }

    /// Removes a value, returning it.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        if !self.values.contains_key(key) {
            return None;
        }
        Arc::make_mut(&mut self.values).remove(key)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for GlobalState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: Arc::new(
                iter.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}
