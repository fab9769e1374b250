// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sparse storage for the properties a style author touched.
//!
//! Every store stage keeps only its *own* entries here and falls back to the
//! shared defaults in [`Properties`](crate::Properties) on a miss. Entries are
//! kept in a sorted `SmallVec` and found by binary search: layers rarely set
//! more than a handful of properties, so this stays inline and cache friendly.

use smallvec::SmallVec;

use crate::id::PropertyId;

/// Inline capacity for own entries.
const INLINE_CAPACITY: usize = 8;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct OwnEntries<T> {
    entries: SmallVec<[(PropertyId, T); INLINE_CAPACITY]>,
}

impl<T> Default for OwnEntries<T> {
    fn default() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }
}

impl<T> OwnEntries<T> {
    #[inline]
    fn find(&self, id: PropertyId) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&id, |(pid, _)| *pid)
    }

    pub(crate) fn get(&self, id: PropertyId) -> Option<&T> {
        self.find(id).ok().map(|idx| &self.entries[idx].1)
    }

    pub(crate) fn insert(&mut self, id: PropertyId, value: T) {
        match self.find(id) {
            Ok(idx) => self.entries[idx].1 = value,
            Err(idx) => self.entries.insert(idx, (id, value)),
        }
    }

    /// Returns the entry for `id`, inserting `make()` first if absent.
    pub(crate) fn get_or_insert_with(&mut self, id: PropertyId, make: impl FnOnce() -> T) -> &mut T {
        let idx = match self.find(id) {
            Ok(idx) => idx,
            Err(idx) => {
                self.entries.insert(idx, (id, make()));
                idx
            }
        };
        &mut self.entries[idx].1
    }

    pub(crate) fn remove(&mut self, id: PropertyId) -> Option<T> {
        self.find(id).ok().map(|idx| self.entries.remove(idx).1)
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (PropertyId, &T)> + '_ {
        self.entries.iter().map(|(id, value)| (*id, value))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (PropertyId, &mut T)> + '_ {
        self.entries.iter_mut().map(|(id, value)| (*id, value))
    }
}

impl<T> FromIterator<(PropertyId, T)> for OwnEntries<T> {
    fn from_iter<I: IntoIterator<Item = (PropertyId, T)>>(iter: I) -> Self {
        let mut own = Self::default();
        for (id, value) in iter {
            own.insert(id, value);
        }
        own
    }
}
