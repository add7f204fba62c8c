// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered, keyed series of values.
//!
//! A [`Series`] keeps insertion order (like a labelled column) and a hash
//! lookup from key to position. Weight series, attribute series and
//! assignments are all series.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::id::Id;

/// An ordered mapping from unique keys to values.
#[derive(Debug, Clone)]
pub struct Series<I, V = f64> {
    index: Vec<I>,
    values: Vec<V>,
    positions: FxHashMap<I, usize>,
}

impl<I: Id, V> Series<I, V> {
    /// Creates an empty series.
    pub fn new() -> Self {
        Self {
            index: Vec::new(),
            values: Vec::new(),
            positions: FxHashMap::default(),
        }
    }

    /// Creates an empty series with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            positions: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Builds a series from pairs, failing on a repeated key.
    pub fn try_from_pairs(pairs: impl IntoIterator<Item = (I, V)>) -> Result<Self> {
        let mut series = Self::new();
        for (key, value) in pairs {
            if series.positions.contains_key(&key) {
                return Err(Error::DuplicateId(format!("{key:?}")));
            }
            series.insert(key, value);
        }
        Ok(series)
    }

    /// Inserts or replaces a value. A replaced key keeps its position.
    pub fn insert(&mut self, key: I, value: V) -> Option<V> {
        match self.positions.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.values[pos], value)),
            None => {
                self.positions.insert(key.clone(), self.index.len());
                self.index.push(key);
                self.values.push(value);
                None
            }
        }
    }

    #[inline]
    pub fn get(&self, key: &I) -> Option<&V> {
        self.positions.get(key).map(|&pos| &self.values[pos])
    }

    #[inline]
    pub fn contains_key(&self, key: &I) -> bool {
        self.positions.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> &[I] {
        &self.index
    }

    /// Values in insertion order.
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Iterates `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&I, &V)> + '_ {
        self.index.iter().zip(self.values.iter())
    }

    /// Applies `f` to every value, keeping keys and order.
    pub fn map<U>(&self, mut f: impl FnMut(&I, &V) -> U) -> Series<I, U> {
        Series {
            index: self.index.clone(),
            values: self.iter().map(|(k, v)| f(k, v)).collect(),
            positions: self.positions.clone(),
        }
    }

    /// Keeps the entries for which `keep` returns `true`.
    pub fn filter(&self, mut keep: impl FnMut(&I, &V) -> bool) -> Self
    where
        V: Clone,
    {
        self.iter()
            .filter(|(k, v)| keep(k, v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Returns the series re-sorted by key.
    pub fn sorted_by_key(&self) -> Self
    where
        V: Clone,
    {
        let mut pairs: Vec<_> = self.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs.into_iter().collect()
    }
}

impl<I: Id> Series<I, f64> {
    /// Sum of all non-NaN values.
    pub fn sum(&self) -> f64 {
        self.values.iter().filter(|v| !v.is_nan()).sum()
    }

    /// Groups values by a derived key (sorted), as `groupby(...)` would.
    pub fn group_by<G: Id>(&self, mut group: impl FnMut(&I) -> G) -> BTreeMap<G, Vec<f64>> {
        let mut groups: BTreeMap<G, Vec<f64>> = BTreeMap::new();
        for (key, &value) in self.iter() {
            groups.entry(group(key)).or_default().push(value);
        }
        groups
    }
}

impl<I: Id, V> Default for Series<I, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Id, V: PartialEq> PartialEq for Series<I, V> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.values == other.values
    }
}

/// Collecting keeps the last value for a repeated key, at the key's first
/// position.
impl<I: Id, V> FromIterator<(I, V)> for Series<I, V> {
    fn from_iter<T: IntoIterator<Item = (I, V)>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let mut series = Self::with_capacity(iter.size_hint().0);
        for (key, value) in iter {
            series.insert(key, value);
        }
        series
    }
}

impl<I: Id, V> IntoIterator for Series<I, V> {
    type Item = (I, V);
    type IntoIter = std::iter::Zip<std::vec::IntoIter<I>, std::vec::IntoIter<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.index.into_iter().zip(self.values)
    }
}
