// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry Collection
//!
//! Ordered mapping from identifiers to geometries, tagged with one CRS.
//! Entries live in an arena of `(id, geometry)` pairs; arena positions are
//! what spatial indexes store.

use areal_core::{Crs, Error, Id, Result, Series};
use rustc_hash::FxHashMap;

use crate::geometry::Geometry;

/// Ordered `id -> Geometry` mapping with a CRS tag.
#[derive(Debug, Clone)]
pub struct GeometryCollection<K> {
    crs: Crs,
    entries: Vec<(K, Geometry)>,
    positions: FxHashMap<K, usize>,
}

impl<K: Id> GeometryCollection<K> {
    /// Creates an empty collection.
    pub fn new(crs: Crs) -> Self {
        Self {
            crs,
            entries: Vec::new(),
            positions: FxHashMap::default(),
        }
    }

    /// Builds a collection, failing with [`Error::DuplicateId`] when an id
    /// repeats.
    pub fn try_from_entries(
        crs: Crs,
        entries: impl IntoIterator<Item = (K, Geometry)>,
    ) -> Result<Self> {
        let mut collection = Self::new(crs);
        for (id, geometry) in entries {
            if collection.positions.contains_key(&id) {
                return Err(Error::DuplicateId(format!("{id:?}")));
            }
            collection.push(id, geometry);
        }
        Ok(collection)
    }

    /// Inserts or replaces. A replaced id keeps its position.
    pub fn insert(&mut self, id: K, geometry: Geometry) -> Option<Geometry> {
        match self.positions.get(&id) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, geometry)),
            None => {
                self.push(id, geometry);
                None
            }
        }
    }

    fn push(&mut self, id: K, geometry: Geometry) {
        self.positions.insert(id.clone(), self.entries.len());
        self.entries.push((id, geometry));
    }

    #[inline]
    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Entries in arena order.
    #[inline]
    pub fn entries(&self) -> &[(K, Geometry)] {
        &self.entries
    }

    pub fn get(&self, id: &K) -> Option<&Geometry> {
        self.positions.get(id).map(|&pos| &self.entries[pos].1)
    }

    /// Arena position of `id`.
    pub fn position(&self, id: &K) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &K) -> bool {
        self.positions.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|(id, _)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Geometry)> + '_ {
        self.entries.iter().map(|(id, g)| (id, g))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose id satisfies `keep`, in the same order and CRS.
    pub fn subset(&self, mut keep: impl FnMut(&K) -> bool) -> Self {
        let mut subset = Self::new(self.crs.clone());
        for (id, geometry) in &self.entries {
            if keep(id) {
                subset.push(id.clone(), geometry.clone());
            }
        }
        subset
    }

    /// Area of every geometry, keyed by id.
    pub fn areas(&self) -> Series<K> {
        self.iter().map(|(id, g)| (id.clone(), g.area())).collect()
    }
}

impl<K: Id> IntoIterator for GeometryCollection<K> {
    type Item = (K, Geometry);
    type IntoIter = std::vec::IntoIter<(K, Geometry)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
