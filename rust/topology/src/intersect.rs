// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Intersection engine
//!
//! Computes every non-empty pairwise intersection between two collections
//! (or a collection and itself), pruned by the spatial index and computed
//! exactly by the geometry primitives.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use areal_core::{require_same_crs, Id, Progress, Result, Series, Tracked};
use areal_geometry::{GeometryCollection, Intersection};

use crate::index::SpatialIndex;

/// `(source id, target id) -> Intersection`, iterated in key order.
#[derive(Debug, Clone)]
pub struct IntersectionRelation<S, T> {
    entries: BTreeMap<(S, T), Intersection>,
}

impl<S: Id, T: Id> IntersectionRelation<S, T> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Inserts or replaces the intersection recorded for a pair.
    pub fn insert(&mut self, key: (S, T), intersection: Intersection) -> Option<Intersection> {
        self.entries.insert(key, intersection)
    }

    pub fn get(&self, source: &S, target: &T) -> Option<&Intersection> {
        self.entries.get(&(source.clone(), target.clone()))
    }

    pub fn contains(&self, source: &S, target: &T) -> bool {
        self.get(source, target).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pairs and intersections, sorted by `(source, target)`.
    pub fn iter(&self) -> btree_map::Iter<'_, (S, T), Intersection> {
        self.entries.iter()
    }

    /// Pairs, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &(S, T)> + '_ {
        self.entries.keys()
    }

    /// Keeps the entries for which `keep` returns `true`.
    pub fn filter(&self, mut keep: impl FnMut(&(S, T), &Intersection) -> bool) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(k, v)| keep(k, v))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Applies `f` to every intersection.
    pub fn map(&self, mut f: impl FnMut(&Intersection) -> Intersection) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), f(v)))
                .collect(),
        }
    }

    /// Area of each intersection's polygonal part.
    pub fn areas(&self) -> Series<(S, T)> {
        self.iter().map(|(k, v)| (k.clone(), v.area())).collect()
    }

    /// Perimeter plus shared boundary length of each intersection.
    pub fn lengths(&self) -> Series<(S, T)> {
        self.iter().map(|(k, v)| (k.clone(), v.length())).collect()
    }

    /// Looks up a per-side value for every pair: the left series keyed by
    /// source, the right keyed by target. Missing values are NaN.
    pub fn side_values(
        &self,
        left: &Series<S>,
        right: &Series<T>,
    ) -> (Series<(S, T)>, Series<(S, T)>) {
        let lookup_left = self
            .keys()
            .map(|(s, t)| ((s.clone(), t.clone()), value_or_nan(left.get(s))))
            .collect();
        let lookup_right = self
            .keys()
            .map(|(s, t)| ((s.clone(), t.clone()), value_or_nan(right.get(t))))
            .collect();
        (lookup_left, lookup_right)
    }
}

impl<S: Id, T: Id> Default for IntersectionRelation<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Id, T: Id> FromIterator<((S, T), Intersection)> for IntersectionRelation<S, T> {
    fn from_iter<I: IntoIterator<Item = ((S, T), Intersection)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<S: Id, T: Id> IntoIterator for IntersectionRelation<S, T> {
    type Item = ((S, T), Intersection);
    type IntoIter = btree_map::IntoIter<(S, T), Intersection>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, S: Id, T: Id> IntoIterator for &'a IntersectionRelation<S, T> {
    type Item = (&'a (S, T), &'a Intersection);
    type IntoIter = btree_map::Iter<'a, (S, T), Intersection>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[inline]
fn value_or_nan(value: Option<&f64>) -> f64 {
    value.copied().unwrap_or(f64::NAN)
}

/// Every non-empty intersection between `sources` and `targets`.
///
/// With `area_cutoff`, only intersections whose area is strictly greater
/// than the cutoff are kept. Fails with
/// [`areal_core::Error::CoordinateSystemMismatch`] before doing any work when
/// the CRS tags differ.
pub fn intersections<S: Id, T: Id>(
    sources: &GeometryCollection<S>,
    targets: &GeometryCollection<T>,
    area_cutoff: Option<f64>,
    progress: Progress,
) -> Result<IntersectionRelation<S, T>> {
    require_same_crs(sources.crs(), targets.crs())?;

    let index = SpatialIndex::build(sources, progress);
    let rows = index.enumerate_intersections(targets, progress);
    let found = rows.len();

    let relation: IntersectionRelation<S, T> = match area_cutoff {
        Some(cutoff) => rows
            .into_iter()
            .filter(|(_, intersection)| intersection.area() > cutoff)
            .collect(),
        None => rows.into_iter().collect(),
    };

    tracing::debug!(
        sources = sources.len(),
        targets = targets.len(),
        found,
        kept = relation.len(),
        area_cutoff = ?area_cutoff,
        "computed intersections"
    );
    Ok(relation)
}

/// Lazily enumerates the intersections of a collection with itself.
///
/// Geometries are walked in id order and each unordered pair is yielded
/// once, keyed `(smaller id, larger id)`, whatever the insertion order of the
/// collection. [`AdjacentPairs::restart`] rewinds the walk without rebuilding
/// the index; clones share the index.
#[derive(Clone)]
pub struct AdjacentPairs<K> {
    index: Arc<SpatialIndex<K>>,
    order: Arc<Vec<usize>>,
    progress: Progress,
    walk: Tracked<Range<usize>>,
    pending: std::vec::IntoIter<((K, K), Intersection)>,
}

impl<K: Id> AdjacentPairs<K> {
    pub fn new(index: Arc<SpatialIndex<K>>, progress: Progress) -> Self {
        let mut order: Vec<usize> = (0..index.len()).collect();
        order.sort_by(|&a, &b| index.id(a).cmp(index.id(b)));
        let walk = progress.track(0..order.len(), order.len(), "adjacencies");
        Self {
            index,
            order: Arc::new(order),
            progress,
            walk,
            pending: Vec::new().into_iter(),
        }
    }

    /// Rewinds to the first pair.
    pub fn restart(&mut self) {
        let len = self.order.len();
        self.walk = self.progress.track(0..len, len, "adjacencies");
        self.pending = Vec::new().into_iter();
    }

    /// The index the pairs are drawn from.
    pub fn index(&self) -> &SpatialIndex<K> {
        &self.index
    }

    fn pairs_at(&self, i: usize) -> Vec<((K, K), Intersection)> {
        let index = &self.index;
        let geometry = index.geometry(i);
        let mut pairs: Vec<((K, K), Intersection)> = index
            .query(geometry)
            .into_iter()
            .filter(|&j| index.id(j) > index.id(i))
            .filter_map(|j| {
                let intersection = geometry.intersection(index.geometry(j));
                (!intersection.is_empty())
                    .then(|| ((index.id(i).clone(), index.id(j).clone()), intersection))
            })
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }
}

impl<K: Id> Iterator for AdjacentPairs<K> {
    type Item = ((K, K), Intersection);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(pair) = self.pending.next() {
                return Some(pair);
            }
            let step = self.walk.next()?;
            self.pending = self.pairs_at(self.order[step]).into_iter();
        }
    }
}

impl<K: Id> std::iter::FusedIterator for AdjacentPairs<K> {}

impl<K: Id> fmt::Debug for AdjacentPairs<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdjacentPairs")
            .field("index", &self.index)
            .field("visited", &self.walk.tracker().done())
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// Builds an index over `collection` and returns its self-intersection walk.
pub fn iter_adjacent_pairs<K: Id>(
    collection: &GeometryCollection<K>,
    progress: Progress,
) -> AdjacentPairs<K> {
    AdjacentPairs::new(Arc::new(SpatialIndex::build(collection, progress)), progress)
}
