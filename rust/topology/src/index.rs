// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounding-box spatial index over a geometry collection.
//!
//! The index owns a snapshot of the collection's arena and an R-tree of
//! entry bounding boxes, bulk-loaded once. Queries return arena positions;
//! exact predicates (intersection, covers) run only on the R-tree
//! candidates.

use std::fmt;

use areal_core::{Crs, Id, Progress};
use areal_geometry::{boundary, Geometry, GeometryCollection, Intersection, Rect};
use rayon::prelude::*;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{Envelope, RTree, RTreeObject, SelectionFunction, AABB};

/// Bounding box of one arena entry, tagged with its position.
type IndexedBox = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Immutable R-tree index over a snapshot of a collection.
#[derive(Clone)]
pub struct SpatialIndex<K> {
    crs: Crs,
    entries: Vec<(K, Geometry)>,
    extent: Option<Rect<f64>>,
    tree: RTree<IndexedBox>,
}

impl<K: Id> SpatialIndex<K> {
    /// Bulk-loads an index over every non-empty geometry of `collection`.
    pub fn build(collection: &GeometryCollection<K>, progress: Progress) -> Self {
        let tracker = progress.tracker("index", collection.len());
        let boxes: Vec<IndexedBox> = collection
            .entries()
            .par_iter()
            .enumerate()
            .filter_map(|(position, (_, geometry))| {
                tracker.tick();
                let bounds = geometry.bounds()?;
                Some(GeomWithData::new(
                    Rectangle::from_corners(
                        [bounds.min().x, bounds.min().y],
                        [bounds.max().x, bounds.max().y],
                    ),
                    position,
                ))
            })
            .collect();

        let extent = boxes
            .iter()
            .map(|b| b.envelope())
            .reduce(|a, b| a.merged(&b))
            .map(|aabb| Rect::new(aabb.lower(), aabb.upper()));

        tracing::debug!(
            entries = collection.len(),
            indexed = boxes.len(),
            "built spatial index"
        );

        Self {
            crs: collection.crs().clone(),
            entries: collection.entries().to_vec(),
            extent,
            tree: RTree::bulk_load(boxes),
        }
    }

    #[inline]
    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Id stored at an arena position.
    #[inline]
    pub fn id(&self, position: usize) -> &K {
        &self.entries[position].0
    }

    /// Geometry stored at an arena position.
    #[inline]
    pub fn geometry(&self, position: usize) -> &Geometry {
        &self.entries[position].1
    }

    /// Arena snapshot in insertion order.
    pub fn entries(&self) -> &[(K, Geometry)] {
        &self.entries
    }

    /// Positions of every entry whose bounding box meets the bounding box
    /// of `geometry`, ascending. A superset of the true intersections.
    pub fn query(&self, geometry: &Geometry) -> Vec<usize> {
        let (Some(bounds), Some(extent)) = (geometry.bounds(), self.extent) else {
            return Vec::new();
        };
        // Widen by the contact tolerance so nearly coincident edges match.
        let pad = boundary::tolerance(bounds, extent);
        let envelope = AABB::from_corners(
            [bounds.min().x - pad, bounds.min().y - pad],
            [bounds.max().x + pad, bounds.max().y + pad],
        );
        let mut positions: Vec<usize> = self
            .tree
            .locate_with_selection_function(Intersecting(envelope))
            .map(|entry| entry.data)
            .collect();
        positions.sort_unstable();
        positions
    }

    /// Same as [`SpatialIndex::query`], mapped to ids.
    pub fn query_ids(&self, geometry: &Geometry) -> Vec<K> {
        self.query(geometry)
            .into_iter()
            .map(|position| self.id(position).clone())
            .collect()
    }

    /// Positions of the entries `container` covers, ascending.
    pub fn covered_positions(&self, container: &Geometry) -> Vec<usize> {
        let candidates = self.query(container);
        if candidates.is_empty() {
            return candidates;
        }
        let covers = container.prepare();
        candidates
            .into_iter()
            .filter(|&position| covers(self.geometry(position)))
            .collect()
    }

    /// Ids of the entries `container` covers, in arena order.
    pub fn covered_by(&self, container: &Geometry) -> Vec<K> {
        self.covered_positions(container)
            .into_iter()
            .map(|position| self.id(position).clone())
            .collect()
    }

    /// Non-empty exact intersections of `geometry` with the indexed entries.
    pub fn intersections(&self, geometry: &Geometry) -> Vec<(usize, Intersection)> {
        self.query(geometry)
            .into_iter()
            .filter_map(|position| {
                let intersection = self.geometry(position).intersection(geometry);
                (!intersection.is_empty()).then_some((position, intersection))
            })
            .collect()
    }

    /// Intersects every target with the index, one rayon task per target.
    ///
    /// Rows come back sorted by `(indexed id, target id)`, independent of
    /// scheduling.
    pub fn enumerate_intersections<T: Id>(
        &self,
        targets: &GeometryCollection<T>,
        progress: Progress,
    ) -> Vec<((K, T), Intersection)> {
        let tracker = progress.tracker("intersections", targets.len());
        let mut rows: Vec<((K, T), Intersection)> = targets
            .entries()
            .par_iter()
            .flat_map_iter(|(target_id, target)| {
                let hits = self.intersections(target);
                tracker.tick();
                hits.into_iter().map(move |(position, intersection)| {
                    ((self.id(position).clone(), target_id.clone()), intersection)
                })
            })
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }
}

impl<K: Id> fmt::Debug for SpatialIndex<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("crs", &self.crs)
            .field("entries", &self.entries.len())
            .field("indexed", &self.tree.size())
            .finish()
    }
}

/// Selects R-tree nodes whose envelope meets a query box.
struct Intersecting(AABB<[f64; 2]>);

impl SelectionFunction<IndexedBox> for Intersecting {
    fn should_unpack_parent(&self, envelope: &AABB<[f64; 2]>) -> bool {
        self.0.intersects(envelope)
    }

    fn should_unpack_leaf(&self, leaf: &IndexedBox) -> bool {
        self.0.intersects(&leaf.envelope())
    }
}
