// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology repair engine
//!
//! Small gaps between neighbouring polygons and small overlaps where they
//! cross are folded back into the neighbour that shares the most boundary
//! with the defect. Defects at or above the relative size threshold are left
//! alone.

use std::collections::BTreeMap;

use areal_core::{require_same_crs, Error, Id, Progress, Result};
use areal_geometry::{unary_union, Geometry, GeometryCollection, Intersection};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::adjacency::{adjacencies, AdjacencyKind, AdjacencyOptions};
use crate::assign::assign_to_max;
use crate::intersect::intersections;

/// The holes of the union of `collection`, each as a standalone polygon,
/// numbered from 0.
pub fn holes_of_union<K: Id>(collection: &GeometryCollection<K>) -> GeometryCollection<usize> {
    let union = unary_union(collection.iter().map(|(_, g)| g));
    let mut holes = GeometryCollection::new(collection.crs().clone());
    for (id, hole) in union.holes().into_iter().enumerate() {
        holes.insert(id, hole);
    }
    holes
}

/// Closes gaps between geometries by absorbing each hole of their union into
/// the geometry sharing the most perimeter with it.
///
/// With `relative_threshold`, a gap is only closed when its area is below
/// that fraction of the absorbing geometry's area. `None` closes every gap.
pub fn close_gaps<K: Id>(
    collection: &GeometryCollection<K>,
    relative_threshold: Option<f64>,
    progress: Progress,
) -> Result<GeometryCollection<K>> {
    let gaps = holes_of_union(collection);
    tracing::debug!(gaps = gaps.len(), ?relative_threshold, "closing gaps");
    absorb_by_shared_perimeter(&gaps, collection, relative_threshold, progress)
}

/// Removes overlaps between geometries: each overlap is cut out of both
/// owners and given back to the one sharing the most perimeter with it.
///
/// With `relative_threshold`, only overlaps whose area is below that fraction
/// of both owners' areas are resolved. When nothing qualifies the input is
/// returned unchanged.
pub fn resolve_overlaps<K: Id>(
    collection: &GeometryCollection<K>,
    relative_threshold: Option<f64>,
    progress: Progress,
) -> Result<GeometryCollection<K>> {
    let adjacent = adjacencies(
        collection,
        AdjacencyKind::Queen,
        AdjacencyOptions::silent(),
        progress,
    );

    let mut overlaps: Vec<((K, K), Geometry)> = adjacent
        .relation
        .iter()
        .filter(|(_, intersection)| intersection.area() > 0.0)
        .map(|(pair, intersection)| (pair.clone(), intersection.polygonal()))
        .filter(|(_, overlap)| !overlap.is_empty())
        .collect();

    if let Some(threshold) = relative_threshold {
        let areas = collection.areas();
        let ratio = |overlap: &Geometry, id: &K| {
            overlap.area() / areas.get(id).copied().unwrap_or(f64::NAN)
        };
        overlaps.retain(|((a, b), overlap)| {
            ratio(overlap, a) < threshold && ratio(overlap, b) < threshold
        });
    }

    if overlaps.is_empty() {
        tracing::debug!("no overlaps to resolve");
        return Ok(collection.clone());
    }

    let mut owned: FxHashMap<&K, Vec<&Geometry>> = FxHashMap::default();
    for ((a, b), overlap) in &overlaps {
        owned.entry(a).or_default().push(overlap);
        owned.entry(b).or_default().push(overlap);
    }

    let reduced: Vec<(K, Geometry)> = collection
        .entries()
        .par_iter()
        .map(|(id, geometry)| match owned.get(id) {
            Some(pieces) => {
                let cut = unary_union(pieces.iter().copied());
                (id.clone(), geometry.difference(&cut))
            }
            None => (id.clone(), geometry.clone()),
        })
        .collect();
    let reduced = GeometryCollection::try_from_entries(collection.crs().clone(), reduced)?;

    tracing::debug!(overlaps = overlaps.len(), "resolving overlaps");
    let pieces = GeometryCollection::try_from_entries(collection.crs().clone(), overlaps)?;
    absorb_by_shared_perimeter(&pieces, &reduced, None, progress)
}

/// Absorbs every source into the target with which it shares the longest
/// boundary (ties go to the lowest target id).
///
/// With `relative_threshold`, a source is only absorbed when its area is
/// below that fraction of the chosen target's area. The result holds
/// exactly the target ids, in target order; targets that absorb nothing are
/// passed through unchanged.
pub fn absorb_by_shared_perimeter<S: Id, T: Id>(
    sources: &GeometryCollection<S>,
    targets: &GeometryCollection<T>,
    relative_threshold: Option<f64>,
    progress: Progress,
) -> Result<GeometryCollection<T>> {
    if sources.is_empty() {
        return Ok(targets.clone());
    }
    if targets.is_empty() {
        return Err(Error::NoAbsorptionTarget);
    }
    require_same_crs(sources.crs(), targets.crs())?;

    let relation = intersections(sources, targets, None, progress)?.map(Intersection::repaired);
    let mut assignment = assign_to_max(&relation.lengths());

    if let Some(threshold) = relative_threshold {
        let before = assignment.len();
        assignment = assignment.filter(|source, target| {
            match (sources.get(source), targets.get(target)) {
                (Some(s), Some(t)) => s.area() / t.area() < threshold,
                _ => false,
            }
        });
        let skipped = before - assignment.len();
        if skipped > 0 {
            tracing::warn!(
                skipped,
                threshold,
                "left pieces at or above the relative size threshold in place"
            );
        }
    }

    let mut absorbed: BTreeMap<&T, Vec<&Geometry>> = BTreeMap::new();
    for (source, target) in assignment.iter() {
        if let Some(geometry) = sources.get(source) {
            absorbed.entry(target).or_default().push(geometry);
        }
    }

    let tracker = progress.tracker("absorb", targets.len());
    let merged: Vec<(T, Geometry)> = targets
        .entries()
        .par_iter()
        .map(|(id, target)| {
            tracker.tick();
            let geometry = match absorbed.get(id) {
                Some(pieces) => {
                    let union = unary_union(std::iter::once(target).chain(pieces.iter().copied()));
                    if union.is_empty() {
                        target.clone()
                    } else {
                        union
                    }
                }
                None => target.clone(),
            };
            (id.clone(), geometry)
        })
        .collect();

    tracing::debug!(
        sources = sources.len(),
        absorbed = assignment.len(),
        targets = absorbed.len(),
        "absorbed by shared perimeter"
    );

    GeometryCollection::try_from_entries(targets.crs().clone(), merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use areal_core::{Crs, DEFAULT_RELATIVE_THRESHOLD};

    fn with_notch(x0: f64, y0: f64, y1: f64) -> Geometry {
        Geometry::from_exterior([
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, y0),
            (x0, y0),
            (x0, y1),
            (10.0, y1),
            (10.0, 10.0),
            (0.0, 10.0),
        ])
    }

    fn pair(left: Geometry) -> GeometryCollection<&'static str> {
        GeometryCollection::try_from_entries(
            Crs::unspecified(),
            [("a", left), ("b", Geometry::rect(10.0, 0.0, 20.0, 10.0))],
        )
        .unwrap()
    }

    #[test]
    fn test_holes_of_union() {
        let holes = holes_of_union(&pair(with_notch(9.0, 4.0, 5.0)));
        assert_eq!(holes.len(), 1);
        assert_relative_eq!(holes.get(&0).unwrap().area(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_small_gap_goes_to_longest_shared_boundary() {
        let collection = pair(with_notch(9.0, 4.0, 5.0));
        let threshold = Some(DEFAULT_RELATIVE_THRESHOLD);
        let closed = close_gaps(&collection, threshold, Progress::disabled()).unwrap();
        assert_eq!(closed.ids().copied().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_relative_eq!(closed.get(&"a").unwrap().area(), 100.0, epsilon = 1e-9);
        assert_relative_eq!(closed.get(&"b").unwrap().area(), 100.0, epsilon = 1e-9);
        assert!(holes_of_union(&closed).is_empty());
    }

    #[test]
    fn test_large_gap_is_left_alone() {
        let collection = pair(with_notch(5.0, 2.0, 8.0));
        let threshold = Some(DEFAULT_RELATIVE_THRESHOLD);
        let closed = close_gaps(&collection, threshold, Progress::disabled()).unwrap();
        assert_relative_eq!(closed.get(&"a").unwrap().area(), 70.0, epsilon = 1e-9);
        assert_eq!(holes_of_union(&closed).len(), 1);

        let forced = close_gaps(&collection, None, Progress::disabled()).unwrap();
        assert_relative_eq!(forced.get(&"a").unwrap().area(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_overlap_returns_to_longest_shared_boundary() {
        let collection = GeometryCollection::try_from_entries(
            Crs::unspecified(),
            [
                ("a", Geometry::rect(0.0, 0.0, 10.0, 10.0)),
                ("b", Geometry::rect(9.5, 2.0, 20.0, 8.0)),
            ],
        )
        .unwrap();
        let resolved = resolve_overlaps(&collection, Some(0.1), Progress::disabled()).unwrap();
        let a = resolved.get(&"a").unwrap();
        let b = resolved.get(&"b").unwrap();
        assert_relative_eq!(a.area(), 100.0, epsilon = 1e-9);
        assert_relative_eq!(b.area(), 60.0, epsilon = 1e-9);
        assert_eq!(a.intersection(b).area(), 0.0);
    }

    #[test]
    fn test_large_overlap_is_left_alone() {
        let collection = GeometryCollection::try_from_entries(
            Crs::unspecified(),
            [
                ("a", Geometry::rect(0.0, 0.0, 10.0, 10.0)),
                ("b", Geometry::rect(5.0, 0.0, 15.0, 10.0)),
            ],
        )
        .unwrap();
        let resolved = resolve_overlaps(&collection, Some(0.1), Progress::disabled()).unwrap();
        assert_relative_eq!(resolved.get(&"a").unwrap().area(), 100.0, epsilon = 1e-9);
        assert_relative_eq!(resolved.get(&"b").unwrap().area(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_absorb_edge_cases() {
        let targets = pair(Geometry::rect(0.0, 0.0, 10.0, 10.0));
        let none: GeometryCollection<u32> = GeometryCollection::new(Crs::unspecified());
        let unchanged = absorb_by_shared_perimeter(&none, &targets, None, Progress::disabled());
        assert_eq!(unchanged.unwrap().len(), 2);

        let sources = GeometryCollection::try_from_entries(
            Crs::unspecified(),
            [(0u32, Geometry::rect(0.0, 10.0, 1.0, 11.0))],
        )
        .unwrap();
        let empty: GeometryCollection<&str> = GeometryCollection::new(Crs::unspecified());
        let err = absorb_by_shared_perimeter(&sources, &empty, None, Progress::disabled());
        assert!(matches!(err, Err(Error::NoAbsorptionTarget)));
    }
}
