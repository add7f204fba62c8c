// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Assignment engine
//!
//! Maps every source geometry to at most one target: first to a target that
//! covers it, otherwise to the target it shares the most area with.

use areal_core::{require_same_crs, Id, Progress, Result, Series};
use areal_geometry::GeometryCollection;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::index::SpatialIndex;
use crate::intersect::intersections;

/// Total mapping from source ids to an optional target id.
#[derive(Debug, Clone)]
pub struct Assignment<S, T> {
    targets: Series<S, Option<T>>,
    ambiguous: Vec<(S, Vec<T>)>,
}

impl<S: Id, T: Id> Assignment<S, T> {
    /// An assignment from an explicit mapping, without ambiguity records.
    pub fn from_series(targets: Series<S, Option<T>>) -> Self {
        Self {
            targets,
            ambiguous: Vec::new(),
        }
    }

    /// Target of `source`. `None` when the source is unknown or unassigned.
    pub fn get(&self, source: &S) -> Option<&T> {
        self.targets.get(source).and_then(Option::as_ref)
    }

    /// `(source, target)` rows in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&S, Option<&T>)> + '_ {
        self.targets.iter().map(|(s, t)| (s, t.as_ref()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Number of sources with a target.
    pub fn assigned_count(&self) -> usize {
        self.targets.values().iter().filter(|t| t.is_some()).count()
    }

    /// Sources without a target, in source order.
    pub fn unassigned(&self) -> Vec<&S> {
        self.iter()
            .filter(|(_, t)| t.is_none())
            .map(|(s, _)| s)
            .collect()
    }

    /// Sources covered by more than one target, with every covering target
    /// in target order. The first one won.
    pub fn ambiguous(&self) -> &[(S, Vec<T>)] {
        &self.ambiguous
    }

    pub fn as_series(&self) -> &Series<S, Option<T>> {
        &self.targets
    }

    pub fn into_series(self) -> Series<S, Option<T>> {
        self.targets
    }
}

impl<S: Id, T: Id> PartialEq for Assignment<S, T> {
    fn eq(&self, other: &Self) -> bool {
        self.targets == other.targets && self.ambiguous == other.ambiguous
    }
}

/// Assigns each source to a target that covers it, falling back to the
/// target with the largest intersection area.
///
/// The result lists every source, in source order.
pub fn assign<S: Id, T: Id>(
    sources: &GeometryCollection<S>,
    targets: &GeometryCollection<T>,
    progress: Progress,
) -> Result<Assignment<S, T>> {
    let covering = assign_by_covering(sources, targets, progress)?;

    let unassigned: Vec<S> = covering.unassigned().into_iter().cloned().collect();
    if unassigned.is_empty() {
        return Ok(covering);
    }

    let remaining = {
        let pending: FxHashSet<&S> = unassigned.iter().collect();
        sources.subset(|id| pending.contains(id))
    };
    let by_area = assign_by_area(&remaining, targets, progress)?;

    let Assignment {
        mut targets,
        ambiguous,
    } = covering;
    for (source, target) in by_area.iter() {
        if let Some(target) = target {
            targets.insert(source.clone(), Some(target.clone()));
        }
    }

    let assignment = Assignment { targets, ambiguous };
    tracing::debug!(
        sources = assignment.len(),
        assigned = assignment.assigned_count(),
        "assigned sources to targets"
    );
    Ok(assignment)
}

/// Assigns each source to the first target (in target order) that covers
/// it. Sources covered by several targets are recorded as ambiguous.
pub fn assign_by_covering<S: Id, T: Id>(
    sources: &GeometryCollection<S>,
    targets: &GeometryCollection<T>,
    progress: Progress,
) -> Result<Assignment<S, T>> {
    require_same_crs(sources.crs(), targets.crs())?;

    let index = SpatialIndex::build(sources, progress);
    let tracker = progress.tracker("covering", targets.len());
    let covered: Vec<Vec<usize>> = targets
        .entries()
        .par_iter()
        .map(|(_, target)| {
            let positions = index.covered_positions(target);
            tracker.tick();
            positions
        })
        .collect();

    let mut coverers: Vec<SmallVec<[usize; 2]>> = vec![SmallVec::new(); sources.len()];
    for (target_position, positions) in covered.iter().enumerate() {
        for &source_position in positions {
            coverers[source_position].push(target_position);
        }
    }

    let target_id = |position: usize| targets.entries()[position].0.clone();
    let mut ambiguous: Vec<(S, Vec<T>)> = Vec::new();
    let assigned: Series<S, Option<T>> = sources
        .ids()
        .zip(&coverers)
        .map(|(source, found)| {
            if found.len() > 1 {
                let all = found.iter().map(|&p| target_id(p)).collect();
                ambiguous.push((source.clone(), all));
            }
            (source.clone(), found.first().map(|&p| target_id(p)))
        })
        .collect();

    if !ambiguous.is_empty() {
        tracing::warn!(
            count = ambiguous.len(),
            "sources covered by more than one target; the first covering target wins"
        );
    }

    Ok(Assignment {
        targets: assigned,
        ambiguous,
    })
}

/// Assigns each source to the target with which it shares the largest
/// positive intersection area. Ties go to the lowest target id.
pub fn assign_by_area<S: Id, T: Id>(
    sources: &GeometryCollection<S>,
    targets: &GeometryCollection<T>,
    progress: Progress,
) -> Result<Assignment<S, T>> {
    let relation = intersections(sources, targets, Some(0.0), progress)?;
    let best = assign_to_max(&relation.areas());
    let assigned = sources
        .ids()
        .map(|source| (source.clone(), best.get(source).cloned()))
        .collect();
    Ok(Assignment::from_series(assigned))
}

/// For every first-level key, picks the second-level key with the largest
/// weight. Ties go to the lowest second-level key; NaN weights are ignored.
///
/// The result is sorted by first-level key.
pub fn assign_to_max<S: Id, T: Id>(weights: &Series<(S, T)>) -> Series<S, T> {
    let mut rows: Vec<(&(S, T), f64)> = weights
        .iter()
        .filter(|(_, w)| !w.is_nan())
        .map(|(k, &w)| (k, w))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));

    let mut best: Vec<(S, T, f64)> = Vec::new();
    for ((source, target), weight) in rows {
        match best.last_mut() {
            Some(last) if last.0 == *source => {
                if weight > last.2 {
                    last.1 = target.clone();
                    last.2 = weight;
                }
            }
            _ => best.push((source.clone(), target.clone(), weight)),
        }
    }
    best.into_iter().map(|(s, t, _)| (s, t)).collect()
}
