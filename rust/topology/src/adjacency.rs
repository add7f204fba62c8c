// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Adjacency classifier
//!
//! Rook adjacency requires a shared boundary of positive length; queen
//! adjacency accepts any contact, including a single shared corner.

use std::fmt;
use std::str::FromStr;

use areal_core::{Diagnostic, Error, Id, Progress, Result};
use areal_geometry::GeometryCollection;
use rustc_hash::FxHashSet;

use crate::intersect::{iter_adjacent_pairs, IntersectionRelation};

/// Which contacts count as adjacency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AdjacencyKind {
    /// Shared boundary of positive length.
    #[default]
    Rook,
    /// Any shared point.
    Queen,
}

impl AdjacencyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjacencyKind::Rook => "rook",
            AdjacencyKind::Queen => "queen",
        }
    }
}

impl FromStr for AdjacencyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rook" => Ok(AdjacencyKind::Rook),
            "queen" => Ok(AdjacencyKind::Queen),
            other => Err(Error::InvalidArgument(format!(
                "adjacency type must be \"rook\" or \"queen\" (got \"{other}\")"
            ))),
        }
    }
}

impl fmt::Display for AdjacencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which diagnostics [`adjacencies`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjacencyOptions {
    pub warn_for_overlaps: bool,
    pub warn_for_islands: bool,
}

impl AdjacencyOptions {
    /// No diagnostics at all.
    pub const fn silent() -> Self {
        Self {
            warn_for_overlaps: false,
            warn_for_islands: false,
        }
    }
}

impl Default for AdjacencyOptions {
    fn default() -> Self {
        Self {
            warn_for_overlaps: true,
            warn_for_islands: true,
        }
    }
}

/// Adjacent pairs `(i, j)` with `i` before `j` in the collection, plus any
/// diagnostics.
#[derive(Debug, Clone)]
pub struct Adjacencies<K> {
    pub relation: IntersectionRelation<K, K>,
    pub diagnostics: Vec<Diagnostic<K>>,
}

impl<K: Id> Adjacencies<K> {
    /// Adjacent pairs in sorted order.
    pub fn pairs(&self) -> Vec<(K, K)> {
        self.relation.keys().cloned().collect()
    }
}

/// Classifies the self-intersections of `collection` as adjacencies.
///
/// Overlapping pairs (positive-area intersection) stay in the result; they
/// are only reported. Islands are ids that appear in no kept pair.
pub fn adjacencies<K: Id>(
    collection: &GeometryCollection<K>,
    kind: AdjacencyKind,
    options: AdjacencyOptions,
    progress: Progress,
) -> Adjacencies<K> {
    let relation: IntersectionRelation<K, K> = iter_adjacent_pairs(collection, progress)
        .filter(|(_, intersection)| match kind {
            AdjacencyKind::Rook => intersection.length() > 0.0,
            AdjacencyKind::Queen => true,
        })
        .collect();

    let mut diagnostics = Vec::new();

    if options.warn_for_overlaps {
        let pairs: Vec<(K, K)> = relation
            .iter()
            .filter(|(_, intersection)| intersection.area() > 0.0)
            .map(|(pair, _)| pair.clone())
            .collect();
        if !pairs.is_empty() {
            diagnostics.push(Diagnostic::OverlapDetected { pairs });
        }
    }

    if options.warn_for_islands {
        let linked: FxHashSet<&K> = relation.keys().flat_map(|(a, b)| [a, b]).collect();
        let ids: Vec<K> = collection
            .ids()
            .filter(|id| !linked.contains(id))
            .cloned()
            .collect();
        if !ids.is_empty() {
            diagnostics.push(Diagnostic::IslandDetected { ids });
        }
    }

    for diagnostic in &diagnostics {
        diagnostic.emit();
    }

    tracing::debug!(
        kind = kind.as_str(),
        geometries = collection.len(),
        pairs = relation.len(),
        diagnostics = diagnostics.len(),
        "computed adjacencies"
    );

    Adjacencies {
        relation,
        diagnostics,
    }
}
