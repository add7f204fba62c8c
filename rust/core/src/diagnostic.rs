// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Non-fatal topology diagnostics.
//!
//! Diagnostics ride along with an otherwise successful result. Callers
//! should treat them as warnings.

use std::fmt;

use crate::id::Id;

/// A topological anomaly found while computing adjacencies.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Diagnostic<K> {
    /// Pairs whose intersection has positive area.
    OverlapDetected { pairs: Vec<(K, K)> },
    /// Geometries without any adjacency.
    IslandDetected { ids: Vec<K> },
}

impl<K: Id> Diagnostic<K> {
    /// Short machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Diagnostic::OverlapDetected { .. } => "OVERLAP_DETECTED",
            Diagnostic::IslandDetected { .. } => "ISLAND_DETECTED",
        }
    }

    /// Emits the diagnostic as a `tracing` warning.
    pub fn emit(&self) {
        tracing::warn!(code = self.code(), "{}", self);
    }
}

impl<K: Id> fmt::Display for Diagnostic<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::OverlapDetected { pairs } => write!(
                f,
                "found overlapping polygons while computing adjacencies, \
                 this could be evidence of topological problems; overlapping pairs: {pairs:?}"
            ),
            Diagnostic::IslandDetected { ids } => write!(f, "found islands: {ids:?}"),
        }
    }
}
