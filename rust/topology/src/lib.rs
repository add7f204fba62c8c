// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Areal Topology
//!
//! Spatial relationships between two layers of planar polygons, and the
//! operations built on them:
//!
//! - [`SpatialIndex`]: R-tree over a collection's bounding boxes
//! - [`intersections`] / [`iter_adjacent_pairs`]: exact pairwise intersections
//! - [`adjacencies`]: rook / queen adjacency with overlap and island diagnostics
//! - [`assign`]: each source to one covering or most-overlapping target
//! - [`prorate`] / [`normalize`]: redistribute attributes by weight
//! - [`close_gaps`] / [`resolve_overlaps`]: fold small defects into neighbours
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use areal_core::{Aggregate, MissingWeight, Progress};
//! use areal_topology::{intersections, normalize, prorate};
//!
//! let pieces = intersections(&blocks, &precincts, Some(0.0), Progress::disabled())?;
//! let weights = normalize(&pieces.areas(), 0)?;
//! let totals = prorate(&pieces, &population, &weights, Aggregate::Sum, MissingWeight::Error)?;
//! ```

pub mod adjacency;
pub mod assign;
pub mod index;
pub mod intersect;
pub mod prorate;
pub mod repair;

pub use adjacency::{adjacencies, Adjacencies, AdjacencyKind, AdjacencyOptions};
pub use areal_core::{Error, Result};
pub use assign::{assign, assign_by_area, assign_by_covering, assign_to_max, Assignment};
pub use index::SpatialIndex;
pub use intersect::{intersections, iter_adjacent_pairs, AdjacentPairs, IntersectionRelation};
pub use prorate::{normalize, prorate, Relationship, RelationshipRow};
pub use repair::{absorb_by_shared_perimeter, close_gaps, holes_of_union, resolve_overlaps};
