// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Areal Geometry
//!
//! Planar polygon primitives used by the areal engines: polygon booleans via
//! i_overlay, shared-boundary contact, exact intersections with their lineal
//! and puntal parts, prepared `covers` tests and the ordered
//! [`GeometryCollection`].

pub mod bool2d;
pub mod boundary;
pub mod collection;
pub mod geometry;
pub mod intersection;

// Re-export geo types for convenience
pub use geo::{Coord, LineString, MultiPolygon, Polygon, Rect};

pub use areal_core::{Error, Result};
pub use collection::GeometryCollection;
pub use geometry::{unary_union, Geometry};
pub use intersection::Intersection;
