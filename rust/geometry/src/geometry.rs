// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Immutable polygon / multipolygon values.
//!
//! A [`Geometry`] is a shared, read-only multipolygon. Cloning is a reference
//! count bump; every operation returns a new value.

use std::sync::Arc;

use geo::{Area, BoundingRect, Coord, LineString, MultiPolygon, Polygon, Rect, Relate};

use crate::bool2d;
use crate::boundary;
use crate::intersection::Intersection;

/// A polygonal geometry in planar coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry(Arc<MultiPolygon<f64>>);

impl Geometry {
    pub fn new(multi_polygon: MultiPolygon<f64>) -> Self {
        Self(Arc::new(multi_polygon))
    }

    pub fn empty() -> Self {
        Self::new(MultiPolygon::new(Vec::new()))
    }

    /// Axis-aligned rectangle between two corners.
    pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Polygon::from(Rect::new((x0, y0), (x1, y1))).into()
    }

    /// Polygon without holes from its exterior ring. The ring is closed
    /// automatically.
    pub fn from_exterior(coords: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let ring: LineString<f64> = coords.into_iter().collect();
        Polygon::new(ring, Vec::new()).into()
    }

    #[inline]
    pub fn multi_polygon(&self) -> &MultiPolygon<f64> {
        &self.0
    }

    #[inline]
    pub fn polygons(&self) -> &[Polygon<f64>] {
        &self.0 .0
    }

    /// True when no polygon has a non-degenerate exterior ring.
    pub fn is_empty(&self) -> bool {
        self.0 .0.iter().all(|p| p.exterior().0.len() < 4)
    }

    pub fn area(&self) -> f64 {
        self.0.unsigned_area()
    }

    /// Total boundary length: every exterior and interior ring.
    pub fn length(&self) -> f64 {
        perimeter(&self.0)
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.0.bounding_rect()
    }

    /// Exact intersection, including shared boundary lines and touching
    /// points.
    pub fn intersection(&self, other: &Geometry) -> Intersection {
        let (Some(a), Some(b)) = (self.bounds(), other.bounds()) else {
            return Intersection::empty();
        };
        let tolerance = boundary::tolerance(a, b);
        if a.min().x > b.max().x + tolerance
            || b.min().x > a.max().x + tolerance
            || a.min().y > b.max().y + tolerance
            || b.min().y > a.max().y + tolerance
        {
            return Intersection::empty();
        }

        let polygon = bool2d::intersection(&self.0, &other.0);
        let contact = boundary::contacts(&self.0, &other.0, tolerance).without(&polygon, tolerance);
        Intersection::new(polygon, contact.lines, contact.points)
    }

    pub fn union(&self, other: &Geometry) -> Geometry {
        bool2d::union(&self.0, &other.0).into()
    }

    pub fn difference(&self, other: &Geometry) -> Geometry {
        bool2d::difference(&self.0, &other.0).into()
    }

    /// Zero-width buffer: resolves self-intersections, merges overlapping
    /// parts and drops degenerate rings.
    pub fn buffer0(&self) -> Geometry {
        bool2d::self_union(&self.0).into()
    }

    /// Every interior ring as a standalone polygon.
    pub fn holes(&self) -> Vec<Geometry> {
        self.polygons()
            .iter()
            .flat_map(|p| p.interiors())
            .map(|ring| Polygon::new(ring.clone(), Vec::new()).into())
            .collect()
    }

    /// Prepares this geometry for repeated `covers` tests.
    ///
    /// The returned predicate is true when no point of the argument lies in
    /// the exterior of this geometry.
    pub fn prepare(&self) -> impl Fn(&Geometry) -> bool + '_ {
        let prepared = geo::PreparedGeometry::from(self.multi_polygon());
        move |other: &Geometry| {
            !other.is_empty() && prepared.relate(other.multi_polygon()).is_covers()
        }
    }

    /// One-shot covers test. Use [`Geometry::prepare`] inside loops.
    pub fn covers(&self, other: &Geometry) -> bool {
        !other.is_empty() && self.0.relate(other.multi_polygon()).is_covers()
    }
}

impl From<MultiPolygon<f64>> for Geometry {
    fn from(mp: MultiPolygon<f64>) -> Self {
        Self::new(mp)
    }
}

impl From<Polygon<f64>> for Geometry {
    fn from(p: Polygon<f64>) -> Self {
        Self::new(MultiPolygon::new(vec![p]))
    }
}

/// Union of any number of geometries in one overlay pass.
pub fn unary_union<'a>(geometries: impl IntoIterator<Item = &'a Geometry>) -> Geometry {
    bool2d::union_all(geometries.into_iter().map(|g| g.multi_polygon())).into()
}

/// Sum of ring lengths of a multipolygon.
pub(crate) fn perimeter(mp: &MultiPolygon<f64>) -> f64 {
    mp.0.iter()
        .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
        .map(ring_length)
        .sum()
}

fn ring_length(ring: &LineString<f64>) -> f64 {
    ring.0
        .windows(2)
        .map(|w| distance(w[0], w[1]))
        .sum()
}

#[inline]
fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rect_measures() {
        let g = Geometry::rect(0.0, 0.0, 2.0, 3.0);
        assert_relative_eq!(g.area(), 6.0);
        assert_relative_eq!(g.length(), 10.0);
        assert!(!g.is_empty());
        assert!(Geometry::empty().is_empty());
        assert!(Geometry::empty().bounds().is_none());
    }

    #[test]
    fn test_from_exterior_closes_ring() {
        let g = Geometry::from_exterior([(0.0, 0.0), (4.0, 0.0), (0.0, 3.0)]);
        assert_relative_eq!(g.area(), 6.0);
        assert_relative_eq!(g.length(), 12.0);
    }

    #[test]
    fn test_union_and_difference() {
        let a = Geometry::rect(0.0, 0.0, 2.0, 2.0);
        let b = Geometry::rect(1.0, 0.0, 3.0, 2.0);
        assert_relative_eq!(a.union(&b).area(), 6.0, epsilon = 1e-9);
        assert_relative_eq!(a.difference(&b).area(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_holes() {
        let outer = LineString::from(vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let inner = LineString::from(vec![(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0)]);
        let g: Geometry = Polygon::new(outer, vec![inner]).into();
        assert_relative_eq!(g.area(), 15.0);
        let holes = g.holes();
        assert_eq!(holes.len(), 1);
        assert_relative_eq!(holes[0].area(), 1.0);
    }

    #[test]
    fn test_covers_includes_boundary() {
        let big = Geometry::rect(0.0, 0.0, 4.0, 4.0);
        let inside = Geometry::rect(0.0, 0.0, 1.0, 1.0);
        let straddling = Geometry::rect(3.0, 3.0, 5.0, 5.0);
        let covers = big.prepare();
        assert!(covers(&inside));
        assert!(!covers(&straddling));
        assert!(big.covers(&inside));
        assert!(!inside.covers(&big));
    }

    #[test]
    fn test_unary_union_merges() {
        let parts = [
            Geometry::rect(0.0, 0.0, 1.0, 1.0),
            Geometry::rect(1.0, 0.0, 2.0, 1.0),
        ];
        let merged = unary_union(parts.iter());
        assert_eq!(merged.polygons().len(), 1);
        assert_relative_eq!(merged.area(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_buffer0_resolves_bowtie() {
        let bowtie = Geometry::from_exterior([(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]);
        let repaired = bowtie.buffer0();
        assert_relative_eq!(repaired.area(), 2.0, epsilon = 1e-9);
    }
}
