// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The exact intersection of two geometries.

use geo::{Area, Coord, Line, MultiLineString, MultiPoint, MultiPolygon};

use crate::bool2d;
use crate::boundary::segment_length;
use crate::geometry::{perimeter, Geometry};

/// Polygonal, lineal and puntal parts of an intersection.
///
/// Parts never overlap: shared boundary lines that lie on the polygonal part
/// and points that lie on either higher-dimensional part are not kept.
#[derive(Debug, Clone)]
pub struct Intersection {
    polygon: MultiPolygon<f64>,
    lines: Vec<Line<f64>>,
    points: Vec<Coord<f64>>,
}

impl Intersection {
    pub(crate) fn new(
        polygon: MultiPolygon<f64>,
        lines: Vec<Line<f64>>,
        points: Vec<Coord<f64>>,
    ) -> Self {
        Self {
            polygon,
            lines,
            points,
        }
    }

    pub fn empty() -> Self {
        Self {
            polygon: MultiPolygon::new(Vec::new()),
            lines: Vec::new(),
            points: Vec::new(),
        }
    }

    /// True when the geometries do not touch at all.
    pub fn is_empty(&self) -> bool {
        self.polygon.0.is_empty() && self.lines.is_empty() && self.points.is_empty()
    }

    /// Area of the polygonal part.
    pub fn area(&self) -> f64 {
        self.polygon.unsigned_area()
    }

    /// Perimeter of the polygonal part plus the length of shared boundary
    /// lines. Zero for point-only contact.
    pub fn length(&self) -> f64 {
        perimeter(&self.polygon) + self.lines.iter().map(segment_length).sum::<f64>()
    }

    pub fn polygon(&self) -> &MultiPolygon<f64> {
        &self.polygon
    }

    pub fn lines(&self) -> MultiLineString<f64> {
        MultiLineString::new(self.lines.iter().map(|l| (*l).into()).collect())
    }

    pub fn points(&self) -> MultiPoint<f64> {
        MultiPoint::new(self.points.iter().map(|c| (*c).into()).collect())
    }

    pub fn has_polygon(&self) -> bool {
        !self.polygon.0.is_empty()
    }

    /// The polygonal part cleaned by a zero-width self-union, with the
    /// lineal and puntal parts carried unchanged.
    pub fn repaired(&self) -> Self {
        Self {
            polygon: bool2d::self_union(&self.polygon),
            lines: self.lines.clone(),
            points: self.points.clone(),
        }
    }

    /// The polygonal part as a standalone geometry.
    pub fn polygonal(&self) -> Geometry {
        Geometry::from(bool2d::self_union(&self.polygon))
    }
}

impl Default for Intersection {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_intersection() {
        let empty = Intersection::empty();
        assert!(empty.is_empty());
        assert!(!empty.has_polygon());
        assert_eq!(empty.area(), 0.0);
        assert_eq!(empty.length(), 0.0);
        assert!(Intersection::default().is_empty());

        let a = Geometry::rect(0.0, 0.0, 1.0, 1.0);
        let far = Geometry::rect(5.0, 5.0, 6.0, 6.0);
        assert!(a.intersection(&far).is_empty());
    }

    #[test]
    fn test_overlap_has_area_and_perimeter() {
        let a = Geometry::rect(0.0, 0.0, 2.0, 2.0);
        let b = Geometry::rect(1.0, 1.0, 3.0, 3.0);
        let i = a.intersection(&b);
        assert!((i.area() - 1.0).abs() < 1e-9);
        assert!((i.length() - 4.0).abs() < 1e-9);
        assert!(i.lines().0.is_empty());
    }

    #[test]
    fn test_edge_touch_is_lineal() {
        let a = Geometry::rect(0.0, 0.0, 1.0, 1.0);
        let b = Geometry::rect(1.0, 0.0, 2.0, 1.0);
        let i = a.intersection(&b);
        assert!(!i.is_empty());
        assert_eq!(i.area(), 0.0);
        assert!((i.length() - 1.0).abs() < 1e-9);
        assert!(i.points().0.is_empty());
    }

    #[test]
    fn test_corner_touch_is_puntal() {
        let a = Geometry::rect(0.0, 0.0, 1.0, 1.0);
        let b = Geometry::rect(1.0, 1.0, 2.0, 2.0);
        let i = a.intersection(&b);
        assert!(!i.is_empty());
        assert_eq!(i.length(), 0.0);
        assert_eq!(i.points().0.len(), 1);
    }

    #[test]
    fn test_repaired_keeps_lines() {
        let a = Geometry::rect(0.0, 0.0, 1.0, 1.0);
        let b = Geometry::rect(1.0, 0.0, 2.0, 1.0);
        let repaired = a.intersection(&b).repaired();
        assert!((repaired.length() - 1.0).abs() < 1e-9);
        assert!(repaired.polygonal().is_empty());
    }
}
