// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Boolean Operations on Multipolygons
//!
//! Polygon intersection, union and difference using the i_overlay crate.
//! Every operation normalizes winding first (outer rings counter-clockwise,
//! holes clockwise) and fills with the non-zero rule, so overlapping inputs
//! union correctly and self-intersecting rings resolve the way a zero-width
//! buffer would.

use geo::{LineString, MultiPolygon, Polygon};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;

/// i_overlay contour: open ring of `[x, y]` points.
type Path = Vec<[f64; 2]>;

/// Intersection of two multipolygons (area only; boundary contact is
/// handled by [`crate::boundary`]).
pub fn intersection(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if a.0.is_empty() || b.0.is_empty() {
        return MultiPolygon::new(Vec::new());
    }
    overlay(a, b, OverlayRule::Intersect)
}

/// Union of two multipolygons.
pub fn union(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    union_all([a, b])
}

/// `a` minus `b`.
pub fn difference(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if a.0.is_empty() {
        return MultiPolygon::new(Vec::new());
    }
    if b.0.is_empty() {
        return self_union(a);
    }
    overlay(a, b, OverlayRule::Difference)
}

/// Union of any number of multipolygons in a single overlay pass.
pub fn union_all<'a>(parts: impl IntoIterator<Item = &'a MultiPolygon<f64>>) -> MultiPolygon<f64> {
    let subject: Vec<Path> = parts.into_iter().flat_map(multipolygon_to_paths).collect();
    if subject.is_empty() {
        return MultiPolygon::new(Vec::new());
    }
    let clip: Vec<Path> = Vec::new();
    let result = subject.overlay(&clip, OverlayRule::Union, FillRule::NonZero);
    shapes_to_multipolygon(&result)
}

/// Self-union: resolves self-intersections and collapses degenerate rings.
/// Plays the role of a zero-distance buffer.
pub fn self_union(a: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    union_all([a])
}

/// Compute the signed area of a 2D contour
/// Positive = counter-clockwise, Negative = clockwise
pub fn compute_signed_area(contour: &[[f64; 2]]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = contour.len();

    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i][0] * contour[j][1];
        area -= contour[j][0] * contour[i][1];
    }

    area * 0.5
}

/// Ensure contour has counter-clockwise winding (positive area)
pub fn ensure_ccw(mut contour: Path) -> Path {
    if compute_signed_area(&contour) < 0.0 {
        contour.reverse();
    }
    contour
}

/// Ensure contour has clockwise winding (for holes)
pub fn ensure_cw(mut contour: Path) -> Path {
    if compute_signed_area(&contour) > 0.0 {
        contour.reverse();
    }
    contour
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

fn overlay(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>, rule: OverlayRule) -> MultiPolygon<f64> {
    let subject = multipolygon_to_paths(a);
    let clip = multipolygon_to_paths(b);
    let result = subject.overlay(&clip, rule, FillRule::NonZero);
    shapes_to_multipolygon(&result)
}

/// Convert a multipolygon to i_overlay paths with normalized winding
fn multipolygon_to_paths(mp: &MultiPolygon<f64>) -> Vec<Path> {
    let mut paths = Vec::new();
    for polygon in &mp.0 {
        let outer = ring_to_path(polygon.exterior());
        if outer.len() < 3 {
            continue;
        }
        paths.push(ensure_ccw(outer));
        for hole in polygon.interiors() {
            let hole = ring_to_path(hole);
            if hole.len() >= 3 {
                paths.push(ensure_cw(hole));
            }
        }
    }
    paths
}

/// Convert a closed geo ring to an open i_overlay path
fn ring_to_path(ring: &LineString<f64>) -> Path {
    let mut path: Path = ring.0.iter().map(|c| [c.x, c.y]).collect();
    if path.len() > 1 && path.first() == path.last() {
        path.pop();
    }
    path
}

/// Convert i_overlay result shapes back to a multipolygon
///
/// i_overlay returns Vec<Vec<Vec<[f64; 2]>>> where:
/// - Outer Vec: list of shapes
/// - Middle Vec: list of contours per shape (first is outer, rest are holes)
/// - Inner Vec: list of points per contour
fn shapes_to_multipolygon(shapes: &[Vec<Path>]) -> MultiPolygon<f64> {
    let mut polygons = Vec::with_capacity(shapes.len());
    for shape in shapes {
        let Some(outer) = shape.first() else {
            continue;
        };
        if compute_signed_area(outer) == 0.0 {
            continue;
        }
        let holes = shape
            .iter()
            .skip(1)
            .filter(|hole| compute_signed_area(hole) != 0.0)
            .map(|hole| LineString::from(hole.clone()))
            .collect();
        polygons.push(Polygon::new(LineString::from(outer.clone()), holes));
    }
    MultiPolygon::new(polygons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Area};

    const EPSILON_2D: f64 = 1e-9;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0),
            (x: x1, y: y0),
            (x: x1, y: y1),
            (x: x0, y: y1),
        ]])
    }

    #[test]
    fn test_compute_signed_area_ccw() {
        let contour = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        assert!((compute_signed_area(&contour) - 1.0).abs() < EPSILON_2D);
    }

    #[test]
    fn test_compute_signed_area_cw() {
        let contour = vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];
        assert!((compute_signed_area(&contour) + 1.0).abs() < EPSILON_2D);
    }

    #[test]
    fn test_ensure_ccw() {
        let cw = vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];
        assert!(compute_signed_area(&ensure_ccw(cw)) > 0.0);
    }

    #[test]
    fn test_intersection_of_overlapping_squares() {
        let a = square(0.0, 0.0, 2.0, 2.0);
        let b = square(1.0, 1.0, 3.0, 3.0);
        let result = intersection(&a, &b);
        assert!((result.unsigned_area() - 1.0).abs() < EPSILON_2D);
    }

    #[test]
    fn test_touching_squares_have_no_area_intersection() {
        let a = square(0.0, 0.0, 1.0, 1.0);
        let b = square(1.0, 0.0, 2.0, 1.0);
        assert!(intersection(&a, &b).unsigned_area() < EPSILON_2D);
    }

    #[test]
    fn test_union_all_overlapping() {
        let a = square(0.0, 0.0, 2.0, 2.0);
        let b = square(1.0, 1.0, 3.0, 3.0);
        let c = square(10.0, 10.0, 11.0, 11.0);
        let result = union_all([&a, &b, &c]);
        assert_eq!(result.0.len(), 2);
        assert!((result.unsigned_area() - 8.0).abs() < EPSILON_2D);
    }

    #[test]
    fn test_union_encloses_hole() {
        // Ring of four rectangles around the unit square (1,1)-(2,2)
        let parts = [
            square(0.0, 0.0, 3.0, 1.0),
            square(0.0, 2.0, 3.0, 3.0),
            square(0.0, 1.0, 1.0, 2.0),
            square(2.0, 1.0, 3.0, 2.0),
        ];
        let result = union_all(parts.iter());
        assert_eq!(result.0.len(), 1);
        assert_eq!(result.0[0].interiors().len(), 1);
        assert!((result.unsigned_area() - 8.0).abs() < EPSILON_2D);
    }

    #[test]
    fn test_difference_cuts_notch() {
        let a = square(0.0, 0.0, 10.0, 10.0);
        let b = square(9.0, 4.0, 11.0, 5.0);
        let result = difference(&a, &b);
        assert!((result.unsigned_area() - 99.0).abs() < EPSILON_2D);
    }

    #[test]
    fn test_self_union_keeps_clean_polygon() {
        let a = square(0.0, 0.0, 4.0, 4.0);
        assert!((self_union(&a).unsigned_area() - 16.0).abs() < EPSILON_2D);
    }
}
