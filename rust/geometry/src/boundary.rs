// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary contact between two multipolygons.
//!
//! Polygon booleans only report the two-dimensional part of an intersection.
//! Regions that merely touch share boundary segments or isolated points, and
//! those are found here by walking both sets of ring segments. All tests use
//! an absolute tolerance derived from the extent of the inputs, so boundaries
//! that were digitized from the same source but round differently still
//! register as shared.

use geo::{Coord, Line, LineString, MultiPolygon, Rect};
use smallvec::SmallVec;

/// Relative tolerance applied to the combined extent of both inputs.
const RELATIVE_TOLERANCE: f64 = 1e-8;

/// Shared boundary pieces and touching points between two multipolygons.
#[derive(Debug, Clone, Default)]
pub struct BoundaryContact {
    pub lines: Vec<Line<f64>>,
    pub points: Vec<Coord<f64>>,
}

impl BoundaryContact {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.points.is_empty()
    }

    /// Drops everything that lies on `polygon`, then points on the remaining
    /// lines. Lower-dimensional parts never duplicate a higher-dimensional one.
    pub fn without(mut self, polygon: &MultiPolygon<f64>, tolerance: f64) -> Self {
        if !polygon.0.is_empty() {
            self.lines.retain(|line| {
                let mid = Coord {
                    x: (line.start.x + line.end.x) * 0.5,
                    y: (line.start.y + line.end.y) * 0.5,
                };
                !covers_coord(polygon, mid, tolerance)
            });
            self.points
                .retain(|p| !covers_coord(polygon, *p, tolerance));
        }
        let lines = &self.lines;
        self.points.retain(|p| {
            !lines
                .iter()
                .any(|line| distance_to_segment(*p, line) <= tolerance)
        });
        self
    }
}

/// Absolute tolerance for two inputs with the given bounding boxes.
pub fn tolerance(a: Rect<f64>, b: Rect<f64>) -> f64 {
    let min_x = a.min().x.min(b.min().x);
    let min_y = a.min().y.min(b.min().y);
    let max_x = a.max().x.max(b.max().x);
    let max_y = a.max().y.max(b.max().y);
    let extent = (max_x - min_x).max(max_y - min_y);
    let magnitude = min_x
        .abs()
        .max(min_y.abs())
        .max(max_x.abs())
        .max(max_y.abs());
    (extent * RELATIVE_TOLERANCE).max(magnitude * f64::EPSILON * 16.0)
}

/// Finds every boundary segment piece and point shared by `a` and `b`.
pub fn contacts(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>, tolerance: f64) -> BoundaryContact {
    let a_segments = segments(a);
    let b_segments = segments(b);
    let b_boxes: Vec<[f64; 4]> = b_segments.iter().map(segment_box).collect();

    let mut contact = BoundaryContact::default();
    for seg_a in &a_segments {
        let [ax0, ay0, ax1, ay1] = segment_box(seg_a);
        let mut found: SmallVec<[Contact; 4]> = SmallVec::new();
        for (seg_b, [bx0, by0, bx1, by1]) in b_segments.iter().zip(&b_boxes) {
            if *bx0 > ax1 + tolerance
                || *bx1 < ax0 - tolerance
                || *by0 > ay1 + tolerance
                || *by1 < ay0 - tolerance
            {
                continue;
            }
            if let Some(c) = segment_contact(seg_a, seg_b, tolerance) {
                found.push(c);
            }
        }
        for c in found {
            match c {
                Contact::Segment(line) => push_line(&mut contact.lines, line, tolerance),
                Contact::Point(p) => push_point(&mut contact.points, p, tolerance),
            }
        }
    }
    contact
}

/// True when `point` lies inside `polygon` or within `tolerance` of its
/// boundary.
pub fn covers_coord(polygon: &MultiPolygon<f64>, point: Coord<f64>, tolerance: f64) -> bool {
    polygon.0.iter().any(|poly| {
        let on_boundary = std::iter::once(poly.exterior())
            .chain(poly.interiors())
            .flat_map(|ring| ring.lines())
            .any(|line| distance_to_segment(point, &line) <= tolerance);
        on_boundary
            || (point_in_ring(point, poly.exterior())
                && !poly.interiors().iter().any(|h| point_in_ring(point, h)))
    })
}

/// Even-odd ray casting against a closed ring.
pub fn point_in_ring(point: Coord<f64>, ring: &LineString<f64>) -> bool {
    let contour = &ring.0;
    let n = contour.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = contour[i];
        let pj = contour[j];

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Euclidean length of a segment.
#[inline]
pub fn segment_length(line: &Line<f64>) -> f64 {
    (line.end.x - line.start.x).hypot(line.end.y - line.start.y)
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

enum Contact {
    Point(Coord<f64>),
    Segment(Line<f64>),
}

fn segments(mp: &MultiPolygon<f64>) -> Vec<Line<f64>> {
    mp.0.iter()
        .flat_map(|poly| std::iter::once(poly.exterior()).chain(poly.interiors()))
        .flat_map(|ring| ring.lines())
        .filter(|line| line.start != line.end)
        .collect()
}

fn segment_box(line: &Line<f64>) -> [f64; 4] {
    [
        line.start.x.min(line.end.x),
        line.start.y.min(line.end.y),
        line.start.x.max(line.end.x),
        line.start.y.max(line.end.y),
    ]
}

#[inline]
fn cross(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

#[inline]
fn dot(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x * b.x + a.y * b.y
}

#[inline]
fn at(line: &Line<f64>, t: f64) -> Coord<f64> {
    line.start + line.delta() * t
}

fn distance_to_segment(p: Coord<f64>, line: &Line<f64>) -> f64 {
    let d = line.delta();
    let len_sq = dot(d, d);
    if len_sq == 0.0 {
        return (p.x - line.start.x).hypot(p.y - line.start.y);
    }
    let t = (dot(p - line.start, d) / len_sq).clamp(0.0, 1.0);
    let q = at(line, t);
    (p.x - q.x).hypot(p.y - q.y)
}

fn segment_contact(p: &Line<f64>, q: &Line<f64>, tolerance: f64) -> Option<Contact> {
    let d = p.delta();
    let e = q.delta();
    let len_p = d.x.hypot(d.y);
    let len_q = e.x.hypot(e.y);
    if len_p <= tolerance || len_q <= tolerance {
        return None;
    }

    // Collinear: both endpoints of q sit on the carrier line of p.
    let off_start = cross(d, q.start - p.start) / len_p;
    let off_end = cross(d, q.end - p.start) / len_p;
    if off_start.abs() <= tolerance && off_end.abs() <= tolerance {
        let len_sq = len_p * len_p;
        let t0 = dot(q.start - p.start, d) / len_sq;
        let t1 = dot(q.end - p.start, d) / len_sq;
        let lo = t0.min(t1).max(0.0);
        let hi = t0.max(t1).min(1.0);
        let slack = tolerance / len_p;
        if hi < lo - slack {
            return None;
        }
        if (hi - lo) * len_p <= tolerance {
            return Some(Contact::Point(at(p, ((lo + hi) * 0.5).clamp(0.0, 1.0))));
        }
        return Some(Contact::Segment(Line::new(at(p, lo), at(p, hi))));
    }

    let denom = cross(d, e);
    if denom == 0.0 {
        return None;
    }
    let w = q.start - p.start;
    let t = cross(w, e) / denom;
    let u = cross(w, d) / denom;
    let t_slack = tolerance / len_p;
    let u_slack = tolerance / len_q;
    if t < -t_slack || t > 1.0 + t_slack || u < -u_slack || u > 1.0 + u_slack {
        return None;
    }
    Some(Contact::Point(at(p, t.clamp(0.0, 1.0))))
}

/// Appends a line piece, extending the previous piece when they chain.
fn push_line(lines: &mut Vec<Line<f64>>, line: Line<f64>, tolerance: f64) {
    if let Some(last) = lines.last_mut() {
        let joins = close(last.end, line.start, tolerance);
        let d0 = last.delta();
        let d1 = line.delta();
        let straight = cross(d0, d1).abs() <= tolerance * (d0.x.hypot(d0.y) + d1.x.hypot(d1.y))
            && dot(d0, d1) > 0.0;
        if joins && straight {
            last.end = line.end;
            return;
        }
    }
    lines.push(line);
}

fn push_point(points: &mut Vec<Coord<f64>>, p: Coord<f64>, tolerance: f64) {
    if !points.iter().any(|q| close(*q, p, tolerance)) {
        points.push(p);
    }
}

#[inline]
fn close(a: Coord<f64>, b: Coord<f64>, tolerance: f64) -> bool {
    (a.x - b.x).hypot(a.y - b.y) <= tolerance
}
