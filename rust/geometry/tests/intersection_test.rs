// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use areal_geometry::{unary_union, Geometry};

/// Four unit squares in a 2x2 grid.
fn grid() -> Vec<Geometry> {
    vec![
        Geometry::rect(0.0, 0.0, 1.0, 1.0),
        Geometry::rect(1.0, 0.0, 2.0, 1.0),
        Geometry::rect(0.0, 1.0, 1.0, 2.0),
        Geometry::rect(1.0, 1.0, 2.0, 2.0),
    ]
}

#[test]
fn test_grid_contacts() {
    let squares = grid();

    let rook = squares[0].intersection(&squares[1]);
    assert_relative_eq!(rook.length(), 1.0, epsilon = 1e-9);
    assert_eq!(rook.area(), 0.0);

    let queen = squares[0].intersection(&squares[3]);
    assert!(!queen.is_empty());
    assert_eq!(queen.length(), 0.0);

    let far = Geometry::rect(5.0, 5.0, 6.0, 6.0);
    assert!(squares[0].intersection(&far).is_empty());
}

#[test]
fn test_intersection_is_symmetric() {
    let a = Geometry::from_exterior([(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
    let b = Geometry::from_exterior([(9.5, 2.0), (20.0, 2.0), (20.0, 8.0), (9.5, 8.0)]);
    let ab = a.intersection(&b);
    let ba = b.intersection(&a);
    assert_relative_eq!(ab.area(), 3.0, epsilon = 1e-9);
    assert_relative_eq!(ab.area(), ba.area(), epsilon = 1e-9);
    assert_relative_eq!(ab.length(), ba.length(), epsilon = 1e-9);
    assert!(ab.lines().0.is_empty());
}

#[test]
fn test_nearly_coincident_edges_still_touch() {
    let a = Geometry::rect(0.0, 0.0, 1000.0, 1000.0);
    let b = Geometry::rect(1000.0 + 1e-9, 0.0, 2000.0, 1000.0);
    let i = a.intersection(&b);
    assert_relative_eq!(i.length(), 1000.0, epsilon = 1e-6);
}

#[test]
fn test_union_of_grid_is_square() {
    let squares = grid();
    let union = unary_union(squares.iter());
    assert_eq!(union.polygons().len(), 1);
    assert_relative_eq!(union.area(), 4.0, epsilon = 1e-9);
    assert!(union.holes().is_empty());
}
