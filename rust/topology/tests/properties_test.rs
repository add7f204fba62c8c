// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use areal_core::{Aggregate, Crs, Data, Id, MissingWeight, Options, Progress, Series};
use areal_geometry::{Geometry, GeometryCollection};
use areal_topology::{
    adjacencies, assign, close_gaps, intersections, normalize, prorate, resolve_overlaps,
    AdjacencyKind, AdjacencyOptions,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// `n` x `n` grid of unit squares, numbered row by row.
fn grid(n: u32) -> GeometryCollection<u32> {
    let cells = (0..n * n).map(|i| {
        let (x, y) = (f64::from(i % n), f64::from(i / n));
        (i, Geometry::rect(x, y, x + 1.0, y + 1.0))
    });
    GeometryCollection::try_from_entries(Crs::new("EPSG:26915"), cells).unwrap()
}

/// Two-column split of the grid extent.
fn halves(n: u32) -> GeometryCollection<&'static str> {
    let half = f64::from(n) / 2.0;
    let extent = f64::from(n);
    GeometryCollection::try_from_entries(
        Crs::new("EPSG:26915"),
        [
            ("west", Geometry::rect(0.0, 0.0, half, extent)),
            ("east", Geometry::rect(half, 0.0, extent, extent)),
        ],
    )
    .unwrap()
}

#[test]
fn test_rook_pairs_are_a_subset_of_queen_pairs() {
    init_logging();
    let collection = grid(4);
    let options = AdjacencyOptions::default();
    let rook = adjacencies(&collection, AdjacencyKind::Rook, options, Progress::enabled());
    let queen = adjacencies(&collection, AdjacencyKind::Queen, options, Progress::disabled());

    // 2 * n * (n - 1) edges, plus 2 * (n - 1)^2 diagonals.
    assert_eq!(rook.relation.len(), 24);
    assert_eq!(queen.relation.len(), 42);
    for pair in rook.relation.keys() {
        assert!(queen.relation.keys().any(|q| q == pair));
    }
    assert!(rook.diagnostics.is_empty());
}

#[test]
fn test_adjacency_pairs_are_ordered_and_unique() {
    let collection = grid(3);
    let queen = adjacencies(
        &collection,
        AdjacencyKind::Queen,
        AdjacencyOptions::default(),
        Progress::disabled(),
    );
    let pairs = queen.pairs();
    for (i, j) in &pairs {
        assert!(i < j);
    }
    let mut deduped = pairs.clone();
    deduped.dedup();
    assert_eq!(deduped, pairs);
}

/// Grid cells inserted in a scrambled order under the given ids.
fn scrambled<K: Id>(n: u32, id: impl Fn(u32) -> K) -> GeometryCollection<K> {
    let cells = (0..n * n).rev().map(|k| (k * 7 + 3) % (n * n)).map(|i| {
        let (x, y) = (f64::from(i % n), f64::from(i / n));
        (id(i), Geometry::rect(x, y, x + 1.0, y + 1.0))
    });
    GeometryCollection::try_from_entries(Crs::new("EPSG:26915"), cells).unwrap()
}

fn assert_ordered_and_unique<K: Id>(collection: &GeometryCollection<K>) {
    for kind in [AdjacencyKind::Rook, AdjacencyKind::Queen] {
        let options = AdjacencyOptions::default();
        let pairs = adjacencies(collection, kind, options, Progress::disabled()).pairs();
        for (i, j) in &pairs {
            assert!(i < j, "pair ({i:?}, {j:?}) is not ordered");
        }
        let mut sorted = pairs.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, pairs);
    }
}

#[test]
fn test_adjacency_pairs_ordered_for_scrambled_ids() {
    let numbered = scrambled(4, |i| i);
    assert_eq!(
        numbered.ids().copied().take(3).collect::<Vec<_>>(),
        vec![12, 5, 14]
    );
    assert_ordered_and_unique(&numbered);

    // Reversed labels, so label order disagrees with both insertion and cell order.
    let named = scrambled(4, |i| format!("cell-{:02}", 15 - i));
    assert_ordered_and_unique(&named);

    let rook = |collection: &GeometryCollection<u32>| {
        adjacencies(
            collection,
            AdjacencyKind::Rook,
            AdjacencyOptions::default(),
            Progress::disabled(),
        )
        .pairs()
    };
    assert_eq!(rook(&numbered).len(), 24);
    assert_eq!(rook(&numbered), rook(&grid(4)));
}

#[test]
fn test_assign_is_total_and_targets_exist() {
    let sources = grid(4);
    let targets = halves(4);
    let assignment = assign(&sources, &targets, Progress::disabled()).unwrap();
    assert_eq!(assignment.len(), sources.len());
    for (source, target) in assignment.iter() {
        let target = target.expect("every cell lies inside a half");
        assert!(targets.contains(target));
        let x = source % 4;
        assert_eq!(*target, if x < 2 { "west" } else { "east" });
    }
}

#[test]
fn test_prorate_with_normalized_weights_conserves_mass() {
    let sources = grid(4);
    // Offset targets so most cells are split between two targets.
    let targets = GeometryCollection::try_from_entries(
        Crs::new("EPSG:26915"),
        [
            (10u8, Geometry::rect(0.0, 0.0, 1.5, 4.0)),
            (11, Geometry::rect(1.5, 0.0, 2.5, 4.0)),
            (12, Geometry::rect(2.5, 0.0, 4.0, 4.0)),
        ],
    )
    .unwrap();

    let pieces = intersections(&sources, &targets, Some(0.0), Progress::disabled()).unwrap();
    let weights = normalize(&pieces.areas(), 0).unwrap();
    let population: Series<u32> = sources
        .ids()
        .map(|&id| (id, f64::from(id) + 1.0))
        .collect();
    let total = population.sum();

    let options = Options::default();
    let result = prorate(
        &pieces,
        &Data::from(population),
        &weights,
        options.aggregate,
        options.missing_weight,
    )
    .unwrap();
    let by_target = result.as_series().unwrap();
    assert_eq!(by_target.keys(), &[10, 11, 12]);
    assert_relative_eq!(by_target.sum(), total, epsilon = 1e-9);

    let means = prorate(
        &pieces,
        &Data::from(sources.areas()),
        &weights,
        Aggregate::Mean,
        MissingWeight::Error,
    )
    .unwrap();
    assert!(means.as_series().unwrap().values().iter().all(|v| *v > 0.0));
}

#[test]
fn test_normalize_group_sums() {
    let pieces = intersections(&grid(3), &halves(3), None, Progress::disabled()).unwrap();
    for level in [0, 1] {
        let weights = normalize(&pieces.areas(), level).unwrap();
        let groups = if level == 0 {
            weights.group_by(|(s, _)| s.to_string())
        } else {
            weights.group_by(|(_, t)| t.to_string())
        };
        for values in groups.values() {
            let sum: f64 = values.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9 || sum == 0.0, "group sum {sum}");
        }
    }
}

#[test]
fn test_repair_is_identity_on_clean_collections() {
    let collection = grid(3);
    let options = Options::default();

    let closed = close_gaps(&collection, options.relative_threshold, Progress::disabled()).unwrap();
    let resolved =
        resolve_overlaps(&collection, options.relative_threshold, Progress::disabled()).unwrap();
    for (id, geometry) in collection.iter() {
        assert_relative_eq!(closed.get(id).unwrap().area(), geometry.area(), epsilon = 1e-9);
        assert_relative_eq!(resolved.get(id).unwrap().area(), geometry.area(), epsilon = 1e-9);
    }
    assert_eq!(
        closed.ids().collect::<Vec<_>>(),
        collection.ids().collect::<Vec<_>>()
    );
}

#[test]
fn test_progress_scope_does_not_change_results() {
    let collection = grid(3);
    let quiet = adjacencies(
        &collection,
        AdjacencyKind::Rook,
        AdjacencyOptions::default(),
        Progress::disabled(),
    );

    let mut progress = Progress::disabled();
    let loud = {
        let scope = progress.scoped();
        adjacencies(
            &collection,
            AdjacencyKind::Rook,
            AdjacencyOptions::default(),
            *scope,
        )
    };
    assert!(!progress.is_enabled());
    assert_eq!(quiet.pairs(), loud.pairs());
}
