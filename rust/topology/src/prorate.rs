// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Proration engine
//!
//! Redistributes numeric attributes across a relationship by weight:
//!
//! ```text
//! disaggregated[row] = data[key(row)] * weight[row]
//! ```
//!
//! Two-level relationships (intersections) then re-aggregate the rows onto
//! their targets. One-level relationships (assignments) keep one value per
//! row.

use std::collections::BTreeMap;

use areal_core::{Aggregate, Data, Error, Id, MissingWeight, Result, Series, Table};

use crate::assign::Assignment;
use crate::intersect::IntersectionRelation;

/// One row of a relationship: its weight key, the data key it reads, and
/// the output key it contributes to.
pub type RelationshipRow<R, K, O> = (R, Option<K>, O);

/// Something data can be prorated across.
pub trait Relationship {
    /// Index of the weight series.
    type Row: Id;
    /// Index of the input data.
    type Key: Id;
    /// Index of the output data.
    type Output: Id;

    /// Whether rows sharing an output key are re-aggregated.
    const AGGREGATES: bool;

    /// Every row, in relationship order.
    fn rows(&self) -> Vec<RelationshipRow<Self::Row, Self::Key, Self::Output>>;
}

/// Source data spread over `(source, target)` pieces, gathered by target.
impl<S: Id, T: Id> Relationship for IntersectionRelation<S, T> {
    type Row = (S, T);
    type Key = S;
    type Output = T;

    const AGGREGATES: bool = true;

    fn rows(&self) -> Vec<RelationshipRow<(S, T), S, T>> {
        self.keys()
            .map(|(s, t)| ((s.clone(), t.clone()), Some(s.clone()), t.clone()))
            .collect()
    }
}

/// Target data pushed down to the sources assigned to each target.
impl<S: Id, T: Id> Relationship for Assignment<S, T> {
    type Row = S;
    type Key = T;
    type Output = S;

    const AGGREGATES: bool = false;

    fn rows(&self) -> Vec<RelationshipRow<S, T, S>> {
        self.iter()
            .map(|(s, t)| (s.clone(), t.cloned(), s.clone()))
            .collect()
    }
}

/// Prorates `data` across `relationship` using `weights`.
///
/// A row whose data key is missing (or an unassigned source) yields NaN. A
/// row without a weight fails with [`Error::MissingWeight`] or counts as 0,
/// depending on `missing_weight`. Table columns must all be numeric;
/// otherwise the call fails with [`Error::UnsupportedDataShape`] before any
/// computation.
pub fn prorate<R: Relationship>(
    relationship: &R,
    data: &Data<R::Key>,
    weights: &Series<R::Row>,
    aggregate: Aggregate,
    missing_weight: MissingWeight,
) -> Result<Data<R::Output>> {
    let columns = data.numeric_columns()?;
    let rows = relationship.rows();

    let mut row_weights = Vec::with_capacity(rows.len());
    let mut missing = 0usize;
    for (row, _, _) in &rows {
        match (weights.get(row), missing_weight) {
            (Some(&weight), _) => row_weights.push(weight),
            (None, MissingWeight::Zero) => {
                missing += 1;
                row_weights.push(0.0);
            }
            (None, MissingWeight::Error) => {
                return Err(Error::MissingWeight(format!(
                    "no weight for relationship row {row:?}"
                )));
            }
        }
    }
    if missing > 0 {
        tracing::debug!(missing, "rows without a weight counted as zero");
    }

    let output_index: Vec<R::Output> = if R::AGGREGATES {
        let mut outputs: Vec<R::Output> = rows.iter().map(|(_, _, o)| o.clone()).collect();
        outputs.sort();
        outputs.dedup();
        outputs
    } else {
        rows.iter().map(|(_, _, o)| o.clone()).collect()
    };

    let prorate_column = |values: &Series<R::Key>| -> Series<R::Output> {
        let disaggregated = rows.iter().zip(&row_weights).map(|((_, key, output), weight)| {
            let value = key
                .as_ref()
                .and_then(|k| values.get(k))
                .map_or(f64::NAN, |v| v * weight);
            (output, value)
        });

        if R::AGGREGATES {
            let mut groups: BTreeMap<&R::Output, Vec<f64>> = BTreeMap::new();
            for (output, value) in disaggregated {
                groups.entry(output).or_default().push(value);
            }
            groups
                .into_iter()
                .map(|(output, group)| (output.clone(), aggregate.apply(&group)))
                .collect()
        } else {
            disaggregated
                .map(|(output, value)| (output.clone(), value))
                .collect()
        }
    };

    let result = match data {
        Data::Series(values) => Data::Series(prorate_column(values)),
        Data::Table(_) => {
            let prorated = columns
                .iter()
                .map(|(name, values)| (name.clone(), prorate_column(values)))
                .collect();
            Data::Table(Table::from_series(output_index, prorated)?)
        }
    };

    tracing::debug!(
        rows = rows.len(),
        columns = columns.len(),
        aggregate = aggregate.as_str(),
        "prorated data"
    );
    Ok(result)
}

/// Normalizes pair-indexed weights so each group sums to 1.
///
/// `level` 0 groups by the first element of the key, 1 by the second. Groups
/// summing to zero produce zeros instead of NaN. Any other level fails with
/// [`Error::InvalidArgument`].
pub fn normalize<A: Id, B: Id>(weights: &Series<(A, B)>, level: usize) -> Result<Series<(A, B)>> {
    match level {
        0 => Ok(normalize_by(weights, |(a, _)| a.clone())),
        1 => Ok(normalize_by(weights, |(_, b)| b.clone())),
        other => Err(Error::InvalidArgument(format!(
            "level must be 0 or 1 for pair-indexed weights (got {other})"
        ))),
    }
}

fn normalize_by<A: Id, B: Id, G: Id>(
    weights: &Series<(A, B)>,
    group: impl Fn(&(A, B)) -> G,
) -> Series<(A, B)> {
    let totals: BTreeMap<G, f64> = weights
        .group_by(&group)
        .into_iter()
        .map(|(key, values)| (key, values.iter().sum()))
        .collect();
    weights.map(|key, &weight| {
        let normalized = weight / totals[&group(key)];
        if normalized.is_nan() {
            0.0
        } else {
            normalized
        }
    })
}
