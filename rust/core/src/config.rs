// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operation defaults, optionally loaded from environment variables.
//!
//! Library functions take their knobs as explicit parameters. [`Options`]
//! bundles those knobs for the outermost caller.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::progress::Progress;

/// Default relative size threshold for gap and overlap repair.
pub const DEFAULT_RELATIVE_THRESHOLD: f64 = 0.1;

/// How prorated values are re-aggregated onto targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Aggregate {
    #[default]
    Sum,
    Mean,
    Max,
    Min,
}

impl Aggregate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregate::Sum => "sum",
            Aggregate::Mean => "mean",
            Aggregate::Max => "max",
            Aggregate::Min => "min",
        }
    }

    /// Reduces a group of values. NaN values are skipped; a group with no
    /// remaining values sums to 0 and is NaN for every other reduction.
    pub fn apply(&self, values: &[f64]) -> f64 {
        let mut present = values.iter().copied().filter(|v| !v.is_nan()).peekable();
        if present.peek().is_none() {
            return match self {
                Aggregate::Sum => 0.0,
                _ => f64::NAN,
            };
        }
        match self {
            Aggregate::Sum => present.sum(),
            Aggregate::Mean => {
                let (sum, count) = present.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
                sum / count as f64
            }
            Aggregate::Max => present.fold(f64::NEG_INFINITY, f64::max),
            Aggregate::Min => present.fold(f64::INFINITY, f64::min),
        }
    }
}

impl FromStr for Aggregate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(Aggregate::Sum),
            "mean" => Ok(Aggregate::Mean),
            "max" => Ok(Aggregate::Max),
            "min" => Ok(Aggregate::Min),
            other => Err(Error::InvalidArgument(format!(
                "aggregate must be one of sum, mean, max, min (got \"{other}\")"
            ))),
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What proration does with a relationship row that has no weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MissingWeight {
    /// Fail with [`Error::MissingWeight`].
    #[default]
    Error,
    /// Treat the row's weight as 0.
    Zero,
}

impl FromStr for MissingWeight {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(MissingWeight::Error),
            "zero" => Ok(MissingWeight::Zero),
            other => Err(Error::InvalidArgument(format!(
                "missing-weight policy must be \"error\" or \"zero\" (got \"{other}\")"
            ))),
        }
    }
}

/// Defaults for the outermost caller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Options {
    /// Report progress of long loops.
    pub progress: Progress,
    /// Relative size threshold for repair. `None` repairs every defect.
    pub relative_threshold: Option<f64>,
    /// Re-aggregation used by proration.
    pub aggregate: Aggregate,
    /// Policy for relationship rows without a weight.
    pub missing_weight: MissingWeight,
}

impl Options {
    /// Load options from environment variables, falling back to the
    /// defaults for anything absent or unparseable.
    ///
    /// - `AREAL_PROGRESS`: `1`/`true`/`on` to enable progress events
    /// - `AREAL_RELATIVE_THRESHOLD`: a float, or `none`
    /// - `AREAL_AGGREGATE`: `sum`, `mean`, `max` or `min`
    /// - `AREAL_MISSING_WEIGHT`: `error` or `zero`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Options::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let progress = lookup("AREAL_PROGRESS")
            .and_then(|v| parse_flag(&v))
            .map(|enabled| {
                let mut progress = Progress::disabled();
                progress.set_enabled(enabled);
                progress
            })
            .unwrap_or(defaults.progress);

        let relative_threshold = match lookup("AREAL_RELATIVE_THRESHOLD") {
            Some(v) if v.trim().eq_ignore_ascii_case("none") => None,
            Some(v) => v
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|t| t.is_finite() && *t >= 0.0)
                .map(Some)
                .unwrap_or(defaults.relative_threshold),
            None => defaults.relative_threshold,
        };

        let aggregate = lookup("AREAL_AGGREGATE")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.aggregate);

        let missing_weight = lookup("AREAL_MISSING_WEIGHT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.missing_weight);

        Self {
            progress,
            relative_threshold,
            aggregate,
            missing_weight,
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            progress: Progress::disabled(),
            relative_threshold: Some(DEFAULT_RELATIVE_THRESHOLD),
            aggregate: Aggregate::Sum,
            missing_weight: MissingWeight::Error,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
