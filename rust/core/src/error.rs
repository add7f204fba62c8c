// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types shared by every areal crate.

use crate::crs::Crs;

/// Result type alias for areal operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal conditions. Each one aborts the operation before any partial
/// result is produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Two collections carry different coordinate reference systems.
    #[error("the source and target geometries must have the same CRS: {left} vs {right}")]
    CoordinateSystemMismatch { left: Crs, right: Crs },

    /// An enum-like parameter had an unrecognised value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Proration data is neither a numeric series nor a numeric table.
    #[error("unsupported data shape: {0}")]
    UnsupportedDataShape(String),

    /// Absorption was requested with sources but without any target.
    #[error("targets must be nonempty to absorb sources")]
    NoAbsorptionTarget,

    /// A relationship row has no weight and the policy forbids defaulting.
    #[error("missing weight for relationship row {0}")]
    MissingWeight(String),

    /// An identifier appeared twice where identifiers must be unique.
    #[error("duplicate identifier: {0}")]
    DuplicateId(String),
}
