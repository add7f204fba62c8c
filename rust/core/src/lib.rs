// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Areal Core
//!
//! Shared data model for the areal workspace: identifiers, coordinate
//! reference system tags, keyed series and attribute tables, the error
//! taxonomy, non-fatal diagnostics, the progress gate and configuration.
//!
//! Geometry lives in `areal-geometry`; the spatial engines (index,
//! intersections, adjacency, assignment, proration, repair) live in
//! `areal-topology`.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for configuration and diagnostics

pub mod config;
pub mod crs;
pub mod diagnostic;
pub mod error;
pub mod id;
pub mod progress;
pub mod series;
pub mod table;

pub use config::{Aggregate, MissingWeight, Options, DEFAULT_RELATIVE_THRESHOLD};
pub use crs::{require_same_crs, Crs};
pub use diagnostic::Diagnostic;
pub use error::{Error, Result};
pub use id::Id;
pub use progress::{Progress, ProgressScope, Tracked, Tracker};
pub use series::Series;
pub use table::{Column, ColumnValues, Data, Table};
