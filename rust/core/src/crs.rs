// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinate reference system tags.
//!
//! A [`Crs`] is an opaque label (e.g. `"EPSG:4269"`). No reprojection happens
//! here: the tag only guards against combining layers that live in
//! different reference frames.

use std::fmt;

use crate::error::{Error, Result};

/// Coordinate reference system tag shared by every geometry of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Crs {
    /// CRS name (e.g., "EPSG:32632"). `None` means unspecified.
    name: Option<String>,
}

impl Crs {
    /// Creates a tag with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// Creates the unspecified tag. Two unspecified tags compare equal.
    pub fn unspecified() -> Self {
        Self::default()
    }

    /// Returns the CRS name, if any.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns `true` if no CRS name is set.
    #[inline]
    pub fn is_unspecified(&self) -> bool {
        self.name.is_none()
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => f.write_str(name),
            None => f.write_str("<unspecified>"),
        }
    }
}

/// Fails with [`Error::CoordinateSystemMismatch`] unless both tags are equal.
///
/// Every two-collection operation calls this before doing any work.
pub fn require_same_crs(left: &Crs, right: &Crs) -> Result<()> {
    if left == right {
        Ok(())
    } else {
        Err(Error::CoordinateSystemMismatch {
            left: left.clone(),
            right: right.clone(),
        })
    }
}
