// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier bound for collection keys.

use std::fmt::Debug;
use std::hash::Hash;

/// Anything usable as a stable geometry identifier: integers, labels, and
/// tuples of those.
///
/// `Ord` drives deterministic output ordering and tie-breaking, `Hash`
/// drives lookups, `Send + Sync` lets identifiers cross rayon workers.
pub trait Id: Clone + Eq + Ord + Hash + Debug + Send + Sync {}

impl<T> Id for T where T: Clone + Eq + Ord + Hash + Debug + Send + Sync {}
