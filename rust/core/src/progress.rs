// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Progress gate for long index-build and enumeration loops.
//!
//! [`Progress`] is a plain value passed to every long-running operation. When
//! enabled, tracked loops emit `tracing` events at 10% steps; when disabled,
//! ticking is a single branch. It never alters results.
//!
//! ```rust
//! use areal_core::Progress;
//!
//! let mut progress = Progress::disabled();
//! {
//!     let scoped = progress.scoped();
//!     assert!(scoped.is_enabled());
//! }
//! assert!(!progress.is_enabled());
//! ```

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Number of reports emitted over a full loop.
const REPORT_STEPS: usize = 10;

/// Whether long loops report progress. Off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Progress {
    enabled: bool,
}

impl Progress {
    pub const fn disabled() -> Self {
        Self { enabled: false }
    }

    pub const fn enabled() -> Self {
        Self { enabled: true }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Enables progress until the returned guard is dropped, then restores
    /// the previous setting. Guards nest, and the restore also happens while
    /// unwinding.
    pub fn scoped(&mut self) -> ProgressScope<'_> {
        let previous = self.enabled;
        self.enabled = true;
        ProgressScope {
            slot: self,
            previous,
        }
    }

    /// Creates a counter for a loop of `total` steps.
    pub fn tracker(&self, label: &'static str, total: usize) -> Tracker {
        Tracker {
            label,
            total,
            enabled: self.enabled,
            done: AtomicUsize::new(0),
        }
    }

    /// Wraps an iterator so that every yielded item counts as one step.
    pub fn track<I: Iterator>(&self, iter: I, total: usize, label: &'static str) -> Tracked<I> {
        Tracked {
            inner: iter,
            tracker: self.tracker(label, total),
        }
    }
}

/// Guard returned by [`Progress::scoped`].
#[derive(Debug)]
pub struct ProgressScope<'a> {
    slot: &'a mut Progress,
    previous: bool,
}

impl Deref for ProgressScope<'_> {
    type Target = Progress;

    fn deref(&self) -> &Progress {
        self.slot
    }
}

impl DerefMut for ProgressScope<'_> {
    fn deref_mut(&mut self) -> &mut Progress {
        self.slot
    }
}

impl Drop for ProgressScope<'_> {
    fn drop(&mut self) {
        self.slot.enabled = self.previous;
    }
}

/// Thread-safe step counter. `tick` may be called from rayon workers.
#[derive(Debug)]
pub struct Tracker {
    label: &'static str,
    total: usize,
    enabled: bool,
    done: AtomicUsize,
}

impl Tracker {
    /// Records one finished step, reporting at every 10% boundary.
    pub fn tick(&self) {
        if !self.enabled {
            return;
        }
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        let step = (self.total / REPORT_STEPS).max(1);
        if done % step == 0 || done == self.total {
            let percent = if self.total == 0 {
                100.0
            } else {
                done as f64 * 100.0 / self.total as f64
            };
            tracing::info!(
                label = self.label,
                done,
                total = self.total,
                percent = (percent * 10.0).round() / 10.0,
                "progress"
            );
        }
    }

    /// Steps recorded so far (always 0 when disabled).
    pub fn done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }
}

/// A clone starts from the steps recorded so far and counts on its own.
impl Clone for Tracker {
    fn clone(&self) -> Self {
        Self {
            label: self.label,
            total: self.total,
            enabled: self.enabled,
            done: AtomicUsize::new(self.done()),
        }
    }
}

/// Iterator adapter returned by [`Progress::track`].
#[derive(Debug, Clone)]
pub struct Tracked<I> {
    inner: I,
    tracker: Tracker,
}

impl<I> Tracked<I> {
    /// The step counter behind this iterator.
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }
}

impl<I: Iterator> Iterator for Tracked<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        let item = self.inner.next()?;
        self.tracker.tick();
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
