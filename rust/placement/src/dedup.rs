// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Crossing deduplication.
//!
//! A ray can register several hits against the same wall: one per face of a
//! compound wall's layers, or the same wall reached twice through a link.
//! Hits are grouped by [`BarrierRef`] and the first one seen is kept.

use rustc_hash::FxHashSet;

use crate::ids::BarrierRef;
use crate::intersect::{RawHit, SurfaceHandle};

/// The hit retained for one distinct barrier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniqueCrossing(RawHit);

impl UniqueCrossing {
    pub fn barrier(&self) -> BarrierRef {
        self.0.barrier
    }

    pub fn proximity(&self) -> f64 {
        self.0.proximity
    }

    pub fn surface(&self) -> SurfaceHandle {
        self.0.surface
    }

    pub fn hit(&self) -> &RawHit {
        &self.0
    }
}

impl From<UniqueCrossing> for RawHit {
    fn from(crossing: UniqueCrossing) -> Self {
        crossing.0
    }
}

/// Keeps the first hit per distinct barrier, in first-seen order.
pub fn dedup_crossings<I>(hits: I) -> Vec<UniqueCrossing>
where
    I: IntoIterator<Item = RawHit>,
{
    let mut seen: FxHashSet<BarrierRef> = FxHashSet::default();
    hits.into_iter()
        .filter(|hit| seen.insert(hit.barrier))
        .map(UniqueCrossing)
        .collect()
}
