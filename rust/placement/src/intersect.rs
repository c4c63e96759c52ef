// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ray queries against barrier surfaces.
//!
//! A [`SurfaceIntersector`] only knows the infinite forward ray. Cutting the
//! result down to a segment is the caller's job, done by [`hits_within`]
//! right after the query.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::ids::BarrierRef;
use crate::segment::{Direction, LinearElement};

/// Opaque handle back to the hit face, used to host the opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceHandle(u64);

impl SurfaceHandle {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// One intersection candidate returned by a ray query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawHit {
    pub barrier: BarrierRef,
    /// Distance from the ray origin along its direction.
    pub proximity: f64,
    pub surface: SurfaceHandle,
}

/// Spatial query over the barrier surfaces of one 3D view.
pub trait SurfaceIntersector {
    /// Returns every surface hit by the ray from `origin` along `direction`,
    /// in discovery order.
    fn find_intersections(&self, origin: &Point3<f64>, direction: &Direction) -> Vec<RawHit>;
}

impl<T: SurfaceIntersector + ?Sized> SurfaceIntersector for &T {
    fn find_intersections(&self, origin: &Point3<f64>, direction: &Direction) -> Vec<RawHit> {
        (**self).find_intersections(origin, direction)
    }
}

impl<T: SurfaceIntersector + ?Sized> SurfaceIntersector for Box<T> {
    fn find_intersections(&self, origin: &Point3<f64>, direction: &Direction) -> Vec<RawHit> {
        (**self).find_intersections(origin, direction)
    }
}

/// Keeps hits with `0 <= proximity <= length`, preserving order.
pub fn hits_within(hits: Vec<RawHit>, length: f64) -> Vec<RawHit> {
    hits.into_iter()
        .filter(|hit| (0.0..=length).contains(&hit.proximity))
        .collect()
}

/// Casts a segment's ray and drops hits beyond its end.
///
/// Returns the hits on the segment together with the raw hit count.
pub fn cast_segment(
    intersector: &dyn SurfaceIntersector,
    segment: &LinearElement,
) -> (Vec<RawHit>, usize) {
    let hits = intersector.find_intersections(segment.origin(), segment.direction());
    let raw = hits.len();
    (hits_within(hits, segment.length()), raw)
}
