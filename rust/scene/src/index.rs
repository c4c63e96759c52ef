// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grid spatial index over barrier faces with ray queries.
//!
//! Faces live in a [`SlotMap`]; their keys double as [`SurfaceHandle`]s. The
//! grid divides space into cubic cells of side `cell_size` and stores, per
//! cell, the faces whose bounding box overlaps it. A ray query clips the ray
//! to the index bounds and walks the cells it passes through (3D DDA), testing
//! each candidate face once.

use nalgebra::{Point3, Vector3};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{new_key_type, Key, KeyData, SlotMap};
use smallvec::SmallVec;
use sleeve_placement::{BarrierRef, Direction, RawHit, SurfaceHandle, SurfaceIntersector};

use crate::wall::{FaceKind, WallFace};

new_key_type! {
    /// Key for an indexed barrier face.
    pub struct FaceKey;
}

/// Cells per axis targeted by [`SurfaceIndex::build`].
const TARGET_CELLS: f64 = 32.0;
/// Smallest cell side produced by [`SurfaceIndex::build`].
const MIN_CELL_SIZE: f64 = 0.25;
const PARALLEL_EPSILON: f64 = 1e-12;
/// Slack around face boxes so a face on a grid line lands in both cells.
const GRID_PAD: f64 = 1e-9;

type Cell = (i64, i64, i64);

/// A barrier face stored in the index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedFace {
    pub barrier: BarrierRef,
    pub kind: FaceKind,
    pub corners: [Point3<f64>; 4],
}

impl IndexedFace {
    pub fn new(barrier: BarrierRef, face: WallFace) -> Self {
        Self {
            barrier,
            kind: face.kind,
            corners: face.corners,
        }
    }

    fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        let mut min = self.corners[0];
        let mut max = self.corners[0];
        for c in &self.corners[1..] {
            min = min.inf(c);
            max = max.sup(c);
        }
        (min, max)
    }

    fn padded_bounds(&self) -> (Point3<f64>, Point3<f64>) {
        let (min, max) = self.bounds();
        let pad = Vector3::repeat(GRID_PAD);
        (min - pad, max + pad)
    }

    /// Distance along the ray to this face, split into two triangles.
    fn intersect(&self, origin: &Point3<f64>, dir: &Vector3<f64>) -> Option<f64> {
        let [a, b, c, d] = &self.corners;
        ray_triangle(origin, dir, a, b, c).or_else(|| ray_triangle(origin, dir, a, c, d))
    }
}

/// Möller–Trumbore ray-triangle intersection.
///
/// Returns the ray parameter `t >= 0` of the hit point.
fn ray_triangle(
    origin: &Point3<f64>,
    dir: &Vector3<f64>,
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
) -> Option<f64> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = dir.cross(&edge2);
    let a = edge1.dot(&h);
    if a.abs() < PARALLEL_EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * dir.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(&q);
    (t >= 0.0).then_some(t)
}

/// Uniform-grid index of barrier faces.
#[derive(Debug)]
pub struct SurfaceIndex {
    faces: SlotMap<FaceKey, IndexedFace>,
    grid: FxHashMap<Cell, SmallVec<[FaceKey; 4]>>,
    cell_size: f64,
    bounds: Option<(Point3<f64>, Point3<f64>)>,
}

impl SurfaceIndex {
    /// Creates an empty index with the given cell size.
    pub fn new(cell_size: f64) -> Self {
        Self {
            faces: SlotMap::with_key(),
            grid: FxHashMap::default(),
            cell_size,
            bounds: None,
        }
    }

    /// Builds an index with a cell size derived from the faces' extent.
    pub fn build(faces: Vec<IndexedFace>) -> Self {
        let extent = faces
            .iter()
            .map(IndexedFace::bounds)
            .reduce(|(lo, hi), (l, h)| (lo.inf(&l), hi.sup(&h)))
            .map(|(lo, hi)| (hi - lo).max())
            .unwrap_or(0.0);
        let cell_size = (extent / TARGET_CELLS).max(MIN_CELL_SIZE);

        let mut index = Self::new(cell_size);
        for face in faces {
            index.insert(face);
        }
        index
    }

    /// Inserts a face into every cell its padded bounding box overlaps.
    pub fn insert(&mut self, face: IndexedFace) -> FaceKey {
        let (min, max) = face.padded_bounds();
        self.bounds = Some(match self.bounds {
            Some((lo, hi)) => (lo.inf(&min), hi.sup(&max)),
            None => (min, max),
        });

        let key = self.faces.insert(face);
        let (lo, hi) = (self.cell_of(&min), self.cell_of(&max));
        for x in lo.0..=hi.0 {
            for y in lo.1..=hi.1 {
                for z in lo.2..=hi.2 {
                    self.grid.entry((x, y, z)).or_default().push(key);
                }
            }
        }
        key
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Looks up a face by the handle reported in a hit.
    pub fn face(&self, handle: SurfaceHandle) -> Option<&IndexedFace> {
        self.faces.get(FaceKey::from(KeyData::from_ffi(handle.raw())))
    }

    fn handle(key: FaceKey) -> SurfaceHandle {
        SurfaceHandle::from_raw(key.data().as_ffi())
    }

    fn cell_of(&self, p: &Point3<f64>) -> Cell {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
            (p.z / self.cell_size).floor() as i64,
        )
    }

    /// Parameter range in which the ray is inside the index bounds.
    fn clip(&self, origin: &Point3<f64>, dir: &Vector3<f64>) -> Option<(f64, f64)> {
        let (min, max) = self.bounds?;
        let mut t_enter = 0.0_f64;
        let mut t_exit = f64::INFINITY;

        for axis in 0..3 {
            if dir[axis].abs() < PARALLEL_EPSILON {
                if origin[axis] < min[axis] || origin[axis] > max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir[axis];
            let mut t0 = (min[axis] - origin[axis]) * inv;
            let mut t1 = (max[axis] - origin[axis]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }
        Some((t_enter, t_exit))
    }

    /// Cells pierced by the ray inside the index bounds, in ray order.
    ///
    /// The bounds are the union of padded face boxes, so faces on the outer
    /// planes sit strictly inside them and the walk always reaches their
    /// cells.
    fn traverse(&self, origin: &Point3<f64>, dir: &Vector3<f64>) -> Vec<Cell> {
        let Some((t_enter, t_exit)) = self.clip(origin, dir) else {
            return Vec::new();
        };
        let Some((min, max)) = self.bounds else {
            return Vec::new();
        };
        let (lo, hi) = (self.cell_of(&min), self.cell_of(&max));

        let entry = origin + dir * t_enter;
        let mut cell = self.cell_of(&entry);
        let mut current = [cell.0, cell.1, cell.2];
        let bounds_lo = [lo.0, lo.1, lo.2];
        let bounds_hi = [hi.0, hi.1, hi.2];
        for axis in 0..3 {
            current[axis] = current[axis].clamp(bounds_lo[axis], bounds_hi[axis]);
        }

        let mut step = [0_i64; 3];
        let mut t_max = [f64::INFINITY; 3];
        let mut t_delta = [f64::INFINITY; 3];
        for axis in 0..3 {
            if dir[axis].abs() < PARALLEL_EPSILON {
                continue;
            }
            let inv = 1.0 / dir[axis];
            step[axis] = if dir[axis] > 0.0 { 1 } else { -1 };
            let boundary = if dir[axis] > 0.0 {
                (current[axis] + 1) as f64 * self.cell_size
            } else {
                current[axis] as f64 * self.cell_size
            };
            t_max[axis] = (boundary - origin[axis]) * inv;
            t_delta[axis] = self.cell_size * inv.abs();
        }

        let mut cells = Vec::new();
        loop {
            cell = (current[0], current[1], current[2]);
            cells.push(cell);

            let axis = if t_max[0] <= t_max[1] && t_max[0] <= t_max[2] {
                0
            } else if t_max[1] <= t_max[2] {
                1
            } else {
                2
            };
            if t_max[axis] > t_exit + GRID_PAD || step[axis] == 0 {
                break;
            }
            current[axis] += step[axis];
            if current[axis] < bounds_lo[axis] || current[axis] > bounds_hi[axis] {
                break;
            }
            t_max[axis] += t_delta[axis];
        }
        cells
    }

    /// All faces hit by the forward ray, nearest first.
    pub fn cast(&self, origin: &Point3<f64>, direction: &Direction) -> Vec<RawHit> {
        let dir = direction.into_inner();
        let mut visited: FxHashSet<FaceKey> = FxHashSet::default();
        let mut hits = Vec::new();

        for cell in self.traverse(origin, &dir) {
            let Some(keys) = self.grid.get(&cell) else {
                continue;
            };
            for &key in keys {
                if !visited.insert(key) {
                    continue;
                }
                let Some(face) = self.faces.get(key) else {
                    continue;
                };
                if let Some(t) = face.intersect(origin, &dir) {
                    hits.push(RawHit {
                        barrier: face.barrier,
                        proximity: t,
                        surface: Self::handle(key),
                    });
                }
            }
        }

        // Cells are visited in ray order but faces within a cell are not.
        hits.sort_by(|a, b| a.proximity.total_cmp(&b.proximity));
        hits
    }
}

impl SurfaceIntersector for SurfaceIndex {
    fn find_intersections(&self, origin: &Point3<f64>, direction: &Direction) -> Vec<RawHit> {
        self.cast(origin, direction)
    }
}
