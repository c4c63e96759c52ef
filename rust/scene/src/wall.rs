// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall solids as planar quads.
//!
//! A wall is a box along its baseline. Its surfaces are the two side faces,
//! one face per interface between compound layers, two end caps, the top and
//! the bottom. A duct passing straight through a three-layer wall therefore
//! hits four faces of the same wall, which is why crossings are deduplicated.

use nalgebra::{Point3, Vector3};

use crate::error::{Error, Result};
use crate::model::Wall;

const LENGTH_EPSILON: f64 = 1e-9;
const LAYER_TOLERANCE: f64 = 1e-6;

/// Role of a face within its wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceKind {
    Side,
    LayerInterface,
    EndCap,
    Top,
    Bottom,
}

/// A planar quad; corners are in boundary order.
#[derive(Debug, Clone, PartialEq)]
pub struct WallFace {
    pub kind: FaceKind,
    pub corners: [Point3<f64>; 4],
}

impl Wall {
    /// Checks that the wall describes a non-empty solid.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidWall {
            id: self.id,
            reason: reason.to_string(),
        };

        let coords = self.start.iter().chain(self.end.iter());
        if coords.chain([&self.height, &self.thickness]).any(|v| !v.is_finite()) {
            return Err(invalid("non-finite dimension"));
        }
        if (self.start[2] - self.end[2]).abs() > LAYER_TOLERANCE {
            return Err(invalid("baseline is not horizontal"));
        }
        if self.baseline().norm() < LENGTH_EPSILON {
            return Err(invalid("zero-length baseline"));
        }
        if self.height <= 0.0 {
            return Err(invalid("height must be positive"));
        }
        if self.thickness <= 0.0 {
            return Err(invalid("thickness must be positive"));
        }
        if !self.layers.is_empty() {
            if self.layers.iter().any(|t| !t.is_finite() || *t <= 0.0) {
                return Err(invalid("layer thickness must be positive"));
            }
            let total: f64 = self.layers.iter().sum();
            if (total - self.thickness).abs() > LAYER_TOLERANCE * self.thickness.max(1.0) {
                return Err(invalid("layers do not add up to the wall thickness"));
            }
        }
        Ok(())
    }

    fn baseline(&self) -> Vector3<f64> {
        Vector3::new(self.end[0] - self.start[0], self.end[1] - self.start[1], 0.0)
    }

    /// Offsets of every face parallel to the baseline, left to right.
    fn side_offsets(&self) -> Vec<f64> {
        let half = self.thickness / 2.0;
        let mut offsets = vec![-half];
        if self.layers.len() > 1 {
            let mut acc = -half;
            for layer in &self.layers[..self.layers.len() - 1] {
                acc += layer;
                offsets.push(acc);
            }
        }
        offsets.push(half);
        offsets
    }

    /// Builds every face of the wall solid.
    pub fn faces(&self) -> Result<Vec<WallFace>> {
        self.validate()?;

        let start = Point3::from(self.start);
        let end = Point3::new(self.end[0], self.end[1], self.start[2]);
        let along = self.baseline().normalize();
        // left-hand normal in plan
        let normal = Vector3::new(-along.y, along.x, 0.0);
        let up = Vector3::z() * self.height;
        let half = self.thickness / 2.0;

        let offsets = self.side_offsets();
        let last = offsets.len() - 1;
        let mut faces = Vec::with_capacity(offsets.len() + 4);

        for (i, offset) in offsets.iter().enumerate() {
            let shift = normal * *offset;
            let kind = if i == 0 || i == last {
                FaceKind::Side
            } else {
                FaceKind::LayerInterface
            };
            faces.push(WallFace {
                kind,
                corners: [start + shift, end + shift, end + shift + up, start + shift + up],
            });
        }

        let (sl, sr) = (start - normal * half, start + normal * half);
        let (el, er) = (end - normal * half, end + normal * half);

        faces.push(WallFace {
            kind: FaceKind::EndCap,
            corners: [sl, sr, sr + up, sl + up],
        });
        faces.push(WallFace {
            kind: FaceKind::EndCap,
            corners: [el, er, er + up, el + up],
        });
        faces.push(WallFace {
            kind: FaceKind::Bottom,
            corners: [sl, el, er, sr],
        });
        faces.push(WallFace {
            kind: FaceKind::Top,
            corners: [sl + up, el + up, er + up, sr + up],
        });

        Ok(faces)
    }
}
