// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Link placement transforms.
//!
//! A link instance places its model with a rotation about the host Z axis
//! followed by a translation. Rotation about Z leaves elevations untouched,
//! so a linked level maps to host space by adding the translation's Z.

use nalgebra::{Isometry3, Vector3};

use crate::model::LinkPlacement;
use crate::wall::WallFace;

impl LinkPlacement {
    /// The rigid transform from link coordinates to host coordinates.
    pub fn isometry(&self) -> Isometry3<f64> {
        Isometry3::new(Vector3::from(self.translation), Vector3::z() * self.rotation_z)
    }

    /// Host elevation of a linked elevation.
    pub fn host_elevation(&self, linked: f64) -> f64 {
        linked + self.translation[2]
    }
}

impl WallFace {
    /// Returns the face moved by `isometry`.
    pub fn transformed(&self, isometry: &Isometry3<f64>) -> WallFace {
        WallFace {
            kind: self.kind,
            corners: self.corners.map(|c| isometry.transform_point(&c)),
        }
    }
}
