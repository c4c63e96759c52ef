// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Segment extraction: MEP element → directed centerline segment.

use std::fmt;

use nalgebra::{Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ids::ElementId;

/// Unit direction vector.
pub type Direction = Unit<Vector3<f64>>;

/// Paths shorter than this have no usable direction.
pub const MIN_SEGMENT_LENGTH: f64 = 1e-9;

/// The two supported MEP element streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MepKind {
    Duct,
    Pipe,
}

impl MepKind {
    /// Both streams in processing order.
    pub const ALL: [MepKind; 2] = [MepKind::Duct, MepKind::Pipe];

    pub fn as_str(&self) -> &'static str {
        match self {
            MepKind::Duct => "duct",
            MepKind::Pipe => "pipe",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            MepKind::Duct => "ducts",
            MepKind::Pipe => "pipes",
        }
    }
}

impl fmt::Display for MepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location curve of an MEP element.
#[derive(Debug, Clone, PartialEq)]
pub enum MepPath {
    /// A straight segment from `start` to `end`.
    Line { start: Point3<f64>, end: Point3<f64> },
    /// A circular arc through `start` and `end` around `center`.
    Arc {
        start: Point3<f64>,
        end: Point3<f64>,
        center: Point3<f64>,
    },
    /// A chain of straight segments.
    Polyline(Vec<Point3<f64>>),
}

impl MepPath {
    pub fn kind_name(&self) -> &'static str {
        match self {
            MepPath::Line { .. } => "line",
            MepPath::Arc { .. } => "arc",
            MepPath::Polyline(_) => "polyline",
        }
    }
}

/// An MEP element as enumerated from the systems document.
#[derive(Debug, Clone, PartialEq)]
pub struct MepElement {
    pub id: ElementId,
    pub kind: MepKind,
    pub path: MepPath,
    /// Nominal round diameter; `None` for elements without a round section.
    pub diameter: Option<f64>,
}

/// A straight MEP centerline ready for ray casting.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearElement {
    id: ElementId,
    kind: MepKind,
    origin: Point3<f64>,
    direction: Direction,
    length: f64,
    bore_diameter: f64,
}

impl LinearElement {
    /// Extracts the directed segment of a straight MEP element.
    ///
    /// The origin is the path's start point. Arcs and polylines are rejected
    /// rather than approximated.
    pub fn extract(element: &MepElement) -> Result<Self> {
        let (start, end) = match &element.path {
            MepPath::Line { start, end } => (*start, *end),
            other => {
                return Err(Error::NonLinearPath {
                    element: element.id,
                    path: other.kind_name(),
                })
            }
        };

        let run = end - start;
        let length = run.norm();
        if !length.is_finite() || length < MIN_SEGMENT_LENGTH {
            return Err(Error::DegeneratePath(element.id));
        }

        let bore_diameter = match element.diameter {
            Some(d) if d.is_finite() && d > 0.0 => d,
            _ => return Err(Error::MissingDiameter(element.id)),
        };

        Ok(Self {
            id: element.id,
            kind: element.kind,
            origin: start,
            direction: Unit::new_normalize(run),
            length,
            bore_diameter,
        })
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> MepKind {
        self.kind
    }

    pub fn origin(&self) -> &Point3<f64> {
        &self.origin
    }

    pub fn direction(&self) -> &Direction {
        &self.direction
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn bore_diameter(&self) -> f64 {
        self.bore_diameter
    }

    /// Point at `proximity` along the segment: `origin + direction * proximity`.
    pub fn point_at(&self, proximity: f64) -> Point3<f64> {
        self.origin + self.direction.into_inner() * proximity
    }

    /// Whether `proximity` lies on the segment (`0 <= proximity <= length`).
    pub fn contains_proximity(&self, proximity: f64) -> bool {
        (0.0..=self.length).contains(&proximity)
    }
}
