// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serializable document model.
//!
//! Points are stored as `[x, y, z]` arrays so session files stay readable
//! and portable; conversion to nalgebra types happens at the edges.

use std::collections::BTreeMap;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use sleeve_placement::{
    BarrierRef, ElementId, LevelId, MepElement, MepKind, MepPath, OpeningHandle, SurfaceHandle,
    TemplateId, ViewId,
};

/// One open document: the host (architecture) model or a systems model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    #[serde(default)]
    pub levels: Vec<Level>,
    #[serde(default)]
    pub walls: Vec<Wall>,
    #[serde(default)]
    pub views: Vec<View3d>,
    #[serde(default)]
    pub templates: Vec<OpeningTemplate>,
    #[serde(default)]
    pub links: Vec<LinkInstance>,
    #[serde(default)]
    pub ducts: Vec<MepCurve>,
    #[serde(default)]
    pub pipes: Vec<MepCurve>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub openings: Vec<Opening>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn level(&self, id: LevelId) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    pub fn template(&self, id: TemplateId) -> Option<&OpeningTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn curves(&self, kind: MepKind) -> &[MepCurve] {
        match kind {
            MepKind::Duct => &self.ducts,
            MepKind::Pipe => &self.pipes,
        }
    }

    /// Largest id used by any element, level, view, template or opening.
    pub fn max_id(&self) -> u64 {
        let elements = self
            .walls
            .iter()
            .map(|w| w.id.0)
            .chain(self.links.iter().map(|l| l.id.0))
            .chain(self.ducts.iter().map(|c| c.id.0))
            .chain(self.pipes.iter().map(|c| c.id.0));
        let others = self
            .levels
            .iter()
            .map(|l| l.id.0)
            .chain(self.views.iter().map(|v| v.id.0))
            .chain(self.templates.iter().map(|t| t.id.0))
            .chain(self.openings.iter().map(|o| o.id.0));
        elements.chain(others).max().unwrap_or(0)
    }
}

/// A horizontal reference level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    pub name: String,
    pub elevation: f64,
}

/// A straight wall: a rectangular solid along its baseline.
///
/// The baseline runs from `start` to `end` at the base elevation `start[2]`;
/// the solid extends `thickness / 2` to either side and `height` upwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: ElementId,
    #[serde(default)]
    pub name: String,
    /// Base level association.
    pub level: Option<LevelId>,
    pub start: [f64; 3],
    pub end: [f64; 3],
    pub height: f64,
    pub thickness: f64,
    /// Compound layer thicknesses from the left side of the baseline.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<f64>,
}

/// A 3D view. Hidden ids may name host walls or whole link instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View3d {
    pub id: ViewId,
    pub name: String,
    #[serde(default)]
    pub is_template: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden: Vec<ElementId>,
}

impl View3d {
    pub fn is_hidden(&self, id: ElementId) -> bool {
        self.hidden.contains(&id)
    }
}

/// A loaded opening template. Parameter ids are indices into `parameters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningTemplate {
    pub id: TemplateId,
    pub family: String,
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub active: bool,
}

/// Centerline geometry of a duct or pipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathSnapshot {
    Line {
        start: [f64; 3],
        end: [f64; 3],
    },
    Arc {
        start: [f64; 3],
        end: [f64; 3],
        center: [f64; 3],
    },
    Polyline {
        points: Vec<[f64; 3]>,
    },
}

impl From<&PathSnapshot> for MepPath {
    fn from(path: &PathSnapshot) -> Self {
        match path {
            PathSnapshot::Line { start, end } => MepPath::Line {
                start: Point3::from(*start),
                end: Point3::from(*end),
            },
            PathSnapshot::Arc { start, end, center } => MepPath::Arc {
                start: Point3::from(*start),
                end: Point3::from(*end),
                center: Point3::from(*center),
            },
            PathSnapshot::Polyline { points } => {
                MepPath::Polyline(points.iter().copied().map(Point3::from).collect())
            }
        }
    }
}

/// A duct or pipe; the stream is given by the list it is stored in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MepCurve {
    pub id: ElementId,
    pub path: PathSnapshot,
    /// Round diameter; absent for rectangular or oval sections.
    #[serde(default)]
    pub diameter: Option<f64>,
}

impl MepCurve {
    pub fn to_element(&self, kind: MepKind) -> MepElement {
        MepElement {
            id: self.id,
            kind,
            path: MepPath::from(&self.path),
            diameter: self.diameter,
        }
    }
}

/// Placement of a linked model in host coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkPlacement {
    #[serde(default)]
    pub translation: [f64; 3],
    /// Rotation about the host Z axis, in radians.
    #[serde(default)]
    pub rotation_z: f64,
}

/// A linked (federated) model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkInstance {
    pub id: ElementId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub placement: LinkPlacement,
    pub model: LinkedModel,
}

/// Content of a linked model, in its own coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkedModel {
    pub title: String,
    #[serde(default)]
    pub levels: Vec<Level>,
    #[serde(default)]
    pub walls: Vec<Wall>,
}

/// An opening instance placed in the host document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opening {
    pub id: OpeningHandle,
    pub template: TemplateId,
    pub host: BarrierRef,
    pub surface: SurfaceHandle,
    pub level: LevelId,
    pub point: [f64; 3],
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_parses_with_defaults() {
        let doc: Document = serde_json::from_str(
            r#"{
                "title": "Tower_Systems",
                "ducts": [
                    { "id": 500, "path": { "type": "line", "start": [0, 0, 3], "end": [10, 0, 3] }, "diameter": 0.3 },
                    { "id": 501, "path": { "type": "arc", "start": [0, 0, 0], "end": [2, 0, 0], "center": [1, 1, 0] } }
                ]
            }"#,
        )
        .unwrap();

        assert!(doc.walls.is_empty());
        assert_eq!(doc.ducts.len(), 2);
        assert_eq!(doc.ducts[1].diameter, None);

        let element = doc.ducts[0].to_element(MepKind::Duct);
        assert_eq!(
            element.path,
            MepPath::Line {
                start: Point3::new(0.0, 0.0, 3.0),
                end: Point3::new(10.0, 0.0, 3.0),
            }
        );
        assert_eq!(doc.ducts[1].to_element(MepKind::Duct).path.kind_name(), "arc");
    }

    #[test]
    fn opening_host_serializes_link() {
        let opening = Opening {
            id: OpeningHandle(9),
            template: TemplateId(1),
            host: BarrierRef::linked(ElementId(3), ElementId(77)),
            surface: SurfaceHandle::from_raw(5),
            level: LevelId(2),
            point: [1.0, 2.0, 3.0],
            parameters: BTreeMap::new(),
        };
        let json = serde_json::to_value(&opening).unwrap();
        assert_eq!(json["host"]["link"]["instance"], 3);
        assert_eq!(json["host"]["element"], 77);

        let back: Opening = serde_json::from_value(json).unwrap();
        assert_eq!(back, opening);
    }

    #[test]
    fn max_id_covers_all_collections() {
        let mut doc = Document::new("AR");
        doc.levels.push(Level {
            id: LevelId(4),
            name: "L1".into(),
            elevation: 0.0,
        });
        doc.views.push(View3d {
            id: ViewId(42),
            name: "{3D}".into(),
            is_template: false,
            hidden: Vec::new(),
        });
        assert_eq!(doc.max_id(), 42);
        assert_eq!(Document::new("empty").max_id(), 0);
    }
}
