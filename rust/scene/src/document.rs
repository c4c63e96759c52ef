// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only document adapters for the placement pipeline.

use rustc_hash::FxHashMap;
use sleeve_placement::{
    BarrierCatalog, BarrierInfo, BarrierRef, ElementId, Error as PlacementError, HostModel,
    LevelId, LinkId, MepElement, MepKind, MepSource, ParameterId, ParameterInfo,
    Result as PlacementResult, SurfaceIntersector, TemplateInfo, View3dInfo, ViewId,
};
use tracing::{debug, warn};

use crate::index::{IndexedFace, SurfaceIndex};
use crate::model::{Document, LinkInstance, View3d, Wall};

/// Elevation slack when mapping a linked level onto host levels.
const LEVEL_TOLERANCE: f64 = 1e-6;

impl MepSource for Document {
    fn title(&self) -> &str {
        &self.title
    }

    fn mep_elements(&self, kind: MepKind) -> Vec<MepElement> {
        self.curves(kind)
            .iter()
            .map(|curve| curve.to_element(kind))
            .collect()
    }
}

/// The host document with lookup tables for walls and link instances.
#[derive(Debug)]
pub struct HostDocument<'a> {
    doc: &'a Document,
    walls: FxHashMap<ElementId, &'a Wall>,
    links: FxHashMap<ElementId, LinkedWalls<'a>>,
}

#[derive(Debug)]
struct LinkedWalls<'a> {
    instance: &'a LinkInstance,
    walls: FxHashMap<ElementId, &'a Wall>,
}

impl<'a> HostDocument<'a> {
    pub fn new(doc: &'a Document) -> Self {
        let walls = doc.walls.iter().map(|w| (w.id, w)).collect();
        let links = doc
            .links
            .iter()
            .map(|instance| {
                let walls = instance.model.walls.iter().map(|w| (w.id, w)).collect();
                (instance.id, LinkedWalls { instance, walls })
            })
            .collect();
        Self { doc, walls, links }
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// The host level a linked level lands on: the highest host level at or
    /// below its transformed elevation.
    fn host_level_below(&self, elevation: f64) -> Option<LevelId> {
        self.doc
            .levels
            .iter()
            .filter(|l| l.elevation <= elevation + LEVEL_TOLERANCE)
            .max_by(|a, b| a.elevation.total_cmp(&b.elevation))
            .map(|l| l.id)
    }

    fn linked_level(&self, link: &LinkedWalls<'_>, wall: &Wall) -> Option<LevelId> {
        let level = wall.level?;
        let linked = link.instance.model.levels.iter().find(|l| l.id == level)?;
        let elevation = link.instance.placement.host_elevation(linked.elevation);
        self.host_level_below(elevation)
    }

    /// Faces of every barrier visible in `view`, host walls first.
    fn visible_faces(&self, view: &View3d) -> Vec<IndexedFace> {
        let mut faces = Vec::new();

        for wall in &self.doc.walls {
            if view.is_hidden(wall.id) {
                continue;
            }
            push_faces(&mut faces, BarrierRef::host(wall.id), wall, None);
        }

        for link in &self.doc.links {
            if view.is_hidden(link.id) {
                debug!(link = %link.id, "Link hidden in view");
                continue;
            }
            let isometry = link.placement.isometry();
            for wall in &link.model.walls {
                push_faces(
                    &mut faces,
                    BarrierRef::linked(link.id, wall.id),
                    wall,
                    Some(&isometry),
                );
            }
        }

        faces
    }
}

fn push_faces(
    faces: &mut Vec<IndexedFace>,
    barrier: BarrierRef,
    wall: &Wall,
    isometry: Option<&nalgebra::Isometry3<f64>>,
) {
    match wall.faces() {
        Ok(wall_faces) => faces.extend(wall_faces.into_iter().map(|face| {
            let face = match isometry {
                Some(iso) => face.transformed(iso),
                None => face,
            };
            IndexedFace::new(barrier, face)
        })),
        Err(err) => warn!(barrier = %barrier, error = %err, "Skipping wall"),
    }
}

impl BarrierCatalog for HostDocument<'_> {
    fn barrier(&self, barrier: BarrierRef) -> Option<BarrierInfo> {
        let level = match barrier.link {
            LinkId::Host => self.walls.get(&barrier.element)?.level,
            LinkId::Instance(link) => {
                let link = self.links.get(&link)?;
                let wall = link.walls.get(&barrier.element)?;
                self.linked_level(link, wall)
            }
        };
        Some(BarrierInfo { barrier, level })
    }
}

impl HostModel for HostDocument<'_> {
    fn title(&self) -> &str {
        &self.doc.title
    }

    fn views_3d(&self) -> Vec<View3dInfo> {
        self.doc
            .views
            .iter()
            .map(|v| View3dInfo {
                id: v.id,
                name: v.name.clone(),
                is_template: v.is_template,
            })
            .collect()
    }

    fn find_template(&self, family: &str) -> Option<TemplateInfo> {
        let template = self.doc.templates.iter().find(|t| t.family == family)?;
        Some(TemplateInfo {
            id: template.id,
            family: template.family.clone(),
            name: template.name.clone(),
            is_active: template.active,
            parameters: template
                .parameters
                .iter()
                .enumerate()
                .map(|(i, name)| ParameterInfo {
                    id: ParameterId(i as u32),
                    name: name.clone(),
                })
                .collect(),
        })
    }

    fn barrier_count(&self) -> usize {
        self.walls.len() + self.links.values().map(|l| l.walls.len()).sum::<usize>()
    }

    fn intersector(&self, view: ViewId) -> PlacementResult<Box<dyn SurfaceIntersector + '_>> {
        let view = self
            .doc
            .views
            .iter()
            .find(|v| v.id == view)
            .ok_or(PlacementError::UnknownView(view))?;

        let faces = self.visible_faces(view);
        let index = SurfaceIndex::build(faces);
        debug!(
            view = %view.name,
            faces = index.len(),
            cell_size = index.cell_size(),
            "Indexed barrier faces"
        );
        Ok(Box::new(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Level, LinkPlacement, LinkedModel, OpeningTemplate};
    use nalgebra::{Point3, Unit, Vector3};

    fn wall(id: u64, x: f64, level: Option<u64>) -> Wall {
        Wall {
            id: ElementId(id),
            name: String::new(),
            level: level.map(LevelId),
            start: [x, -5.0, 0.0],
            end: [x, 5.0, 0.0],
            height: 3.0,
            thickness: 0.2,
            layers: Vec::new(),
        }
    }

    fn level(id: u64, elevation: f64) -> Level {
        Level {
            id: LevelId(id),
            name: format!("L{id}"),
            elevation,
        }
    }

    fn host() -> Document {
        let mut doc = Document::new("Tower_AR");
        doc.levels = vec![level(1, 0.0), level(2, 3.5), level(3, 7.0)];
        doc.walls = vec![wall(77, 4.0, Some(1))];
        doc.views = vec![View3d {
            id: ViewId(100),
            name: "{3D}".into(),
            is_template: false,
            hidden: Vec::new(),
        }];
        doc.templates = vec![OpeningTemplate {
            id: sleeve_placement::TemplateId(200),
            family: "Opening".into(),
            name: "Round".into(),
            parameters: vec!["Depth".into(), "Width".into(), "Height".into()],
            active: false,
        }];
        doc.links = vec![LinkInstance {
            id: ElementId(3),
            name: "Structure".into(),
            placement: LinkPlacement {
                translation: [0.0, 0.0, 3.5],
                rotation_z: 0.0,
            },
            model: LinkedModel {
                title: "Tower_ST".into(),
                levels: vec![level(10, 0.0), level(11, 1.0), level(12, -10.0)],
                walls: vec![
                    wall(77, 8.0, Some(10)),
                    wall(78, 9.0, Some(11)),
                    wall(79, 10.0, Some(12)),
                    wall(80, 11.0, None),
                ],
            },
        }];
        doc
    }

    #[test]
    fn host_barrier_uses_wall_level() {
        let doc = host();
        let host = HostDocument::new(&doc);
        let info = host.barrier(BarrierRef::host(ElementId(77))).unwrap();
        assert_eq!(info.level, Some(LevelId(1)));
        assert!(host.barrier(BarrierRef::host(ElementId(5))).is_none());
    }

    #[test]
    fn linked_levels_map_onto_host_levels() {
        let doc = host();
        let host = HostDocument::new(&doc);
        let level_of = |element| {
            host.barrier(BarrierRef::linked(ElementId(3), ElementId(element)))
                .unwrap()
                .level
        };

        // linked 0.0 + 3.5 lands exactly on L2
        assert_eq!(level_of(77), Some(LevelId(2)));
        // linked 1.0 + 3.5 = 4.5, highest host level below is L2
        assert_eq!(level_of(78), Some(LevelId(2)));
        // below every host level
        assert_eq!(level_of(79), None);
        // no association at all
        assert_eq!(level_of(80), None);
    }

    #[test]
    fn unknown_link_is_not_found() {
        let doc = host();
        let host = HostDocument::new(&doc);
        assert!(host
            .barrier(BarrierRef::linked(ElementId(99), ElementId(77)))
            .is_none());
    }

    #[test]
    fn template_parameters_are_indexed() {
        let doc = host();
        let host = HostDocument::new(&doc);
        let template = host.find_template("Opening").unwrap();
        assert!(!template.is_active);
        assert_eq!(template.parameter("Width"), Some(ParameterId(1)));
        assert_eq!(template.parameter("Height"), Some(ParameterId(2)));
        assert!(host.find_template("Sleeve").is_none());
    }

    #[test]
    fn barrier_count_includes_links() {
        let doc = host();
        assert_eq!(HostDocument::new(&doc).barrier_count(), 5);
    }

    #[test]
    fn hidden_walls_are_not_hit() {
        let mut doc = host();
        doc.views[0].hidden = vec![ElementId(77), ElementId(3)];
        let host = HostDocument::new(&doc);
        let intersector = host.intersector(ViewId(100)).unwrap();

        let hits = intersector.find_intersections(
            &Point3::new(0.0, 0.0, 1.0),
            &Unit::new_normalize(Vector3::x()),
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn linked_walls_are_hit_with_link_identity() {
        let doc = host();
        let host = HostDocument::new(&doc);
        let intersector = host.intersector(ViewId(100)).unwrap();

        // z = 4.5 is above the host wall and inside the raised link
        let hits = intersector.find_intersections(
            &Point3::new(0.0, 0.0, 4.5),
            &Unit::new_normalize(Vector3::x()),
        );
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|h| h.barrier.link == LinkId::Instance(ElementId(3))));
        assert_eq!(hits[0].barrier.element, ElementId(77));
    }

    #[test]
    fn unknown_view_is_an_error() {
        let doc = host();
        let host = HostDocument::new(&doc);
        assert!(matches!(
            host.intersector(ViewId(1)),
            Err(PlacementError::UnknownView(ViewId(1)))
        ));
    }

    #[test]
    fn systems_document_lists_streams() {
        let doc: Document = serde_json::from_str(
            r#"{
                "title": "Tower_Systems",
                "pipes": [{ "id": 600, "path": { "type": "line", "start": [0, 0, 1], "end": [6, 0, 1] }, "diameter": 0.05 }]
            }"#,
        )
        .unwrap();
        assert!(doc.mep_elements(MepKind::Duct).is_empty());
        let pipes = doc.mep_elements(MepKind::Pipe);
        assert_eq!(pipes.len(), 1);
        assert_eq!(pipes[0].kind, MepKind::Pipe);
        assert_eq!(MepSource::title(&doc), "Tower_Systems");
    }
}
