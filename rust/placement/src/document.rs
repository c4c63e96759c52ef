// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only document interfaces the planner depends on.
//!
//! Backends (a CAD host, or the in-memory scene used by the CLI and tests)
//! implement these traits. Everything here takes `&self`: planning never
//! mutates the document.

use crate::error::{Error, Result};
use crate::ids::{BarrierRef, LevelId, ParameterId, TemplateId, ViewId};
use crate::intersect::SurfaceIntersector;
use crate::segment::{MepElement, MepKind};

/// A 3D view of the host document.
#[derive(Debug, Clone, PartialEq)]
pub struct View3dInfo {
    pub id: ViewId,
    pub name: String,
    /// View templates never display geometry and cannot be ray cast.
    pub is_template: bool,
}

/// A named parameter exposed by the opening template.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    pub id: ParameterId,
    pub name: String,
}

/// The parametric opening template.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateInfo {
    pub id: TemplateId,
    pub family: String,
    pub name: String,
    pub is_active: bool,
    pub parameters: Vec<ParameterInfo>,
}

impl TemplateInfo {
    /// Looks up a parameter by exact name.
    pub fn parameter(&self, name: &str) -> Option<ParameterId> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.id)
    }
}

/// What the planner needs to know about a barrier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarrierInfo {
    pub barrier: BarrierRef,
    /// The host level owning the barrier; `None` when it has no association.
    pub level: Option<LevelId>,
}

/// Barrier lookup used by the anchor resolver.
pub trait BarrierCatalog {
    fn barrier(&self, barrier: BarrierRef) -> Option<BarrierInfo>;
}

/// The host (architectural) document: walls, levels, views and templates.
pub trait HostModel: BarrierCatalog {
    fn title(&self) -> &str;

    /// All 3D views, templates included, in document order.
    fn views_3d(&self) -> Vec<View3dInfo>;

    /// The opening template of the given family, if loaded.
    fn find_template(&self, family: &str) -> Option<TemplateInfo>;

    /// Number of barrier elements in the host document and its links.
    fn barrier_count(&self) -> usize;

    /// Builds the spatial index of barrier surfaces visible in `view`.
    fn intersector(&self, view: ViewId) -> Result<Box<dyn SurfaceIntersector + '_>>;
}

/// The systems (MEP) document.
pub trait MepSource {
    fn title(&self) -> &str;

    /// Elements of one stream in enumeration order.
    fn mep_elements(&self, kind: MepKind) -> Vec<MepElement>;
}

/// Finds the first document whose title contains `pattern`.
pub fn find_by_title<'a, D, I>(documents: I, pattern: &str) -> Result<&'a D>
where
    D: MepSource + ?Sized + 'a,
    I: IntoIterator<Item = &'a D>,
{
    documents
        .into_iter()
        .find(|doc| doc.title().contains(pattern))
        .ok_or_else(|| Error::SystemsDocumentNotFound {
            pattern: pattern.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Titled(&'static str);

    impl MepSource for Titled {
        fn title(&self) -> &str {
            self.0
        }

        fn mep_elements(&self, _: MepKind) -> Vec<MepElement> {
            Vec::new()
        }
    }

    #[test]
    fn finds_systems_document_by_title() {
        let docs = [Titled("Tower_AR"), Titled("Tower_Systems"), Titled("Tower_Systems_old")];
        let found = find_by_title(docs.iter(), "_Systems").unwrap();
        assert_eq!(found.title(), "Tower_Systems");
    }

    #[test]
    fn missing_systems_document_is_fatal() {
        let docs = [Titled("Tower_AR")];
        let err = find_by_title(docs.iter(), "_Systems").unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, Error::SystemsDocumentNotFound { .. }));
    }

    #[test]
    fn template_parameter_lookup() {
        let template = TemplateInfo {
            id: TemplateId(1),
            family: "Opening".into(),
            name: "Round".into(),
            is_active: true,
            parameters: vec![
                ParameterInfo {
                    id: ParameterId(0),
                    name: "Width".into(),
                },
                ParameterInfo {
                    id: ParameterId(1),
                    name: "Height".into(),
                },
            ],
        };
        assert_eq!(template.parameter("Height"), Some(ParameterId(1)));
        assert_eq!(template.parameter("height"), None);
    }
}
