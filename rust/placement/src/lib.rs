// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Sleeve Placement
//!
//! Finds where ducts and pipes pass through walls and plans a sized opening
//! at every crossing.
//!
//! The pipeline runs per MEP element:
//!
//! 1. [`LinearElement::extract`] turns the element's path into a directed
//!    segment with a bore diameter.
//! 2. A [`SurfaceIntersector`] casts the segment's ray through the barrier
//!    surfaces of a 3D view; [`hits_within`] keeps hits on the segment.
//! 3. [`dedup_crossings`] keeps one hit per physical barrier, keyed by
//!    [`BarrierRef`] (link instance + element).
//! 4. [`resolve_anchor`] computes the placement point and the owning level.
//!
//! [`Placer::plan`] runs steps 1-4 for the duct and pipe streams against an
//! immutable [`HostModel`]; [`PlacementPlan::apply`] then hands every anchor to
//! an [`OpeningWriter`], the only place the document is mutated.
//!
//! ```
//! use sleeve_placement::{dedup_crossings, BarrierRef, ElementId, RawHit, SurfaceHandle};
//!
//! let wall = BarrierRef::host(ElementId(77));
//! let hits = vec![
//!     RawHit { barrier: wall, proximity: 4.0, surface: SurfaceHandle::from_raw(1) },
//!     RawHit { barrier: wall, proximity: 4.1, surface: SurfaceHandle::from_raw(2) },
//! ];
//!
//! let crossings = dedup_crossings(hits);
//! assert_eq!(crossings.len(), 1);
//! assert_eq!(crossings[0].proximity(), 4.0);
//! ```

pub mod anchor;
pub mod config;
pub mod dedup;
pub mod document;
pub mod error;
pub mod ids;
pub mod intersect;
pub mod opening;
pub mod placer;
pub mod report;
pub mod segment;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Unit, Vector3};

pub use anchor::{resolve_anchor, resolve_anchors, Anchor, HostFace};
pub use config::{CommitPolicy, EmptyStreamPolicy, PlacementConfig};
pub use dedup::{dedup_crossings, UniqueCrossing};
pub use document::{
    find_by_title, BarrierCatalog, BarrierInfo, HostModel, MepSource, ParameterInfo, TemplateInfo,
    View3dInfo,
};
pub use error::{Error, Result};
pub use ids::{
    BarrierRef, ElementId, LevelId, LinkId, OpeningHandle, ParameterId, TemplateId, ViewId,
};
pub use intersect::{cast_segment, hits_within, RawHit, SurfaceHandle, SurfaceIntersector};
pub use opening::{OpeningWriter, SizeParameters};
pub use placer::{PlacementPlan, PlannedOpening, Placer, StreamPlan};
pub use report::{Diagnostic, PlacedOpening, PlacementReport, StreamStats};
pub use segment::{Direction, LinearElement, MepElement, MepKind, MepPath};
