// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Anchor resolution: placement point and owning level for each crossing.

use nalgebra::Point3;

use crate::dedup::UniqueCrossing;
use crate::document::BarrierCatalog;
use crate::error::{Error, Result};
use crate::ids::{BarrierRef, LevelId};
use crate::intersect::SurfaceHandle;
use crate::segment::LinearElement;

/// The barrier face an opening is hosted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostFace {
    pub barrier: BarrierRef,
    pub surface: SurfaceHandle,
}

/// Resolved placement data for one crossing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub host: HostFace,
    pub proximity: f64,
    /// `origin + direction * proximity` of the originating segment.
    pub point: Point3<f64>,
    pub level: LevelId,
    /// Bore diameter of the originating element.
    pub diameter: f64,
}

/// Resolves the anchor of one crossing.
///
/// The level comes from the barrier's own association; a barrier without one
/// yields [`Error::UnresolvedLevel`].
pub fn resolve_anchor<C>(
    catalog: &C,
    segment: &LinearElement,
    crossing: &UniqueCrossing,
) -> Result<Anchor>
where
    C: BarrierCatalog + ?Sized,
{
    let barrier = crossing.barrier();
    let info = catalog
        .barrier(barrier)
        .ok_or(Error::BarrierNotFound(barrier))?;
    let level = info.level.ok_or(Error::UnresolvedLevel(barrier))?;

    Ok(Anchor {
        host: HostFace {
            barrier,
            surface: crossing.surface(),
        },
        proximity: crossing.proximity(),
        point: segment.point_at(crossing.proximity()),
        level,
        diameter: segment.bore_diameter(),
    })
}

/// Resolves every crossing of a segment, splitting successes from failures.
///
/// A failing crossing never stops the remaining ones.
pub fn resolve_anchors<C>(
    catalog: &C,
    segment: &LinearElement,
    crossings: &[UniqueCrossing],
) -> (Vec<Anchor>, Vec<Error>)
where
    C: BarrierCatalog + ?Sized,
{
    let mut anchors = Vec::with_capacity(crossings.len());
    let mut failures = Vec::new();

    for crossing in crossings {
        match resolve_anchor(catalog, segment, crossing) {
            Ok(anchor) => anchors.push(anchor),
            Err(err) => failures.push(err),
        }
    }

    (anchors, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::dedup_crossings;
    use crate::document::BarrierInfo;
    use crate::ids::ElementId;
    use crate::intersect::RawHit;
    use crate::segment::{MepElement, MepKind, MepPath};
    use approx::assert_relative_eq;
    use rustc_hash::FxHashMap;

    struct Catalog(FxHashMap<BarrierRef, Option<LevelId>>);

    impl BarrierCatalog for Catalog {
        fn barrier(&self, barrier: BarrierRef) -> Option<BarrierInfo> {
            self.0
                .get(&barrier)
                .map(|level| BarrierInfo { barrier, level: *level })
        }
    }

    fn segment(start: [f64; 3], end: [f64; 3], diameter: f64) -> LinearElement {
        LinearElement::extract(&MepElement {
            id: ElementId(500),
            kind: MepKind::Duct,
            path: MepPath::Line {
                start: Point3::from(start),
                end: Point3::from(end),
            },
            diameter: Some(diameter),
        })
        .unwrap()
    }

    fn crossing(barrier: BarrierRef, proximity: f64) -> UniqueCrossing {
        dedup_crossings(vec![RawHit {
            barrier,
            proximity,
            surface: SurfaceHandle::from_raw(1),
        }])[0]
    }

    #[test]
    fn anchor_on_straight_duct() {
        let wall = BarrierRef::host(ElementId(77));
        let catalog = Catalog([(wall, Some(LevelId(1)))].into_iter().collect());
        let seg = segment([0.0, 0.0, 0.0], [10.0, 0.0, 0.0], 0.3);

        let anchor = resolve_anchor(&catalog, &seg, &crossing(wall, 4.0)).unwrap();
        assert_eq!(anchor.point, Point3::new(4.0, 0.0, 0.0));
        assert_eq!(anchor.level, LevelId(1));
        assert_eq!(anchor.diameter, 0.3);
        assert_eq!(anchor.host.barrier, wall);
        assert_eq!(anchor.proximity, 4.0);
    }

    #[test]
    fn anchor_point_follows_segment_equation() {
        let wall = BarrierRef::linked(ElementId(3), ElementId(8));
        let catalog = Catalog([(wall, Some(LevelId(2)))].into_iter().collect());
        let seg = segment([1.0, 2.0, 3.0], [4.0, 6.0, 3.0], 0.1);

        let anchor = resolve_anchor(&catalog, &seg, &crossing(wall, 2.5)).unwrap();
        let expected = seg.origin() + seg.direction().into_inner() * 2.5;
        assert_eq!(anchor.point, expected);
        assert_relative_eq!(anchor.point.x, 2.5, epsilon = 1e-12);
        assert_relative_eq!(anchor.point.y, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn barrier_without_level_is_reported() {
        let wall = BarrierRef::host(ElementId(9));
        let catalog = Catalog([(wall, None)].into_iter().collect());
        let seg = segment([0.0, 0.0, 0.0], [10.0, 0.0, 0.0], 0.3);

        let err = resolve_anchor(&catalog, &seg, &crossing(wall, 1.0)).unwrap_err();
        assert!(matches!(err, Error::UnresolvedLevel(b) if b == wall));
        assert!(!err.is_fatal());
    }

    #[test]
    fn unknown_barrier_is_reported() {
        let catalog = Catalog(FxHashMap::default());
        let seg = segment([0.0, 0.0, 0.0], [10.0, 0.0, 0.0], 0.3);
        let wall = BarrierRef::host(ElementId(1));

        let err = resolve_anchor(&catalog, &seg, &crossing(wall, 1.0)).unwrap_err();
        assert!(matches!(err, Error::BarrierNotFound(_)));
    }

    #[test]
    fn failures_do_not_stop_other_crossings() {
        let good_a = BarrierRef::host(ElementId(1));
        let bad = BarrierRef::host(ElementId(2));
        let good_b = BarrierRef::host(ElementId(3));
        let catalog = Catalog(
            [(good_a, Some(LevelId(1))), (bad, None), (good_b, Some(LevelId(1)))]
                .into_iter()
                .collect(),
        );
        let seg = segment([0.0, 0.0, 0.0], [10.0, 0.0, 0.0], 0.3);
        let crossings = dedup_crossings(
            [(good_a, 1.0), (bad, 2.0), (good_b, 3.0)].map(|(barrier, proximity)| RawHit {
                barrier,
                proximity,
                surface: SurfaceHandle::from_raw(0),
            }),
        );

        let (anchors, failures) = resolve_anchors(&catalog, &seg, &crossings);
        assert_eq!(anchors.len(), 2);
        assert_eq!(failures.len(), 1);
        assert_eq!(anchors[1].point, Point3::new(3.0, 0.0, 0.0));
    }
}
