// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Run orchestration: plan every opening, then apply the plan.
//!
//! Planning borrows the documents immutably and performs every query of the
//! run: precondition checks, ray casts, deduplication and anchor resolution.
//! Applying takes the mutation context and only creates and sizes openings,
//! so the spatial index is never invalidated mid-scan.

use tracing::{debug, error, info, warn};

use crate::anchor::{resolve_anchors, Anchor};
use crate::config::{CommitPolicy, EmptyStreamPolicy, PlacementConfig};
use crate::dedup::dedup_crossings;
use crate::document::{HostModel, MepSource};
use crate::error::{Error, Result};
use crate::ids::{ElementId, OpeningHandle, TemplateId};
use crate::intersect::{cast_segment, SurfaceIntersector};
use crate::opening::{OpeningWriter, SizeParameters};
use crate::report::{Diagnostic, PlacedOpening, PlacementReport, StreamStats};
use crate::segment::{LinearElement, MepElement, MepKind};

/// An opening waiting to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedOpening {
    pub stream: MepKind,
    pub element: ElementId,
    pub anchor: Anchor,
}

/// Planned openings of one stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamPlan {
    pub kind: MepKind,
    pub openings: Vec<PlannedOpening>,
    pub stats: StreamStats,
}

/// Plans placement runs against a host and a systems document.
#[derive(Debug, Clone, Copy)]
pub struct Placer<'a> {
    config: &'a PlacementConfig,
}

impl<'a> Placer<'a> {
    pub fn new(config: &'a PlacementConfig) -> Self {
        Self { config }
    }

    /// Checks preconditions and resolves every anchor of both streams.
    ///
    /// Returns a fatal [`Error`] when a precondition fails; per-element
    /// failures are collected as diagnostics in the plan.
    pub fn plan<H, M>(&self, host: &H, systems: &M) -> Result<PlacementPlan>
    where
        H: HostModel + ?Sized,
        M: MepSource + ?Sized,
    {
        info!(
            host = host.title(),
            systems = systems.title(),
            template = %self.config.template_family,
            "Planning wall openings"
        );

        self.try_plan(host, systems).inspect_err(|err| {
            error!(code = err.code(), error = %err, "Placement aborted");
        })
    }

    fn try_plan<H, M>(&self, host: &H, systems: &M) -> Result<PlacementPlan>
    where
        H: HostModel + ?Sized,
        M: MepSource + ?Sized,
    {
        let config = self.config;

        let template = host
            .find_template(&config.template_family)
            .ok_or_else(|| Error::TemplateNotFound {
                family: config.template_family.clone(),
            })?;
        let sizes =
            SizeParameters::resolve(&template, &config.width_parameter, &config.height_parameter)?;

        let mut diagnostics = Vec::new();
        let mut inputs = Vec::with_capacity(MepKind::ALL.len());
        for kind in MepKind::ALL {
            let elements = systems.mep_elements(kind);
            if elements.is_empty() {
                let err = Error::EmptyStream(kind);
                match config.empty_stream_policy {
                    EmptyStreamPolicy::Abort => return Err(err),
                    EmptyStreamPolicy::Skip => {
                        warn!(stream = %kind, "No {} found, skipping stream", kind.plural());
                        diagnostics.push(Diagnostic::new(Some(kind), None, &err));
                    }
                }
            }
            inputs.push((kind, elements));
        }

        let view = host
            .views_3d()
            .into_iter()
            .find(|view| !view.is_template)
            .ok_or(Error::No3dView)?;

        let barrier_count = host.barrier_count();
        if barrier_count == 0 {
            return Err(Error::NoBarriers);
        }

        let intersector = host.intersector(view.id)?;
        debug!(view = %view.name, barriers = barrier_count, "Built barrier index");

        let mut streams = Vec::with_capacity(inputs.len());
        for (kind, elements) in &inputs {
            streams.push(plan_stream(
                host,
                intersector.as_ref(),
                *kind,
                elements,
                &mut diagnostics,
            ));
        }

        Ok(PlacementPlan {
            template: template.id,
            activate_template: !template.is_active,
            sizes,
            transaction_name: config.transaction_name.clone(),
            commit_policy: config.commit_policy,
            streams,
            diagnostics,
        })
    }
}

fn plan_stream<H>(
    host: &H,
    intersector: &dyn SurfaceIntersector,
    kind: MepKind,
    elements: &[MepElement],
    diagnostics: &mut Vec<Diagnostic>,
) -> StreamPlan
where
    H: HostModel + ?Sized,
{
    let mut stats = StreamStats {
        elements: elements.len(),
        ..StreamStats::default()
    };
    let mut openings = Vec::new();

    for element in elements {
        let segment = match LinearElement::extract(element) {
            Ok(segment) => segment,
            Err(err) => {
                warn!(stream = %kind, element = %element.id, error = %err, "Skipping element");
                diagnostics.push(Diagnostic::new(Some(kind), Some(element.id), &err));
                stats.skipped_elements += 1;
                continue;
            }
        };

        let (hits, raw_hits) = cast_segment(intersector, &segment);
        stats.raw_hits += raw_hits;
        stats.hits_in_range += hits.len();

        let crossings = dedup_crossings(hits);
        stats.crossings += crossings.len();

        let (anchors, failures) = resolve_anchors(host, &segment, &crossings);
        for err in failures {
            warn!(stream = %kind, element = %element.id, error = %err, "Skipping crossing");
            diagnostics.push(Diagnostic::new(Some(kind), Some(element.id), &err));
        }

        debug!(
            stream = %kind,
            element = %element.id,
            length = segment.length(),
            raw_hits,
            crossings = crossings.len(),
            anchors = anchors.len(),
            "Resolved element"
        );

        stats.anchors += anchors.len();
        openings.extend(anchors.into_iter().map(|anchor| PlannedOpening {
            stream: kind,
            element: element.id,
            anchor,
        }));
    }

    info!(
        stream = %kind,
        elements = stats.elements,
        skipped = stats.skipped_elements,
        crossings = stats.crossings,
        anchors = stats.anchors,
        "Planned stream"
    );

    StreamPlan {
        kind,
        openings,
        stats,
    }
}

/// Every opening of a run, resolved and ready to be written.
#[derive(Debug, Clone)]
pub struct PlacementPlan {
    template: TemplateId,
    activate_template: bool,
    sizes: SizeParameters,
    transaction_name: String,
    commit_policy: CommitPolicy,
    streams: Vec<StreamPlan>,
    diagnostics: Vec<Diagnostic>,
}

impl PlacementPlan {
    pub fn template(&self) -> TemplateId {
        self.template
    }

    pub fn sizes(&self) -> SizeParameters {
        self.sizes
    }

    pub fn streams(&self) -> &[StreamPlan] {
        &self.streams
    }

    pub fn stream(&self, kind: MepKind) -> Option<&StreamPlan> {
        self.streams.iter().find(|s| s.kind == kind)
    }

    /// All planned openings, ducts first.
    pub fn openings(&self) -> impl Iterator<Item = &PlannedOpening> {
        self.streams.iter().flat_map(|s| s.openings.iter())
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Report of the planning phase alone, with no openings created.
    pub fn report(&self) -> PlacementReport {
        let mut report = PlacementReport {
            diagnostics: self.diagnostics.clone(),
            ..PlacementReport::default()
        };
        for stream in &self.streams {
            *report.stats_mut(stream.kind) = stream.stats;
        }
        report
    }

    /// Creates and sizes every planned opening through `writer`.
    ///
    /// Fails only if the template cannot be activated, in which case nothing
    /// was created. Per-opening and commit failures end up in the report.
    pub fn apply<W>(self, writer: &mut W) -> Result<PlacementReport>
    where
        W: OpeningWriter + ?Sized,
    {
        let mut report = self.report();

        if self.activate_template {
            self.activate(writer).inspect_err(|err| {
                error!(error = %err, "Placement aborted");
            })?;
        }

        match self.commit_policy {
            CommitPolicy::SingleRun => {
                self.place_batch(writer, &self.transaction_name, self.openings(), &mut report);
            }
            CommitPolicy::PerStream => {
                for stream in &self.streams {
                    if stream.openings.is_empty() {
                        continue;
                    }
                    let name = format!("{} ({})", self.transaction_name, stream.kind.plural());
                    self.place_batch(writer, &name, stream.openings.iter(), &mut report);
                }
            }
        }

        info!(
            openings = report.openings.len(),
            diagnostics = report.diagnostics.len(),
            "Placement finished"
        );
        Ok(report)
    }

    fn activate<W>(&self, writer: &mut W) -> Result<()>
    where
        W: OpeningWriter + ?Sized,
    {
        debug!(template = %self.template, "Activating opening template");
        writer
            .start_transaction(&self.transaction_name)
            .map_err(|err| Error::TemplateActivation(err.to_string()))?;

        if let Err(err) = writer.activate_template(self.template) {
            writer.roll_back();
            return Err(Error::TemplateActivation(err.to_string()));
        }

        writer.commit().map_err(|err| {
            writer.roll_back();
            Error::TemplateActivation(err.to_string())
        })
    }

    fn place_batch<'p, W, I>(
        &self,
        writer: &mut W,
        name: &str,
        openings: I,
        report: &mut PlacementReport,
    ) where
        W: OpeningWriter + ?Sized,
        I: IntoIterator<Item = &'p PlannedOpening>,
    {
        if let Err(err) = writer.start_transaction(name) {
            warn!(transaction = name, error = %err, "Could not start transaction");
            report.diagnostics.push(Diagnostic::new(None, None, &err));
            return;
        }

        let mut placed = Vec::new();
        for planned in openings {
            match self.place_one(writer, planned) {
                Ok(opening) => placed.push(PlacedOpening {
                    opening,
                    stream: planned.stream,
                    element: planned.element,
                    barrier: planned.anchor.host.barrier,
                    level: planned.anchor.level,
                    point: planned.anchor.point.coords.into(),
                    width: planned.anchor.diameter,
                    height: planned.anchor.diameter,
                }),
                Err(err) => {
                    warn!(
                        stream = %planned.stream,
                        element = %planned.element,
                        error = %err,
                        "Skipping opening"
                    );
                    report.diagnostics.push(Diagnostic::new(
                        Some(planned.stream),
                        Some(planned.element),
                        &err,
                    ));
                }
            }
        }

        match writer.commit() {
            Ok(()) => {
                info!(transaction = name, openings = placed.len(), "Committed openings");
                for opening in &placed {
                    report.stats_mut(opening.stream).openings += 1;
                }
                report.openings.extend(placed);
            }
            Err(err) => {
                writer.roll_back();
                warn!(transaction = name, error = %err, "Transaction rolled back");
                report.diagnostics.push(Diagnostic::new(None, None, &err));
            }
        }
    }

    fn place_one<W>(&self, writer: &mut W, planned: &PlannedOpening) -> Result<OpeningHandle>
    where
        W: OpeningWriter + ?Sized,
    {
        let anchor = &planned.anchor;
        let opening =
            writer.create_instance(&anchor.point, self.template, anchor.host, anchor.level)?;

        let sized = writer
            .set_parameter(opening, self.sizes.width, anchor.diameter)
            .and_then(|()| writer.set_parameter(opening, self.sizes.height, anchor.diameter));

        if let Err(err) = sized {
            if let Err(cleanup) = writer.delete_instance(opening) {
                warn!(opening = %opening, error = %cleanup, "Could not remove unsized opening");
            }
            return Err(err);
        }

        Ok(opening)
    }
}
