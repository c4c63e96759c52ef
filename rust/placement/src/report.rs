// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Run reports: per-stream counters, created openings and diagnostics.

use serde::Serialize;

use crate::error::Error;
use crate::ids::{BarrierRef, ElementId, LevelId, OpeningHandle};
use crate::segment::MepKind;

/// Counters for one stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    /// Elements enumerated from the systems document.
    pub elements: usize,
    /// Elements skipped before ray casting (non-linear, degenerate, no diameter).
    pub skipped_elements: usize,
    /// Hits returned by the intersector, before the segment filter.
    pub raw_hits: usize,
    /// Hits with `0 <= proximity <= length`.
    pub hits_in_range: usize,
    /// Distinct barriers after deduplication.
    pub crossings: usize,
    /// Crossings with a resolved anchor.
    pub anchors: usize,
    /// Openings created and committed.
    pub openings: usize,
}

/// A user-visible, non-fatal failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<MepKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<ElementId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barrier: Option<BarrierRef>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(stream: Option<MepKind>, element: Option<ElementId>, error: &Error) -> Self {
        Self {
            code: error.code(),
            stream,
            element,
            barrier: error.barrier(),
            message: error.to_string(),
        }
    }
}

/// An opening created by the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedOpening {
    pub opening: OpeningHandle,
    pub stream: MepKind,
    pub element: ElementId,
    pub barrier: BarrierRef,
    pub level: LevelId,
    pub point: [f64; 3],
    pub width: f64,
    pub height: f64,
}

/// Outcome of a placement run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlacementReport {
    pub ducts: StreamStats,
    pub pipes: StreamStats,
    pub openings: Vec<PlacedOpening>,
    pub diagnostics: Vec<Diagnostic>,
}

impl PlacementReport {
    pub fn stats(&self, kind: MepKind) -> &StreamStats {
        match kind {
            MepKind::Duct => &self.ducts,
            MepKind::Pipe => &self.pipes,
        }
    }

    pub fn stats_mut(&mut self, kind: MepKind) -> &mut StreamStats {
        match kind {
            MepKind::Duct => &mut self.ducts,
            MepKind::Pipe => &mut self.pipes,
        }
    }

    /// Total openings created across both streams.
    pub fn opening_count(&self) -> usize {
        self.openings.len()
    }

    /// Openings created for one stream.
    pub fn openings_for(&self, kind: MepKind) -> impl Iterator<Item = &PlacedOpening> {
        self.openings.iter().filter(move |o| o.stream == kind)
    }

    /// Diagnostics carrying the given code.
    pub fn diagnostics_with(&self, code: &str) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.code == code).collect()
    }
}
