// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for opening placement.
//!
//! Errors fall in two groups. Precondition failures ([`Error::is_fatal`])
//! abort the whole run before any mutation. Everything else is scoped to one
//! element or one crossing: it is reported and the run continues.

use crate::ids::{BarrierRef, ElementId, OpeningHandle, ParameterId, ViewId};
use crate::segment::MepKind;

/// Result type alias for placement operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while planning or placing openings.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No open document has a title containing the systems pattern.
    #[error("no systems document with a title containing {pattern:?} is open")]
    SystemsDocumentNotFound { pattern: String },

    /// The opening template family is not loaded in the host document.
    #[error("opening template family {family:?} not found")]
    TemplateNotFound { family: String },

    /// The template lacks one of the size parameters.
    #[error("opening template {template:?} has no parameter {parameter:?}")]
    MissingParameter { template: String, parameter: String },

    /// Activating the template failed.
    #[error("failed to activate opening template: {0}")]
    TemplateActivation(String),

    /// The host document has no non-template 3D view.
    #[error("no non-template 3D view found")]
    No3dView,

    /// A view id did not resolve in the host document.
    #[error("3D view {0} not found")]
    UnknownView(ViewId),

    /// No barrier surfaces exist in the host document or its links.
    #[error("no barrier surfaces found")]
    NoBarriers,

    /// A stream is empty and the configured policy makes that fatal.
    #[error("no {} found", .0.plural())]
    EmptyStream(MepKind),

    /// The element's path is not a single straight segment.
    #[error("element {element} has a {path} path, only straight segments are supported")]
    NonLinearPath {
        element: ElementId,
        path: &'static str,
    },

    /// The element's path has zero length.
    #[error("element {0} has a zero-length path")]
    DegeneratePath(ElementId),

    /// The element has no usable round diameter.
    #[error("element {0} has no positive diameter")]
    MissingDiameter(ElementId),

    /// A hit barrier could not be found in the model.
    #[error("barrier {0} not found")]
    BarrierNotFound(BarrierRef),

    /// A hit barrier has no level association.
    #[error("barrier {0} has no reference level")]
    UnresolvedLevel(BarrierRef),

    /// The writer could not create the opening instance.
    #[error("failed to create opening on barrier {host}: {reason}")]
    Instantiation { host: BarrierRef, reason: String },

    /// The created instance does not expose the parameter.
    #[error("opening {opening} has no parameter {parameter}")]
    ParameterNotOnInstance {
        opening: OpeningHandle,
        parameter: ParameterId,
    },

    /// Starting, committing or rolling back a transaction failed.
    #[error("transaction error: {0}")]
    Transaction(String),
}

impl Error {
    /// Returns `true` for precondition failures that abort the run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::SystemsDocumentNotFound { .. }
                | Error::TemplateNotFound { .. }
                | Error::MissingParameter { .. }
                | Error::TemplateActivation(_)
                | Error::No3dView
                | Error::UnknownView(_)
                | Error::NoBarriers
                | Error::EmptyStream(_)
        )
    }

    /// Stable machine-readable code for reports.
    pub fn code(&self) -> &'static str {
        match self {
            Error::SystemsDocumentNotFound { .. } => "SYSTEMS_DOCUMENT_NOT_FOUND",
            Error::TemplateNotFound { .. } => "TEMPLATE_NOT_FOUND",
            Error::MissingParameter { .. } => "MISSING_PARAMETER",
            Error::TemplateActivation(_) => "TEMPLATE_ACTIVATION",
            Error::No3dView => "NO_3D_VIEW",
            Error::UnknownView(_) => "UNKNOWN_VIEW",
            Error::NoBarriers => "NO_BARRIERS",
            Error::EmptyStream(_) => "EMPTY_STREAM",
            Error::NonLinearPath { .. } => "NON_LINEAR_PATH",
            Error::DegeneratePath(_) => "DEGENERATE_PATH",
            Error::MissingDiameter(_) => "MISSING_DIAMETER",
            Error::BarrierNotFound(_) => "BARRIER_NOT_FOUND",
            Error::UnresolvedLevel(_) => "UNRESOLVED_LEVEL",
            Error::Instantiation { .. } => "INSTANTIATION",
            Error::ParameterNotOnInstance { .. } => "PARAMETER_NOT_ON_INSTANCE",
            Error::Transaction(_) => "TRANSACTION",
        }
    }

    /// The barrier this error is about, if any.
    pub fn barrier(&self) -> Option<BarrierRef> {
        match self {
            Error::BarrierNotFound(b) | Error::UnresolvedLevel(b) => Some(*b),
            Error::Instantiation { host, .. } => Some(*host),
            _ => None,
        }
    }
}
