// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for scene documents.

use sleeve_placement::ElementId;

/// Result type alias for scene operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, validating or saving a session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing a session file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The session file is not valid JSON for the document model.
    #[error("invalid session JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A session needs at least the host document.
    #[error("session contains no documents")]
    EmptySession,

    /// Two elements of one document share an id.
    #[error("duplicate element id {id} in document {document:?}")]
    DuplicateElement { document: String, id: ElementId },

    /// A wall's dimensions cannot produce a solid.
    #[error("wall {id} is invalid: {reason}")]
    InvalidWall { id: ElementId, reason: String },

    /// Error raised by the placement pipeline.
    #[error(transparent)]
    Placement(#[from] sleeve_placement::Error),
}
