// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Sleeve Scene
//!
//! In-memory building documents for the placement pipeline.
//!
//! - [`Session`]: the open documents, read from and written to JSON
//! - [`HostDocument`]: walls, levels, views, templates and linked models,
//!   implementing [`sleeve_placement::HostModel`]
//! - [`SurfaceIndex`]: grid index of wall faces answering ray queries
//! - [`SceneWriter`]: transactional [`sleeve_placement::OpeningWriter`]
//!
//! ```
//! use sleeve_placement::{PlacementConfig, Placer};
//! use sleeve_scene::{SceneWriter, Session};
//!
//! let mut session = Session::from_json(r#"{ "documents": [
//!   { "title": "Tower_AR",
//!     "levels": [{ "id": 1, "name": "L1", "elevation": 0.0 }],
//!     "walls": [{ "id": 77, "level": 1, "start": [4, -5, 0], "end": [4, 5, 0],
//!                 "height": 3.0, "thickness": 0.2 }],
//!     "views": [{ "id": 100, "name": "{3D}" }],
//!     "templates": [{ "id": 200, "family": "Opening", "name": "Round",
//!                     "parameters": ["Width", "Height"], "active": true }] },
//!   { "title": "Tower_Systems",
//!     "ducts": [{ "id": 500, "path": { "type": "line", "start": [0, 0, 1], "end": [10, 0, 1] },
//!                 "diameter": 0.3 }] }
//! ] }"#).unwrap();
//!
//! let config = PlacementConfig::default();
//! let plan = {
//!     let host = session.host().unwrap();
//!     let systems = session.systems(&config.systems_title_pattern).unwrap();
//!     Placer::new(&config).plan(&host, systems).unwrap()
//! };
//!
//! let mut writer = SceneWriter::new(session.host_document_mut().unwrap());
//! let report = plan.apply(&mut writer).unwrap();
//! assert_eq!(report.opening_count(), 1);
//! ```

pub mod document;
pub mod error;
pub mod index;
pub mod model;
pub mod session;
pub mod transform;
pub mod wall;
pub mod writer;

pub use document::HostDocument;
pub use error::{Error, Result};
pub use index::{FaceKey, IndexedFace, SurfaceIndex};
pub use model::{
    Document, Level, LinkInstance, LinkPlacement, LinkedModel, MepCurve, Opening,
    OpeningTemplate, PathSnapshot, View3d, Wall,
};
pub use session::Session;
pub use wall::{FaceKind, WallFace};
pub use writer::SceneWriter;
