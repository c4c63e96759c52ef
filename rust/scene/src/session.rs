// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sessions: the set of open documents, loaded from and saved to JSON.
//!
//! The first document of a session is the active host document. The systems
//! document is located among all documents by a title substring.

use std::fs;
use std::path::Path;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use sleeve_placement::find_by_title;
use tracing::info;

use crate::document::HostDocument;
use crate::error::{Error, Result};
use crate::model::Document;

/// All open documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub documents: Vec<Document>,
}

impl Session {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Parses and validates a session.
    pub fn from_json(json: &str) -> Result<Self> {
        let session: Session = serde_json::from_str(json)?;
        session.validate()?;
        Ok(session)
    }

    /// Reads a session file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let session = Self::from_json(&fs::read_to_string(path)?)?;
        info!(
            path = %path.display(),
            documents = session.documents.len(),
            "Loaded session"
        );
        Ok(session)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Checks that the host exists and element ids are unique per document.
    pub fn validate(&self) -> Result<()> {
        if self.documents.is_empty() {
            return Err(Error::EmptySession);
        }

        for doc in &self.documents {
            let mut seen = FxHashSet::default();
            let ids = doc
                .walls
                .iter()
                .map(|w| w.id)
                .chain(doc.links.iter().map(|l| l.id))
                .chain(doc.ducts.iter().map(|c| c.id))
                .chain(doc.pipes.iter().map(|c| c.id));
            for id in ids {
                if !seen.insert(id) {
                    return Err(Error::DuplicateElement {
                        document: doc.title.clone(),
                        id,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn host_document(&self) -> Result<&Document> {
        self.documents.first().ok_or(Error::EmptySession)
    }

    pub fn host_document_mut(&mut self) -> Result<&mut Document> {
        self.documents.first_mut().ok_or(Error::EmptySession)
    }

    /// The host document wrapped for planning.
    pub fn host(&self) -> Result<HostDocument<'_>> {
        Ok(HostDocument::new(self.host_document()?))
    }

    /// The first document whose title contains `pattern`.
    pub fn systems(&self, pattern: &str) -> Result<&Document> {
        Ok(find_by_title(&self.documents, pattern)?)
    }
}
