// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transactional opening writer over a host [`Document`].

use std::collections::BTreeMap;

use nalgebra::Point3;
use sleeve_placement::{
    BarrierRef, Error, HostFace, LevelId, LinkId, OpeningHandle, OpeningWriter, ParameterId,
    Result, TemplateId,
};
use tracing::{debug, trace};

use crate::model::{Document, Opening};

#[derive(Debug)]
struct Pending {
    name: String,
    /// Openings before this index existed when the transaction started.
    base: usize,
    activated: Vec<TemplateId>,
}

/// Writes openings into the host document.
///
/// Changes are only allowed inside a transaction; rolling back removes every
/// opening created and every template activated since it started.
#[derive(Debug)]
pub struct SceneWriter<'a> {
    doc: &'a mut Document,
    pending: Option<Pending>,
    next_id: u64,
}

impl<'a> SceneWriter<'a> {
    pub fn new(doc: &'a mut Document) -> Self {
        let next_id = doc.max_id() + 1;
        Self {
            doc,
            pending: None,
            next_id,
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.pending.is_some()
    }

    fn pending(&mut self) -> Result<&mut Pending> {
        self.pending
            .as_mut()
            .ok_or_else(|| Error::Transaction("no transaction is open".into()))
    }

    fn barrier_exists(&self, barrier: BarrierRef) -> bool {
        match barrier.link {
            LinkId::Host => self.doc.walls.iter().any(|w| w.id == barrier.element),
            LinkId::Instance(link) => self
                .doc
                .links
                .iter()
                .find(|l| l.id == link)
                .is_some_and(|l| l.model.walls.iter().any(|w| w.id == barrier.element)),
        }
    }

    /// Index of an opening created in the open transaction.
    fn pending_opening(&mut self, opening: OpeningHandle) -> Result<usize> {
        let base = self.pending()?.base;
        self.doc.openings[base..]
            .iter()
            .position(|o| o.id == opening)
            .map(|i| base + i)
            .ok_or_else(|| {
                Error::Transaction(format!("opening {opening} was not created in this transaction"))
            })
    }
}

impl OpeningWriter for SceneWriter<'_> {
    fn activate_template(&mut self, template: TemplateId) -> Result<()> {
        self.pending()?;
        let entry = self
            .doc
            .templates
            .iter_mut()
            .find(|t| t.id == template)
            .ok_or_else(|| Error::TemplateActivation(format!("unknown template {template}")))?;
        let was_active = std::mem::replace(&mut entry.active, true);
        if !was_active {
            self.pending()?.activated.push(template);
        }
        Ok(())
    }

    fn start_transaction(&mut self, name: &str) -> Result<()> {
        if let Some(open) = &self.pending {
            return Err(Error::Transaction(format!(
                "cannot start {name:?}: {:?} is still open",
                open.name
            )));
        }
        debug!(transaction = name, "Transaction started");
        self.pending = Some(Pending {
            name: name.to_string(),
            base: self.doc.openings.len(),
            activated: Vec::new(),
        });
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        let pending = self
            .pending
            .take()
            .ok_or_else(|| Error::Transaction("nothing to commit".into()))?;
        debug!(
            transaction = %pending.name,
            openings = self.doc.openings.len() - pending.base,
            "Transaction committed"
        );
        Ok(())
    }

    fn roll_back(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        self.doc.openings.truncate(pending.base);
        for id in pending.activated {
            if let Some(template) = self.doc.templates.iter_mut().find(|t| t.id == id) {
                template.active = false;
            }
        }
        debug!(transaction = %pending.name, "Transaction rolled back");
    }

    fn create_instance(
        &mut self,
        point: &Point3<f64>,
        template: TemplateId,
        host: HostFace,
        level: LevelId,
    ) -> Result<OpeningHandle> {
        self.pending()?;
        let fail = |reason: String| Error::Instantiation {
            host: host.barrier,
            reason,
        };

        let parameters: BTreeMap<String, f64> = {
            let entry = self
                .doc
                .template(template)
                .ok_or_else(|| fail(format!("unknown template {template}")))?;
            if !entry.active {
                return Err(fail(format!("template {:?} is not active", entry.name)));
            }
            entry.parameters.iter().map(|name| (name.clone(), 0.0)).collect()
        };
        if !self.barrier_exists(host.barrier) {
            return Err(fail("host barrier does not exist".into()));
        }
        if self.doc.level(level).is_none() {
            return Err(fail(format!("unknown level {level}")));
        }

        let id = OpeningHandle(self.next_id);
        self.next_id += 1;
        self.doc.openings.push(Opening {
            id,
            template,
            host: host.barrier,
            surface: host.surface,
            level,
            point: point.coords.into(),
            parameters,
        });
        trace!(opening = %id, host = %host.barrier, "Opening created");
        Ok(id)
    }

    fn set_parameter(
        &mut self,
        opening: OpeningHandle,
        parameter: ParameterId,
        value: f64,
    ) -> Result<()> {
        let index = self.pending_opening(opening)?;
        let template = self.doc.openings[index].template;
        let name = self
            .doc
            .template(template)
            .and_then(|t| t.parameters.get(parameter.0 as usize))
            .cloned()
            .ok_or(Error::ParameterNotOnInstance { opening, parameter })?;

        let params = &mut self.doc.openings[index].parameters;
        match params.get_mut(&name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::ParameterNotOnInstance { opening, parameter }),
        }
    }

    fn delete_instance(&mut self, opening: OpeningHandle) -> Result<()> {
        let index = self.pending_opening(opening)?;
        self.doc.openings.remove(index);
        Ok(())
    }
}
