// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mutation boundary: creating and sizing opening instances.

use nalgebra::Point3;

use crate::anchor::HostFace;
use crate::document::TemplateInfo;
use crate::error::{Error, Result};
use crate::ids::{LevelId, OpeningHandle, ParameterId, TemplateId};

/// The template's width and height parameters, resolved once by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeParameters {
    pub width: ParameterId,
    pub height: ParameterId,
}

impl SizeParameters {
    /// Resolves both parameters on `template`, failing on the first missing one.
    pub fn resolve(template: &TemplateInfo, width: &str, height: &str) -> Result<Self> {
        let lookup = |name: &str| {
            template
                .parameter(name)
                .ok_or_else(|| Error::MissingParameter {
                    template: template.family.clone(),
                    parameter: name.to_string(),
                })
        };

        Ok(Self {
            width: lookup(width)?,
            height: lookup(height)?,
        })
    }
}

/// Mutation context of the host document.
///
/// Only [`PlacementPlan::apply`](crate::PlacementPlan::apply) holds one, after
/// every query of the run has completed.
pub trait OpeningWriter {
    /// Makes the template placeable. Requires an open transaction.
    fn activate_template(&mut self, template: TemplateId) -> Result<()>;

    fn start_transaction(&mut self, name: &str) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    /// Discards everything done since the transaction started.
    fn roll_back(&mut self);

    /// Places one opening at `point`, hosted on `host` and associated with `level`.
    fn create_instance(
        &mut self,
        point: &Point3<f64>,
        template: TemplateId,
        host: HostFace,
        level: LevelId,
    ) -> Result<OpeningHandle>;

    fn set_parameter(
        &mut self,
        opening: OpeningHandle,
        parameter: ParameterId,
        value: f64,
    ) -> Result<()>;

    /// Removes an instance created in the open transaction.
    fn delete_instance(&mut self, opening: OpeningHandle) -> Result<()>;
}
